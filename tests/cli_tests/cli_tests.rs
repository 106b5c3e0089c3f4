//! Tests for the command-line surface
//!
//! These tests verify:
//! - getopt-style scanning and last-flag-wins resolution
//! - Flag resolution into actions
//! - Write value hex parsing
//! - Missing key handling
//! - Operation dispatch output

use smcutil::cli::{execute, parse_hex_pairs, scan_args, usage, Action, Args, Operation};
use smcutil::config::Config;
use smcutil::protocol::{DataType, Key};
use smcutil::transport::SimulatedSmc;
use smcutil::{SmcClient, SmcError};

// =============================================================================
// Helper Functions
// =============================================================================

fn parse(argv: &[&str]) -> (Args, Vec<String>) {
    let mut full = vec!["smc-util"];
    full.extend_from_slice(argv);
    Args::parse_getopt(full).unwrap()
}

fn action(argv: &[&str]) -> smcutil::Result<Action> {
    parse(argv).0.action()
}

fn run(smc: SimulatedSmc, operation: &Operation) -> (SimulatedSmc, String) {
    let mut client = SmcClient::new(smc, Config::default());
    let mut out = Vec::new();
    execute(&mut client, operation, &mut out).unwrap();
    (client.into_transport(), String::from_utf8(out).unwrap())
}

// =============================================================================
// Hex Parsing Tests
// =============================================================================

#[test]
fn test_parse_hex_pairs() {
    assert_eq!(parse_hex_pairs("0a1b"), vec![0x0A, 0x1B]);
    assert_eq!(parse_hex_pairs("ff00"), vec![0xFF, 0x00]);
}

#[test]
fn test_parse_hex_non_hex_is_zero_nibble() {
    // Uppercase is not recognized
    assert_eq!(parse_hex_pairs("AB1g"), vec![0x00, 0x10]);
}

#[test]
fn test_parse_hex_odd_length() {
    assert_eq!(parse_hex_pairs("abc"), vec![0xAB, 0xC0]);
}

#[test]
fn test_parse_hex_empty() {
    assert!(parse_hex_pairs("").is_empty());
}

#[test]
fn test_parse_hex_truncates_to_payload() {
    let text = "01".repeat(40);
    assert_eq!(parse_hex_pairs(&text).len(), 32);
}

// =============================================================================
// Action Tests
// =============================================================================

#[test]
fn test_write_action_parses_value() {
    let Action::Run(Operation::Write(value)) = action(&["-w", "0a1b", "-k", "TEST"]).unwrap()
    else {
        panic!("Expected write operation");
    };

    assert_eq!(value.key, Key::new("TEST").unwrap());
    assert_eq!(value.size, 2);
    assert_eq!(value.payload(), &[0x0A, 0x1B]);
}

#[test]
fn test_read_action() {
    assert_eq!(
        action(&["-r", "-k", "FNum"]).unwrap(),
        Action::Run(Operation::Read(Key::FAN_COUNT))
    );
}

#[test]
fn test_list_and_fan_actions() {
    assert_eq!(action(&["-l"]).unwrap(), Action::Run(Operation::List));
    assert_eq!(action(&["-f"]).unwrap(), Action::Run(Operation::Fans));
}

#[test]
fn test_no_operation_is_usage() {
    assert_eq!(action(&[]).unwrap(), Action::Usage);
    assert_eq!(action(&["-k", "FNum"]).unwrap(), Action::Usage);
}

#[test]
fn test_help_is_usage() {
    assert_eq!(action(&["-h"]).unwrap(), Action::Usage);
    assert_eq!(action(&["-l", "-h"]).unwrap(), Action::Usage);
}

#[test]
fn test_operation_after_help_is_selected() {
    assert_eq!(action(&["-h", "-l"]).unwrap(), Action::Run(Operation::List));
}

#[test]
fn test_last_operation_flag_wins() {
    assert_eq!(action(&["-l", "-f"]).unwrap(), Action::Run(Operation::Fans));
    assert_eq!(action(&["-f", "-l"]).unwrap(), Action::Run(Operation::List));
    assert_eq!(
        action(&["-l", "-r", "-k", "FNum"]).unwrap(),
        Action::Run(Operation::Read(Key::FAN_COUNT))
    );
    assert_eq!(
        action(&["-r", "-l", "-r", "-k", "FNum"]).unwrap(),
        Action::Run(Operation::Read(Key::FAN_COUNT))
    );
}

#[test]
fn test_clustered_flags_and_attached_argument() {
    assert_eq!(
        action(&["-rkFNum"]).unwrap(),
        Action::Run(Operation::Read(Key::FAN_COUNT))
    );
    assert_eq!(action(&["-rf"]).unwrap(), Action::Run(Operation::Fans));
}

#[test]
fn test_last_key_wins() {
    assert_eq!(
        action(&["-k", "TEST", "-r", "-k", "FNum"]).unwrap(),
        Action::Run(Operation::Read(Key::FAN_COUNT))
    );
}

#[test]
fn test_version_wins() {
    assert_eq!(action(&["-v"]).unwrap(), Action::Version);
    assert_eq!(action(&["-l", "-v"]).unwrap(), Action::Version);
}

#[test]
fn test_read_without_key() {
    assert!(matches!(
        action(&["-r"]),
        Err(SmcError::MissingKeyArgument("read"))
    ));
}

#[test]
fn test_write_without_key() {
    assert!(matches!(
        action(&["-w", "01"]),
        Err(SmcError::MissingKeyArgument("write"))
    ));
}

#[test]
fn test_read_with_overlong_key_keeps_prefix() {
    assert_eq!(
        action(&["-r", "-k", "FNumber"]).unwrap(),
        Action::Run(Operation::Read(Key::FAN_COUNT))
    );
}

#[test]
fn test_write_value_may_start_with_dash() {
    let Action::Run(Operation::Write(value)) = action(&["-w", "-1", "-k", "TEST"]).unwrap()
    else {
        panic!("Expected write operation");
    };

    assert_eq!(value.payload(), &[0x01]);
}

#[test]
fn test_unknown_flag_before_operation_is_ignored() {
    let (args, diagnostics) = parse(&["-x", "-l"]);

    assert_eq!(args.action().unwrap(), Action::Run(Operation::List));
    assert_eq!(diagnostics, vec!["smc-util: invalid option -- 'x'"]);
}

#[test]
fn test_unknown_flag_after_operation_resets_it() {
    let (args, diagnostics) = parse(&["-l", "-x"]);

    assert_eq!(args.action().unwrap(), Action::Usage);
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_missing_option_argument_resets_operation() {
    let (args, diagnostics) = parse(&["-l", "-k"]);

    assert_eq!(args.action().unwrap(), Action::Usage);
    assert_eq!(
        diagnostics,
        vec!["smc-util: option requires an argument -- 'k'"]
    );
}

#[test]
fn test_scan_skips_operands_and_stops_at_double_dash() {
    let scanned = scan_args(["smc-util", "extra", "-l", "--", "-f"]);

    assert_eq!(scanned.argv, vec!["smc-util", "-l"]);
    assert!(scanned.diagnostics.is_empty());
}

#[test]
fn test_scan_splits_clusters() {
    let scanned = scan_args(["smc-util", "-lxw0a1b"]);

    assert_eq!(scanned.argv, vec!["smc-util", "-l", "-h", "-w", "0a1b"]);
    assert_eq!(scanned.diagnostics.len(), 1);
}

#[test]
fn test_usage_lists_flags() {
    let text = usage("smc-util");
    assert!(text.starts_with("Apple System Management Control (SMC) Utility"));
    assert!(text.contains("smc-util [options]"));
    assert!(text.contains("    -w <value> : write the specified value to a key\n"));
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[test]
fn test_execute_read_prints_value() {
    let smc = SimulatedSmc::new().with_key("FNum", DataType::UInt8, &[2]);

    let (_, out) = run(smc, &Operation::Read(Key::FAN_COUNT));

    assert_eq!(out, "  FNum  [ui8 ]  2 (bytes 02)\n");
}

#[test]
fn test_execute_write_updates_key() {
    let smc = SimulatedSmc::new().with_key("TEST", DataType::UInt16, &[0, 0]);
    let Action::Run(operation) = action(&["-k", "TEST", "-w", "0a1b"]).unwrap() else {
        panic!("Expected operation");
    };

    let (smc, out) = run(smc, &operation);

    assert!(out.is_empty());
    assert_eq!(smc.value(Key::new("TEST").unwrap()).unwrap(), &[0x0A, 0x1B]);
}

#[test]
fn test_execute_read_missing_key_fails() {
    let mut client = SmcClient::new(SimulatedSmc::new(), Config::default());
    let mut out = Vec::new();

    let err = execute(&mut client, &Operation::Read(Key::FAN_COUNT), &mut out).unwrap_err();

    assert!(err.is_key_not_found());
    assert!(out.is_empty());
}
