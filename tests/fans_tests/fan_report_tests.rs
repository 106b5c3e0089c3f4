//! Tests for the fan report
//!
//! These tests verify:
//! - Speed decoding for each fan
//! - Mode bitmask interpretation
//! - Missing attributes default to zero and are recorded
//! - Single-digit fan key limit

use smcutil::config::Config;
use smcutil::fans::{fan_key, FanAttribute, FanMode};
use smcutil::protocol::{DataType, Key};
use smcutil::transport::SimulatedSmc;
use smcutil::{SmcClient, SmcError};

// =============================================================================
// Helper Functions
// =============================================================================

/// fpe2 encoding of a whole rpm value
fn fpe2(rpm: u16) -> [u8; 2] {
    (rpm << 2).to_be_bytes()
}

fn with_fan(smc: SimulatedSmc, index: u8, speeds: [u16; 5]) -> SimulatedSmc {
    let mut smc = smc;
    for (attribute, rpm) in FanAttribute::SPEEDS.into_iter().zip(speeds) {
        let key = fan_key(index, attribute).unwrap();
        smc.insert(key, DataType::Fpe2, &fpe2(rpm));
    }
    smc
}

fn two_fan_smc() -> SimulatedSmc {
    let smc = SimulatedSmc::new()
        .with_key("FNum", DataType::UInt8, &[2])
        .with_key("FS! ", DataType::UInt16, &[0x00, 0x02]);
    let smc = with_fan(smc, 0, [1200, 1000, 6000, 3600, 1250]);
    with_fan(smc, 1, [1400, 1100, 6200, 3700, 1500])
}

// =============================================================================
// Key Naming Tests
// =============================================================================

#[test]
fn test_fan_key_names() {
    assert_eq!(fan_key(0, FanAttribute::Actual).unwrap().to_string(), "F0Ac");
    assert_eq!(fan_key(3, FanAttribute::Minimum).unwrap().to_string(), "F3Mn");
    assert_eq!(fan_key(9, FanAttribute::Target).unwrap().to_string(), "F9Tg");
}

#[test]
fn test_fan_key_single_digit_only() {
    assert!(fan_key(10, FanAttribute::Actual).is_none());
}

#[test]
fn test_fan_key_mode_has_no_per_fan_key() {
    assert!(fan_key(0, FanAttribute::Mode).is_none());
}

#[test]
fn test_mode_from_mask() {
    assert_eq!(FanMode::from_mask(0b10, 0), FanMode::Auto);
    assert_eq!(FanMode::from_mask(0b10, 1), FanMode::Forced);
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_report_decodes_all_fans() {
    let mut client = SmcClient::new(two_fan_smc(), Config::default());

    let report = client.fan_report().unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.fans.len(), 2);
    assert!(report.issues.is_empty());

    let fan0 = &report.fans[0];
    assert_eq!(fan0.index, 0);
    assert_eq!(
        (fan0.actual, fan0.minimum, fan0.maximum, fan0.safe, fan0.target),
        (1200, 1000, 6000, 3600, 1250)
    );
    assert_eq!(fan0.mode, FanMode::Auto);

    let fan1 = &report.fans[1];
    assert_eq!(fan1.actual, 1400);
    assert_eq!(fan1.mode, FanMode::Forced);
}

#[test]
fn test_report_tolerates_missing_attribute() {
    let mut smc = SimulatedSmc::new()
        .with_key("FNum", DataType::UInt8, &[1])
        .with_key("FS! ", DataType::UInt16, &[0x00, 0x00]);
    smc = with_fan(smc, 0, [1200, 1000, 6000, 3600, 1250]);
    smc.remove(Key::new("F0Sf").unwrap());
    let mut client = SmcClient::new(smc, Config::default());

    let report = client.fan_report().unwrap();

    assert_eq!(report.fans.len(), 1);
    let fan = &report.fans[0];
    assert_eq!(fan.actual, 1200);
    assert_eq!(fan.minimum, 1000);
    assert_eq!(fan.maximum, 6000);
    assert_eq!(fan.target, 1250);
    assert_eq!(fan.safe, 0);

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].fan, Some(0));
    assert_eq!(report.issues[0].attribute, FanAttribute::Safe);
    assert!(report.issues[0].error.is_key_not_found());
}

#[test]
fn test_report_missing_mode_key_defaults_to_auto() {
    let smc = SimulatedSmc::new().with_key("FNum", DataType::UInt8, &[1]);
    let smc = with_fan(smc, 0, [1200, 1000, 6000, 3600, 1250]);
    let mut client = SmcClient::new(smc, Config::default());

    let report = client.fan_report().unwrap();

    assert_eq!(report.fans[0].mode, FanMode::Auto);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].fan, None);
    assert_eq!(report.issues[0].attribute, FanAttribute::Mode);
}

#[test]
fn test_report_without_fan_count_fails() {
    let mut client = SmcClient::new(SimulatedSmc::new(), Config::default());

    let err = client.fan_report().unwrap_err();

    assert!(matches!(err, SmcError::Transport(_)));
}

#[test]
fn test_report_zero_fans() {
    let smc = SimulatedSmc::new().with_key("FNum", DataType::UInt8, &[0]);
    let mut client = SmcClient::new(smc, Config::default());

    let report = client.fan_report().unwrap();

    assert_eq!(report.total, 0);
    assert!(report.fans.is_empty());
    assert_eq!(report.to_string(), "Total fans in system: 0\n");
}

#[test]
fn test_report_caps_at_ten_fans() {
    let smc = SimulatedSmc::new()
        .with_key("FNum", DataType::UInt8, &[12])
        .with_key("FS! ", DataType::UInt16, &[0x00, 0x00]);
    let mut client = SmcClient::new(smc, Config::default());

    let report = client.fan_report().unwrap();

    assert_eq!(report.total, 12);
    assert_eq!(report.fans.len(), 10);
    assert_eq!(report.fans[9].index, 9);
    // Five speed keys missing for each of the ten fans
    assert_eq!(report.issues.len(), 50);
}

#[test]
fn test_report_display() {
    let smc = SimulatedSmc::new()
        .with_key("FNum", DataType::UInt8, &[1])
        .with_key("FS! ", DataType::UInt16, &[0x00, 0x01]);
    let smc = with_fan(smc, 0, [1200, 1000, 6000, 3600, 1250]);
    let mut client = SmcClient::new(smc, Config::default());

    let report = client.fan_report().unwrap();

    let expected = "Total fans in system: 1\n\
                    \n\
                    Fan #0:\n    \
                    Actual speed : 1200 Key[F0Ac]\n    \
                    Minimum speed: 1000\n    \
                    Maximum speed: 6000\n    \
                    Safe speed   : 3600\n    \
                    Target speed : 1250\n    \
                    Mode         : forced\n";
    assert_eq!(report.to_string(), expected);
}
