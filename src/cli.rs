//! Command-line surface
//!
//! Flag parsing, write-value parsing and operation dispatch for the
//! `smc-util` binary.

use std::io::Write;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::client::SmcClient;
use crate::error::{Result, SmcError};
use crate::protocol::{DataType, Key, TypedValue, PAYLOAD_SIZE};
use crate::transport::SmcTransport;

// =============================================================================
// Flags
// =============================================================================

/// smc-util flags
#[derive(Parser, Debug, Default)]
#[command(name = "smc-util")]
#[command(about = "Apple System Management Control (SMC) Utility")]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(args_override_self = true)]
pub struct Args {
    /// fan info decoded
    #[arg(short = 'f')]
    pub fans: bool,

    /// help
    #[arg(short = 'h')]
    pub help: bool,

    /// key to manipulate
    #[arg(short = 'k', value_name = "key", allow_hyphen_values = true)]
    pub key: Option<String>,

    /// list all keys and values
    #[arg(short = 'l')]
    pub list: bool,

    /// read the value of a key
    #[arg(short = 'r')]
    pub read: bool,

    /// write the specified value to a key
    #[arg(short = 'w', value_name = "value", allow_hyphen_values = true)]
    pub write: Option<String>,

    /// version
    #[arg(short = 'v')]
    pub version: bool,

    /// Operation flag that appeared last on the command line
    #[arg(skip)]
    pub last_operation: Option<OperationFlag>,
}

/// Flags that select, or reset, the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationFlag {
    Fans,
    Help,
    List,
    Read,
    Write,
}

const OPERATION_FLAGS: [(&str, OperationFlag); 5] = [
    ("fans", OperationFlag::Fans),
    ("help", OperationFlag::Help),
    ("list", OperationFlag::List),
    ("read", OperationFlag::Read),
    ("write", OperationFlag::Write),
];

/// Command line after a getopt-style scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedArgs {
    /// One token per option, option arguments in the following token
    pub argv: Vec<String>,

    /// Complaints about unknown flags and missing option arguments
    pub diagnostics: Vec<String>,
}

/// Scan a command line the way getopt reads `fhk:lrw:v`
///
/// Flags may be clustered (`-rl`) and option arguments attached (`-kFNum`)
/// or separate. An unknown flag, or `-k`/`-w` without an argument, becomes
/// `-h` so that it resets the operation in place. Operands are skipped and
/// `--` ends the scan.
pub fn scan_args<I, S>(argv: I) -> ScannedArgs
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut argv = argv.into_iter().map(|arg| -> String { arg.into() });
    let program = argv.next().unwrap_or_else(|| "smc-util".to_string());
    let rest: Vec<String> = argv.collect();

    let mut scanned = ScannedArgs {
        argv: vec![program.clone()],
        diagnostics: Vec::new(),
    };

    let mut next = 0;
    while next < rest.len() {
        let arg = &rest[next];
        next += 1;

        if arg == "--" {
            break;
        }
        let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty()) else {
            continue;
        };

        for (pos, flag) in cluster.char_indices() {
            match flag {
                'f' | 'h' | 'l' | 'r' | 'v' => scanned.argv.push(format!("-{}", flag)),
                'k' | 'w' => {
                    let attached = &cluster[pos + flag.len_utf8()..];
                    let value = if !attached.is_empty() {
                        Some(attached.to_string())
                    } else if next < rest.len() {
                        next += 1;
                        Some(rest[next - 1].clone())
                    } else {
                        None
                    };

                    match value {
                        Some(value) => {
                            scanned.argv.push(format!("-{}", flag));
                            scanned.argv.push(value);
                        }
                        None => {
                            scanned.diagnostics.push(format!(
                                "{}: option requires an argument -- '{}'",
                                program, flag
                            ));
                            scanned.argv.push("-h".to_string());
                        }
                    }
                    break;
                }
                other => {
                    scanned
                        .diagnostics
                        .push(format!("{}: invalid option -- '{}'", program, other));
                    scanned.argv.push("-h".to_string());
                }
            }
        }
    }

    scanned
}

impl Args {
    /// Scan and parse a full command line, program name first
    ///
    /// Returns the flags and any scan diagnostics.
    pub fn parse_getopt<I, S>(argv: I) -> std::result::Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scanned = scan_args(argv);

        let matches = Self::command().try_get_matches_from(&scanned.argv)?;
        let mut args = Self::from_arg_matches(&matches)?;
        args.last_operation = last_operation(&matches);

        Ok((args, scanned.diagnostics))
    }
}

fn last_operation(matches: &ArgMatches) -> Option<OperationFlag> {
    OPERATION_FLAGS
        .iter()
        .filter(|(id, _)| matches.value_source(id) == Some(ValueSource::CommandLine))
        .filter_map(|(id, flag)| {
            let index = matches.indices_of(id)?.last()?;
            Some((index, *flag))
        })
        .max_by_key(|(index, _)| *index)
        .map(|(_, flag)| flag)
}

// =============================================================================
// Actions
// =============================================================================

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print the version and exit successfully
    Version,
    /// Print usage and exit with failure
    Usage,
    /// Run an operation against the controller
    Run(Operation),
}

/// A controller operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Read(Key),
    Write(TypedValue),
    Fans,
}

impl Operation {
    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read(_) => "read",
            Operation::Write(_) => "write",
            Operation::Fans => "fans",
        }
    }
}

impl Args {
    /// Resolve the flags into an action
    ///
    /// `-v` wins wherever it appears. Otherwise the last operation flag
    /// decides, and a trailing `-h` leaves no operation. Fails when `-r` or
    /// `-w` is selected without a non-empty `-k`.
    pub fn action(&self) -> Result<Action> {
        if self.version {
            return Ok(Action::Version);
        }

        match self.last_operation {
            None | Some(OperationFlag::Help) => Ok(Action::Usage),
            Some(OperationFlag::List) => Ok(Action::Run(Operation::List)),
            Some(OperationFlag::Fans) => Ok(Action::Run(Operation::Fans)),
            Some(OperationFlag::Read) => {
                let key = self.require_key("read")?;
                Ok(Action::Run(Operation::Read(key)))
            }
            Some(OperationFlag::Write) => {
                let key = self.require_key("write")?;
                let data = parse_hex_pairs(self.write.as_deref().unwrap_or(""));
                let value = TypedValue::new(key, DataType::default(), &data);
                Ok(Action::Run(Operation::Write(value)))
            }
        }
    }

    fn require_key(&self, operation: &'static str) -> Result<Key> {
        match self.key.as_deref() {
            None | Some("") => Err(SmcError::MissingKeyArgument(operation)),
            Some(text) => Ok(Key::from_prefix(text)),
        }
    }
}

// =============================================================================
// Values and Output
// =============================================================================

/// Parse a write value of concatenated hex pairs, e.g. `0a1b`
///
/// Only `0-9` and `a-f` are recognized; any other character counts as a zero
/// nibble. A trailing odd character becomes the high nibble of a last byte.
/// Bytes past the payload size are dropped.
pub fn parse_hex_pairs(text: &str) -> Vec<u8> {
    let bytes: Vec<u8> = text
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = hex_nibble(pair[0]);
            let low = pair.get(1).copied().map(hex_nibble).unwrap_or(0);
            (high << 4) | low
        })
        .collect();

    if bytes.len() > PAYLOAD_SIZE {
        tracing::warn!(
            "Value has {} bytes; only the first {} are written",
            bytes.len(),
            PAYLOAD_SIZE
        );
        return bytes[..PAYLOAD_SIZE].to_vec();
    }
    bytes
}

fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => 0,
    }
}

/// Usage text
pub fn usage(program: &str) -> String {
    format!(
        "Apple System Management Control (SMC) Utility {version}\n\
         Usage:\n\
         {program} [options]\n    \
         -f         : fan info decoded\n    \
         -h         : help\n    \
         -k <key>   : key to manipulate\n    \
         -l         : list all keys and values\n    \
         -r         : read the value of a key\n    \
         -w <value> : write the specified value to a key\n    \
         -v         : version\n",
        version = crate::VERSION,
        program = program,
    )
}

/// Run an operation and print its output
pub fn execute<T: SmcTransport, W: Write>(
    client: &mut SmcClient<T>,
    operation: &Operation,
    out: &mut W,
) -> Result<()> {
    match operation {
        Operation::List => {
            let listing = client.enumerate_all()?;
            write!(out, "{}", listing)?;
        }
        Operation::Read(key) => {
            let value = client.read_key(*key)?;
            writeln!(out, "{}", value.render())?;
        }
        Operation::Write(value) => {
            client.write_key(value)?;
        }
        Operation::Fans => {
            let report = client.fan_report()?;
            write!(out, "{}", report)?;
        }
    }
    out.flush()?;
    Ok(())
}
