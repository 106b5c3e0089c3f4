//! smc-util Binary
//!
//! Reads, writes and lists SMC keys and prints the fan report.

use std::io;
use std::process::ExitCode;

use smcutil::cli::{self, Action, Args};
use smcutil::{Config, SmcClient};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // Initialize tracing/logging; stdout is reserved for results
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let argv: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| "smc-util".to_string());

    let args = match Args::parse_getopt(argv) {
        Ok((args, diagnostics)) => {
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic);
            }
            args
        }
        Err(e) => {
            let _ = e.print();
            println!("{}", cli::usage(&program));
            return ExitCode::FAILURE;
        }
    };

    let operation = match args.action() {
        Ok(Action::Version) => {
            println!("{}", smcutil::VERSION);
            return ExitCode::SUCCESS;
        }
        Ok(Action::Usage) => {
            println!("{}", cli::usage(&program));
            return ExitCode::FAILURE;
        }
        Ok(Action::Run(operation)) => operation,
        Err(e) => {
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!("smc-util v{}: {}", smcutil::VERSION, operation.name());

    let mut client = match SmcClient::open(Config::default()) {
        Ok(client) => client,
        Err(e) => {
            println!("Error: open SMC: {}", e);
            return ExitCode::SUCCESS;
        }
    };

    let stdout = io::stdout();
    if let Err(e) = cli::execute(&mut client, &operation, &mut stdout.lock()) {
        println!("Error: {}: {}", operation.name(), e);
    }

    client.close();
    ExitCode::SUCCESS
}
