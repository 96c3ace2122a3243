//! Deferred value demonstrations CLI
//!
//! Entry point for the demo. Parses CLI arguments and delegates to the
//! scenario runner.

use clap::Parser as ClapParser;
use demo_cli::cli::exit_code;
use demo_cli::logging::init_logging;
use demo_cli::{Cli, CliError, Console, Demo};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(exit_code(&e));
        }
    };
    init_logging(cli.verbose);

    let console = Console::stdout(cli.format);
    let mut demo = Demo::from_cli(&cli, console);

    match demo.run(&cli.command) {
        Ok(()) => {}
        Err(CliError::Runtime(e)) => {
            eprintln!("Runtime Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
