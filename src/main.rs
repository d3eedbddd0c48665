//! convsoak CLI
//!
//! ```bash
//! convsoak <input_file> <kernel_file> <iterations> [--mode parallel|serialized|redundant]
//! ```
//!
//! Prints `Result:` and the output matrix on stdout. Logs go to stderr.

use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;

use convsoak::config::{usage, Cli};
use convsoak::{io, Result, WorkerPool};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                return ExitCode::SUCCESS;
            }
            _ => {
                let program = std::env::args()
                    .next()
                    .unwrap_or_else(|| "convsoak".to_string());
                println!("{}", usage(&program));
                eprint!("{err}");
                return ExitCode::from(1);
            }
        },
    };

    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Install a stderr fmt subscriber; stdout carries only the result
fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level())
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.pool_config()?;

    let input = io::read_matrix_file(&cli.input_file)?;
    let kernel = io::read_kernel_file(&cli.kernel_file)?;
    debug!(
        rows = input.rows(),
        cols = input.cols(),
        kernel = kernel.size(),
        "inputs loaded"
    );

    let pool = WorkerPool::new(config);
    let run = pool.run(&input, &kernel)?;

    if cli.report {
        run.report.log_summary();
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(io::format_result(&run.output).as_bytes())?;
    stdout.flush()?;
    Ok(())
}
