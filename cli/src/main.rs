use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use crm_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = runtime.block_on(crm_cli::run(cli, &mut out));
    out.flush().context("failed to flush stdout")?;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("error[{}]: {err}", err.as_str());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
