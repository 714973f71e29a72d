use clap::Parser;
use std::process::ExitCode;
use stew::models::Args;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match stew::cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            stew::render::print_error(&err);
            ExitCode::FAILURE
        }
    }
}
