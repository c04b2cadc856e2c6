//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use fuelstop_cli::CliError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match fuelstop_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("fuelstop: {err}");
            std::process::exit(1);
        }
    }
}
