use std::process::ExitCode;

use clap::Parser;
use model_maker::{Args, Config};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match Config::from_args(args).and_then(|config| model_maker::run(&config)) {
        Ok(outcome) => {
            log::debug!("generated {}", outcome.source.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
