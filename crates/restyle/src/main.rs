use std::process::ExitCode;

use clap::Parser;

use restyle::cli::{run, Cli};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let root = match std::env::current_dir() {
        Ok(root) => root,
        Err(e) => {
            log::error!("cannot determine working directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &root) {
        Ok(report) => {
            for output in &report.outputs {
                log::debug!("output: {}", output.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
