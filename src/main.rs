use clap::Parser;
use savanna_lib::{load_config, run_headless};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "savanna", version, about = "Run the savanna ecosystem without a renderer")]
struct Cli {
    /// JSON file overriding the default configuration.
    config: Option<PathBuf>,

    /// Number of days to simulate.
    #[arg(short, long, default_value_t = 100)]
    days: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let sim = run_headless(config, cli.days);
    match serde_json::to_string_pretty(&sim.history) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize history: {}", e);
            ExitCode::FAILURE
        }
    }
}
