use clap::Parser;
use personal_cpi::args::{Args, Command};
use personal_cpi::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cpi_home().path();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.csv()).await?.print(),

        Command::Compute(compute_args) => {
            let config = Config::load(home).await?;
            let stdin = std::io::stdin();
            commands::compute(config, compute_args, stdin.lock(), std::io::stdout())
                .await?
                .print()
        }

        Command::Categories(categories_args) => {
            let config = Config::load(home).await?;
            commands::categories(config, categories_args)
                .await?
                .print()
        }

        Command::Import => commands::import(Config::load(home).await?)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "personal_cpi",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
