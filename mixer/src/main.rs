use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

mod config;
mod logging;
mod statsd;

#[derive(Parser)]
#[command(name = "mixer", about = "Serves content assembled from third-party providers")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    ContentRouter(ServiceArgs),
}

#[derive(Args)]
struct ServiceArgs {
    #[arg(long)]
    config_file_path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("config has no `{0}` section")]
    MissingSection(&'static str),
    #[error("invalid content router config: {0}")]
    Validation(#[from] content_router::config::ValidationError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    ContentRouter(#[from] content_router::errors::ContentRouterError),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("mixer: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        CliCommand::ContentRouter(args) => {
            let config = config::Config::from_file(&args.config_file_path)?;
            let _sentry = logging::init(config.common.logging.as_ref());
            statsd::init(config.common.metrics.as_ref())?;

            let router_config = config
                .content_router
                .ok_or(CliError::MissingSection("content_router"))?;
            router_config.validate()?;

            tracing::info!("Starting content-router");
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(content_router::run(router_config))?;
        }
    }
    Ok(())
}
