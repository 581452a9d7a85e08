//! Service Health Tracker Binary

use clap::Parser;
use service_health_tracker::cli::{self, Args, Commands};
use service_health_tracker::{Config, JsonFileStore, ServiceRegistry};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args = Args::parse();

    // Load configuration
    let config = args.config();

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    initialize_tracing(&config);

    info!(
        "Starting service health tracker v{} with data file {}",
        env!("CARGO_PKG_VERSION"),
        config.data_file.display()
    );

    let registry = ServiceRegistry::new(JsonFileStore::new(&config.data_file));
    let command = args.command.unwrap_or(Commands::Shell);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = cli::execute(command, &registry, stdin.lock(), stdout.lock()) {
        error!("Command failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Initialize logging on stderr
fn initialize_tracing(config: &Config) {
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
