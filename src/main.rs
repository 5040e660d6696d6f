use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pgdelta::{commands, config};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = pgdelta::constants::CONFIG_FILENAME, global = true)]
    config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the changesets that turn the remote schema into the declared one
    Plan(commands::PlanArgs),

    /// Write a live database schema out as a snapshot
    Introspect(commands::IntrospectArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);
    tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            info!("Received shutdown signal");
            Ok(())
        }
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(config_file: &str, args: &config::ConfigArgs) -> Result<config::Config> {
    let file_config = config::load_config(config_file)?;
    config::ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(args.clone().into())
        .resolve()
}

async fn run_main(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Plan(args) => {
            let config = resolve_config(&cli.config_file, &args.config_args)?;
            commands::cmd_plan(&config, args).await
        }
        Commands::Introspect(args) => {
            let config = resolve_config(&cli.config_file, &args.config_args)?;
            commands::cmd_introspect(&config, args).await
        }
    }
}
