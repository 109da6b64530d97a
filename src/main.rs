// Panel Bootstrap - Main entry point
// Seed a panel store, render node daemon configs, keep the deployment alive

use clap::{Parser, Subcommand};
use panel_bootstrap_lib::commands::{self, StoreArgs};
use panel_bootstrap_lib::store::Encrypter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "panel-bootstrap", version)]
#[command(about = "Provision a game panel deployment and render node daemon configs")]
struct Cli {
    /// JSON store file (default: ~/PanelBootstrap/store.json)
    #[arg(long, global = true, env = "PANEL_STORE_PATH")]
    store: Option<PathBuf>,

    /// Key sealing node secrets at rest, `base64:` followed by 32 bytes
    #[arg(long, global = true, env = "APP_KEY", hide_env_values = true)]
    app_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the admin user, location, node and allocations if missing
    Seed,
    /// Print the daemon config for NODE_NAME as YAML
    NodeConfig,
    /// Serve /, /ping and /health on PORT
    KeepAlive,
    /// Print a fresh APP_KEY
    GenerateKey,
}

fn main() -> ExitCode {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so node-config output stays clean YAML
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store_args = StoreArgs {
        path: cli.store,
        app_key: cli.app_key,
    };

    let result = match cli.command {
        Command::Seed => {
            commands::seed::run(&store_args, &mut std::io::stdout().lock()).map(|_| ())
        }
        Command::NodeConfig => {
            commands::node_config::run(&store_args, &mut std::io::stdout().lock())
        }
        Command::KeepAlive => commands::keep_alive::run(),
        Command::GenerateKey => {
            println!("{}", Encrypter::generate_app_key());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
