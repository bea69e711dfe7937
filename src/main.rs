use anyhow::{Context, Result};
use clap::Parser;
use cliflux::app::{App, AppEvent, Command};
use cliflux::config::{self, Config};
use cliflux::keybindings::KeybindingRegistry;
use cliflux::miniflux::MinifluxClient;
use cliflux::theme::Theme;
use secrecy::SecretString;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const LOG_FILE_NAME: &str = "cliflux.log";

#[derive(Parser, Debug)]
#[command(name = "cliflux", version, about = "Terminal client for Miniflux")]
struct Args {
    /// Write a default configuration file and exit
    #[arg(long)]
    init: bool,
}

/// Send tracing output to `cliflux.log` next to the config file when
/// `RUST_LOG` is set. The terminal belongs to the UI, so nothing is logged
/// otherwise.
fn init_logging(config_path: &Path) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }
    let dir = config_path
        .parent()
        .context("Config path has no parent directory")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE_NAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_app(config: &Config) -> App {
    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }
    App::new(Theme::from_config(&config.theme), keybindings)
}

async fn run_client(config: Config) -> Result<()> {
    let client = MinifluxClient::new(
        config.server_url.clone(),
        SecretString::from(config.api_key.clone()),
        config.allow_invalid_certs,
    )
    .context("Failed to build HTTP client")?;
    let client = Arc::new(client);

    let mut app = build_app(&config);
    let initial = vec![Command::FetchEntries {
        listing: app.listing(),
    }];

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    cliflux::ui::run(&mut app, client, initial, event_tx, event_rx).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = match config::config_path() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config_path) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    if args.init {
        return match Config::init(&config_path) {
            Ok(()) => {
                println!("Wrote default configuration to {}", config_path.display());
                println!("Edit api_key and server_url, then run cliflux again.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_client(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Client terminated abnormally");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
