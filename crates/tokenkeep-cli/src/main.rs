//! tokenkeep - log in to the backend and keep the session token on disk.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tokenkeep_core::config::{PASSWORD_ENV, USERNAME_ENV};
use tokenkeep_core::{ApiClient, Config, FileStorage, SessionStore, SignIn};

type Store = SessionStore<FileStorage, ApiClient>;

#[derive(Parser)]
#[command(name = "tokenkeep", version, about = "Manage the backend session token")]
struct Cli {
    /// Backend base URL (overrides the config file and TOKENKEEP_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        /// Username (defaults to TOKENKEEP_USERNAME or the last login)
        username: Option<String>,
    },
    /// Remove the stored session token
    Logout,
    /// Print whether a session token is stored
    Status,
    /// Print the stored session token
    Token,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load_or_default();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let storage = FileStorage::open(&config.origin()?);
    let store = SessionStore::new(storage, ApiClient::from_config(&config)?);
    if !store.has_storage() {
        warn!("No cache directory available, the session token cannot be stored");
    }

    match cli.command {
        Command::Login { username } => login(&store, &config, username).await,
        Command::Logout => {
            store.logout().context("Failed to remove session token")?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            if store.is_logged_in() {
                println!("logged in");
            } else {
                println!("logged out");
            }
            Ok(())
        }
        Command::Token => {
            println!("{}", stored_token(&store)?);
            Ok(())
        }
    }
}

fn stored_token(store: &Store) -> Result<String> {
    match store.get_token() {
        Some(token) => Ok(token),
        None => anyhow::bail!("No session token stored"),
    }
}

async fn login(store: &Store, config: &Config, username: Option<String>) -> Result<()> {
    if store.is_logged_in() {
        println!("Already logged in");
        return Ok(());
    }

    let username = match username.or_else(|| std::env::var(USERNAME_ENV).ok()) {
        Some(username) => username,
        None => prompt_username(config.last_username.as_deref())?,
    };
    if username.is_empty() {
        anyhow::bail!("Username required");
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    match store.sign_in(&username, &password).await? {
        SignIn::SignedIn(_) => {
            if let Err(e) = Config::remember_username(&username) {
                warn!(error = %e, "Failed to save config");
            }
            info!(username = %username, "Logged in");
            println!("Logged in");
        }
        SignIn::StorageUnavailable => {
            println!("Storage unavailable, not logged in");
        }
    }
    Ok(())
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last_username {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}
