// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;
use garmin_workouts::cli::resolve_credentials;
use garmin_workouts::client::GarminClient;
use garmin_workouts::config::Config;
use garmin_workouts::constants::env_config;
use garmin_workouts::logging;
use garmin_workouts::session::SessionStore;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "garmin-login")]
#[command(about = "Log in to Garmin Connect and save the session for later runs")]
struct Cli {
    /// Garmin Connect account (falls back to GARMIN_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Garmin Connect password (falls back to GARMIN_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Where the session is saved between runs
    #[arg(long = "session-file")]
    session_file: Option<PathBuf>,

    /// Ignore any saved session and go through the full sign-in
    #[arg(long)]
    fresh: bool,

    /// End the session on the server and delete the saved one
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let cli = Cli::parse();
    let credentials = resolve_credentials(
        cli.username.or_else(env_config::username),
        cli.password.or_else(env_config::password),
    )?;

    let mut config = Config::load(cli.config).context("Failed to load configuration")?;
    if cli.session_file.is_some() {
        config.session_file = cli.session_file;
    }

    let store = SessionStore::new(config.session_path());
    let saved = if cli.fresh {
        None
    } else {
        store.load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable saved session: {}", e);
            None
        })
    };

    let mut client = GarminClient::connect(config.service_urls()?, &config.http, credentials)?;
    let session = client
        .login(saved.as_ref())
        .await
        .context("Garmin Connect login failed")?;

    if cli.logout {
        client.logout().await.context("Logout failed")?;
        store.clear()?;
        println!("Logged out of Garmin Connect");
        return Ok(());
    }

    store.save(&session).context("Failed to save session")?;

    if let Some(profile) = client.profile() {
        println!("Display name: {}", profile.display_name);
        println!("Full name:    {}", profile.full_name);
        println!("Units:        {}", profile.unit_system);
    }
    println!("Session saved to {}", store.path().display());

    Ok(())
}
