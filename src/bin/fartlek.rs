// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;
use garmin_workouts::cli::{RunMode, WorkoutArgs, WorkoutRequest};
use garmin_workouts::client::GarminClient;
use garmin_workouts::config::Config;
use garmin_workouts::logging;
use garmin_workouts::models::Credentials;
use garmin_workouts::session::SessionStore;
use garmin_workouts::workout::{FartlekGenerator, Workout};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

const USAGE_EXIT_CODE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init_from_env() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let args = WorkoutArgs::parse();
    let config_path = args.config.clone();
    let session_file = args.session_file.clone();

    let request = match args.validate() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    match run(request, config_path, session_file).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    request: WorkoutRequest,
    config_path: Option<String>,
    session_file: Option<PathBuf>,
) -> Result<()> {
    let mut generator = match request.seed {
        Some(seed) => FartlekGenerator::seeded(seed),
        None => FartlekGenerator::from_entropy(),
    };
    let workout = generator.create_workout(
        &request.duration,
        &request.target_pace,
        request.name.as_deref(),
    )?;
    info!(name = %workout.name, steps = workout.steps.len(), "Workout generated");

    match request.mode {
        RunMode::DryRun => {
            println!("{}", serde_json::to_string_pretty(&workout.to_payload()?)?);
            Ok(())
        }
        RunMode::Submit(credentials) => submit(&workout, credentials, config_path, session_file).await,
    }
}

async fn submit(
    workout: &Workout,
    credentials: Credentials,
    config_path: Option<String>,
    session_file: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    if session_file.is_some() {
        config.session_file = session_file;
    }

    let urls = config.service_urls()?;
    let store = SessionStore::new(config.session_path());
    let saved = store.load().unwrap_or_else(|e| {
        warn!("Ignoring unreadable saved session: {}", e);
        None
    });

    let mut client = GarminClient::connect(urls.clone(), &config.http, credentials)?;
    let session = client
        .login(saved.as_ref())
        .await
        .context("Garmin Connect login failed")?;
    store.save(&session).context("Failed to save session")?;

    client
        .add_workout(workout)
        .await
        .context("Failed to add workout")?;

    println!("Workout added. Check {}/workouts", urls.modern);
    Ok(())
}
