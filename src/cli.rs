// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Command-line arguments of the `fartlek` binary

use clap::Parser;
use std::path::PathBuf;

use crate::constants::env_config;
use crate::errors::{GarminError, Result};
use crate::models::Credentials;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fartlek")]
#[command(version, about = "Generate a randomized fartlek run and add it to Garmin Connect")]
pub struct WorkoutArgs {
    /// Total workout duration (MM:SS)
    #[arg(long)]
    pub duration: Option<String>,

    /// Target pace in minutes per kilometer (MM:SS)
    #[arg(long = "target-pace", alias = "target_pace")]
    pub target_pace: Option<String>,

    /// Print the workout as JSON instead of uploading it
    #[arg(long = "dry-run", alias = "dry_run")]
    pub dry_run: bool,

    /// Garmin Connect account (falls back to GARMIN_USERNAME)
    #[arg(long)]
    pub username: Option<String>,

    /// Garmin Connect password (falls back to GARMIN_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Workout name, defaults to "Running workout (<duration>)"
    #[arg(long)]
    pub name: Option<String>,

    /// Seed for reproducible intervals
    #[arg(long)]
    pub seed: Option<u64>,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<String>,

    /// Where the session is saved between runs
    #[arg(long = "session-file")]
    pub session_file: Option<PathBuf>,
}

/// What a validated invocation should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    DryRun,
    Submit(Credentials),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutRequest {
    pub duration: String,
    pub target_pace: String,
    pub name: Option<String>,
    pub seed: Option<u64>,
    pub mode: RunMode,
}

impl WorkoutArgs {
    /// Check required input, taking missing credentials from the environment
    pub fn validate(self) -> Result<WorkoutRequest> {
        self.validate_with(env_config::username(), env_config::password())
    }

    /// Same as [`validate`](Self::validate) with explicit credential fallbacks
    pub fn validate_with(
        self,
        env_username: Option<String>,
        env_password: Option<String>,
    ) -> Result<WorkoutRequest> {
        let duration = required(self.duration, "The --duration value is required (format: MM:SS)")?;
        let target_pace = required(
            self.target_pace,
            "The --target-pace value is required (format: MM:SS - mins/km)",
        )?;

        let mode = if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Submit(resolve_credentials(
                self.username.or(env_username),
                self.password.or(env_password),
            )?)
        };

        Ok(WorkoutRequest {
            duration,
            target_pace,
            name: self.name,
            seed: self.seed,
            mode,
        })
    }
}

/// Credentials from flags, or a usage error naming the missing one
pub fn resolve_credentials(username: Option<String>, password: Option<String>) -> Result<Credentials> {
    let username = required(username, "The Garmin Connect --username value is required")?;
    let password = required(password, "The Garmin Connect --password value is required")?;
    Ok(Credentials::new(username, password))
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GarminError::Usage(message.to_string()))
}
