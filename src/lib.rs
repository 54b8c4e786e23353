// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Garmin Workouts
//!
//! A Garmin Connect client that logs in through the browser single sign-on
//! flow, keeps the session between runs, and uploads randomized fartlek
//! running workouts.
//!
//! ## Features
//!
//! - **SSO login**: CSRF and ticket exchange with the Garmin SSO widget
//! - **Session reuse**: saved cookies are revalidated before logging in again
//! - **Fartlek generator**: random interval/recovery plans summing exactly to the target
//! - **Data accessors**: daily summaries, sleep, heart rate, devices, activities
//!
//! ## Architecture
//!
//! - **Transport**: `reqwest` clients with one cookie jar per host
//! - **Auth**: the login state machine and page scraping
//! - **Client**: session owner and endpoint accessors
//! - **Workout**: workout model, payload and the fartlek generator
//! - **Config**: TOML or environment configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use garmin_workouts::client::GarminClient;
//! use garmin_workouts::config::Config;
//! use garmin_workouts::models::Credentials;
//! use garmin_workouts::session::SessionStore;
//! use garmin_workouts::workout::FartlekGenerator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let store = SessionStore::new(config.session_path());
//!
//!     let credentials = Credentials::new("runner@example.com", "secret");
//!     let mut client = GarminClient::connect(config.service_urls()?, &config.http, credentials)?;
//!
//!     let saved = store.load()?;
//!     let session = client.login(saved.as_ref()).await?;
//!     store.save(&session)?;
//!
//!     let workout = FartlekGenerator::from_entropy().create_workout("45:00", "05:00", None)?;
//!     client.add_workout(&workout).await?;
//!
//!     Ok(())
//! }
//! ```

/// SSO login state machine and page scraping
pub mod auth;

/// Command-line arguments of the workout binary
pub mod cli;

/// Session owner and REST accessors
pub mod client;

/// Configuration management and persistence
pub mod config;

/// Hosts, paths, headers and environment lookups
pub mod constants;

/// Error types
pub mod errors;

/// Structured logging
pub mod logging;

/// Account and session data
pub mod models;

/// Saved sessions on disk
pub mod session;

/// HTTP transport and cookie jars
pub mod transport;

/// Workout model and fartlek generation
pub mod workout;
