// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Error Handling
//!
//! A single error type shared by the transport, the authenticator and the
//! workout generator. Transport failures are classified once, where the HTTP
//! response is received, and travel upwards unchanged.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GarminError>;

/// Errors raised while talking to Garmin Connect or building workouts
#[derive(Debug, Error)]
pub enum GarminError {
    /// Network failure, timeout, or an unexpected non-2xx status
    #[error("Connection error: {message}")]
    Connection {
        /// HTTP status when the server answered, `None` for network failures
        status: Option<u16>,
        message: String,
    },

    /// HTTP 429
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// HTTP 401, a failed login step, or privacy-protected data
    #[error("Authentication error: {message}")]
    Authentication {
        /// Set when the server answered 401
        status: Option<u16>,
        message: String,
    },

    /// HTTP 403
    #[error("Forbidden URL: {0}")]
    Forbidden(String),

    /// Missing or inconsistent command-line input
    #[error("Usage error: {0}")]
    Usage(String),

    /// A duration or pace that is not `MM:SS`
    #[error("Invalid duration provided, it must be used in mm:ss format: {0}")]
    InvalidDurationFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GarminError {
    /// Map a non-success HTTP status to its error kind
    pub fn from_status(status: u16, url: &str) -> Self {
        match status {
            429 => GarminError::TooManyRequests(format!("HTTP 429 from {}", url)),
            401 => GarminError::Authentication {
                status: Some(401),
                message: format!("HTTP 401 from {}", url),
            },
            403 => GarminError::Forbidden(url.to_string()),
            _ => GarminError::Connection {
                status: Some(status),
                message: format!("HTTP {} from {}", status, url),
            },
        }
    }

    /// Authentication failure that did not come from an HTTP status
    pub fn auth(message: impl Into<String>) -> Self {
        GarminError::Authentication {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status attached to this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            GarminError::Connection { status, .. } | GarminError::Authentication { status, .. } => {
                *status
            }
            GarminError::TooManyRequests(_) => Some(429),
            GarminError::Forbidden(_) => Some(403),
            _ => None,
        }
    }

    /// Whether the server rejected the request with a status (as opposed to
    /// the network failing or the caller being rate limited)
    pub fn is_rejected_status(&self) -> bool {
        !matches!(self, GarminError::TooManyRequests(_)) && self.status().is_some()
    }
}

impl From<reqwest::Error> for GarminError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => {
                let url = err.url().map(|u| u.to_string()).unwrap_or_default();
                GarminError::from_status(status.as_u16(), &url)
            }
            None => GarminError::Connection {
                status: None,
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let url = "https://connect.garmin.com/modern/";

        assert!(matches!(GarminError::from_status(429, url), GarminError::TooManyRequests(_)));
        assert!(matches!(
            GarminError::from_status(401, url),
            GarminError::Authentication { status: Some(401), .. }
        ));
        assert!(matches!(GarminError::from_status(403, url), GarminError::Forbidden(_)));
        assert!(matches!(
            GarminError::from_status(500, url),
            GarminError::Connection { status: Some(500), .. }
        ));
        assert!(matches!(
            GarminError::from_status(404, url),
            GarminError::Connection { status: Some(404), .. }
        ));
    }

    #[test]
    fn test_rejected_status() {
        let url = "https://sso.garmin.com/sso/login";

        assert!(GarminError::from_status(401, url).is_rejected_status());
        assert!(GarminError::from_status(403, url).is_rejected_status());
        assert!(GarminError::from_status(502, url).is_rejected_status());
        assert!(!GarminError::from_status(429, url).is_rejected_status());

        let network = GarminError::Connection { status: None, message: "timed out".into() };
        assert!(!network.is_rejected_status());

        let scrape = GarminError::auth("CSRF token not found");
        assert!(!scrape.is_rejected_status());
    }

    #[test]
    fn test_messages_name_the_url() {
        let err = GarminError::from_status(403, "https://connect.garmin.com/modern/proxy/x");
        assert_eq!(err.to_string(), "Forbidden URL: https://connect.garmin.com/modern/proxy/x");
    }
}
