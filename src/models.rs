// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Account and session structures shared by the authenticator, the session
//! store and the Garmin client.
//!
//! ## Core Models
//!
//! - [`Credentials`]: account name and password, redacted in debug output
//! - [`SessionData`]: cookies of an authenticated session plus its owner
//! - [`UserProfile`]: identity scraped from the application page

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cookie name to value, as stored in a session file
pub type CookieMap = BTreeMap<String, String>;

/// Login credentials for Garmin Connect
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A previously authenticated session that can skip the SSO handshake
///
/// The two cookie sets belong to different hosts: `session_cookies` to the
/// application host, `login_cookies` to the SSO host.
///
/// # Examples
///
/// ```rust
/// use garmin_workouts::models::SessionData;
///
/// let json = r#"{"display_name":"runner42","session_cookies":{"SESSIONID":"abc"},"login_cookies":{}}"#;
/// let session: SessionData = serde_json::from_str(json).unwrap();
/// assert_eq!(session.display_name, "runner42");
/// assert_eq!(session.session_cookies["SESSIONID"], "abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Display name of the account that owns the cookies
    pub display_name: String,
    /// Cookies of the application host
    #[serde(default)]
    pub session_cookies: CookieMap,
    /// Cookies of the SSO host
    #[serde(default)]
    pub login_cookies: CookieMap,
}

/// Identity of the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account handle used in per-user endpoint paths
    pub display_name: String,
    /// Name shown on the social profile, may be empty
    pub full_name: String,
    /// `metric` or `statute_us`
    pub unit_system: String,
}
