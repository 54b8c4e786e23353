// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # HTTP Transport
//!
//! The authenticator and the client only ever see the [`Transport`] trait:
//! a GET/POST against one of two hosts, each with its own cookie jar. Non-2xx
//! responses never come back as `Ok`; they are classified into
//! [`GarminError`](crate::errors::GarminError) kinds by the implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::errors::Result;
use crate::models::CookieMap;

pub mod cookies;
pub mod http;

pub use cookies::SessionCookieJar;
pub use http::HttpTransport;

/// The two hosts taking part in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Host {
    /// Single sign-on service
    Sso,
    /// Connect web application and its REST proxy
    Modern,
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Sso => write!(f, "sso"),
            Host::Modern => write!(f, "modern"),
        }
    }
}

/// Headers and query parameters of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Value of the first query parameter with this name
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first header with this name, compared case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    /// `application/json`
    Json(Value),
}

/// A successful (2xx) response
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    /// Raw body, already gzip-decoded
    pub body: Vec<u8>,
    /// URL after redirects
    pub final_url: String,
    /// Response headers, names lower-cased
    pub headers: HashMap<String, String>,
}

impl TransportResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Result<Value> {
        if self.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking-until-answered request/response against the two Garmin hosts
///
/// Implementations own the cookie jars; a login mutates them, so one
/// transport must not run two logins at the same time.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, host: Host, path: &str, parts: RequestParts) -> Result<TransportResponse>;

    async fn post(
        &self,
        host: Host,
        path: &str,
        parts: RequestParts,
        body: RequestBody,
    ) -> Result<TransportResponse>;

    /// Merge saved cookies into the jar of `host`
    fn restore_cookies(&self, host: Host, cookies: &CookieMap);

    /// Current cookies of `host`
    fn cookies(&self, host: Host) -> CookieMap;

    fn clear_cookies(&self, host: Host);
}
