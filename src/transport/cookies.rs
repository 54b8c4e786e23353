// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Name/value cookie jar plugged into a `reqwest::Client`.
//!
//! Each host gets its own client and jar, so the jar does not track domains
//! or paths: every stored cookie is sent with every request of its client.

use chrono::{DateTime, Utc};
use cookie::Cookie;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;

use crate::models::CookieMap;

#[derive(Debug, Default)]
pub struct SessionCookieJar {
    cookies: RwLock<CookieMap>,
}

impl SessionCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `cookies` into the jar, replacing values of the same name
    pub fn restore(&self, cookies: &CookieMap) {
        let mut jar = self.write();
        for (name, value) in cookies {
            jar.insert(name.clone(), value.clone());
        }
    }

    pub fn snapshot(&self) -> CookieMap {
        self.read().clone()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, CookieMap> {
        self.cookies.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CookieMap> {
        self.cookies.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CookieStore for SessionCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {
        let mut jar = self.write();
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            match parse_set_cookie(raw, Utc::now()) {
                Some(SetCookie::Store { name, value }) => {
                    jar.insert(name, value);
                }
                Some(SetCookie::Remove { name }) => {
                    jar.remove(&name);
                }
                None => {}
            }
        }
    }

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        let jar = self.read();
        if jar.is_empty() {
            return None;
        }
        let header = jar
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SetCookie {
    Store { name: String, value: String },
    Remove { name: String },
}

fn parse_set_cookie(raw: &str, now: DateTime<Utc>) -> Option<SetCookie> {
    let cookie = Cookie::parse(raw).ok()?;
    let name = cookie.name().to_string();

    // Max-Age wins over Expires
    let expired = match (cookie.max_age(), cookie.expires_datetime()) {
        (Some(max_age), _) => max_age.whole_seconds() <= 0,
        (None, Some(expires)) => expires.unix_timestamp() <= now.timestamp(),
        (None, None) => false,
    };

    if expired {
        Some(SetCookie::Remove { name })
    } else {
        Some(SetCookie::Store { name, value: cookie.value_trimmed().to_string() })
    }
}
