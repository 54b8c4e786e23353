// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `reqwest`-backed [`Transport`] with one client and cookie jar per host

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{Host, RequestBody, RequestParts, SessionCookieJar, Transport, TransportResponse};
use crate::config::{HttpConfig, ServiceUrls};
use crate::constants::{defaults, headers};
use crate::errors::{GarminError, Result};
use crate::logging::AppLogger;
use crate::models::CookieMap;

struct ApiClient {
    host: Host,
    base_url: String,
    client: Client,
    jar: Arc<SessionCookieJar>,
}

impl ApiClient {
    fn new(host: Host, base_url: &str, http: &HttpConfig) -> Result<Self> {
        let jar = Arc::new(SessionCookieJar::new());

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static("nk"),
            HeaderValue::from_static(headers::NK_VALUE),
        );

        let redirect = if http.follow_redirects {
            Policy::limited(defaults::MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(headers::USER_AGENT)
            .default_headers(default_headers)
            .timeout(Duration::from_secs(http.timeout_secs))
            .danger_accept_invalid_certs(!http.verify_tls)
            .redirect(redirect)
            .gzip(true)
            .build()
            .map_err(|e| GarminError::Connection {
                status: None,
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            host,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            jar,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        parts: RequestParts,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse> {
        let url = self.url(path);
        debug!(http.method = %method, http.url = %url, "Sending request");

        let mut request = self.client.request(method.clone(), &url).query(&parts.query);
        for (name, value) in &parts.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match body {
            Some(RequestBody::Form(fields)) => request.form(&fields),
            Some(RequestBody::Json(value)) => request.json(&value),
            None => request,
        };

        let started = Instant::now();
        let response = request.send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();
        let bytes = response.bytes().await?;

        AppLogger::log_http_request(
            method.as_str(),
            &self.host.to_string(),
            path,
            status,
            started.elapsed().as_millis() as u64,
        );

        if !(200..300).contains(&status) {
            debug!(
                http.status = status,
                body = %String::from_utf8_lossy(&bytes[..bytes.len().min(512)]),
                "Response in error"
            );
            return Err(GarminError::from_status(status, &url));
        }

        Ok(TransportResponse {
            status,
            body: bytes.to_vec(),
            final_url,
            headers: response_headers,
        })
    }
}

/// Production transport talking to the SSO and application hosts
pub struct HttpTransport {
    sso: ApiClient,
    modern: ApiClient,
}

impl HttpTransport {
    pub fn new(urls: &ServiceUrls, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            sso: ApiClient::new(Host::Sso, &urls.sso, http)?,
            modern: ApiClient::new(Host::Modern, &urls.modern, http)?,
        })
    }

    /// Absolute URL of `path` on `host`
    pub fn url(&self, host: Host, path: &str) -> String {
        self.client(host).url(path)
    }

    fn client(&self, host: Host) -> &ApiClient {
        match host {
            Host::Sso => &self.sso,
            Host::Modern => &self.modern,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, host: Host, path: &str, parts: RequestParts) -> Result<TransportResponse> {
        self.client(host).send(Method::GET, path, parts, None).await
    }

    async fn post(
        &self,
        host: Host,
        path: &str,
        parts: RequestParts,
        body: RequestBody,
    ) -> Result<TransportResponse> {
        self.client(host)
            .send(Method::POST, path, parts, Some(body))
            .await
    }

    fn restore_cookies(&self, host: Host, cookies: &CookieMap) {
        debug!(host = %host, count = cookies.len(), "Restoring cookies for saved session");
        self.client(host).jar.restore(cookies);
    }

    fn cookies(&self, host: Host) -> CookieMap {
        self.client(host).jar.snapshot()
    }

    fn clear_cookies(&self, host: Host) {
        self.client(host).jar.clear();
    }
}
