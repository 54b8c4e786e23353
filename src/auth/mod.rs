// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Authentication and Session Management
//!
//! Garmin Connect has no token API for personal accounts; a session is a
//! pair of cookie jars obtained by walking the browser SSO flow:
//!
//! 1. GET the SSO sign-in widget and scrape its CSRF token
//! 2. POST the credentials and scrape the service ticket from the reply
//! 3. GET the application root with the ticket, which sets the application
//!    cookies and embeds the user's profile in the page
//!
//! A saved [`SessionData`] short-circuits the flow: its cookies are restored
//! and the SSO `login` checkpoint must come back with a page for the same
//! display name. Anything else falls back to the full flow, once.

use tracing::{debug, info, warn};

use crate::config::ServiceUrls;
use crate::constants::{headers, sso};
use crate::errors::{GarminError, Result};
use crate::logging::AppLogger;
use crate::models::{Credentials, SessionData, UserProfile};
use crate::transport::{Host, RequestBody, RequestParts, Transport};

pub mod scrape;

pub use scrape::{extract_csrf_token, extract_embedded_json, extract_profile, extract_ticket, PageProfile};

/// Where the authenticator is in its login sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoSession,
    RevalidatingSession,
    Authenticating,
    Authenticated,
}

/// Drives the SSO flow over a borrowed transport
///
/// Logins mutate the transport's cookie jars; run at most one per transport
/// at a time.
pub struct Authenticator<'a, T: Transport + ?Sized> {
    transport: &'a T,
    urls: &'a ServiceUrls,
    state: AuthState,
}

impl<'a, T: Transport + ?Sized> Authenticator<'a, T> {
    pub fn new(transport: &'a T, urls: &'a ServiceUrls) -> Self {
        Self {
            transport,
            urls,
            state: AuthState::NoSession,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Establish a session, reusing `saved` when it is still valid
    ///
    /// On failure the state returns to [`AuthState::NoSession`].
    pub async fn login(
        &mut self,
        credentials: &Credentials,
        saved: Option<&SessionData>,
    ) -> Result<(SessionData, UserProfile)> {
        let result = self.run(credentials, saved).await;
        if let Err(err) = &result {
            self.transition(AuthState::NoSession);
            AppLogger::log_auth_event("unknown", "login", false, Some(&err.to_string()));
        }
        result
    }

    async fn run(
        &mut self,
        credentials: &Credentials,
        saved: Option<&SessionData>,
    ) -> Result<(SessionData, UserProfile)> {
        if let Some(saved) = saved {
            self.transition(AuthState::RevalidatingSession);
            if let Some(profile) = self.revalidate(saved).await? {
                self.transition(AuthState::Authenticated);
                AppLogger::log_auth_event(&profile.display_name, "session_reused", true, None);
                return Ok((self.session_data(&profile), profile));
            }
        }

        self.transition(AuthState::Authenticating);
        let profile = self.authenticate(credentials).await?;
        self.transition(AuthState::Authenticated);
        AppLogger::log_auth_event(&profile.display_name, "sso_login", true, None);

        Ok((self.session_data(&profile), profile))
    }

    /// `Ok(None)` means the saved session is unusable and a full login is needed
    async fn revalidate(&self, saved: &SessionData) -> Result<Option<UserProfile>> {
        debug!("Login with cookies");
        self.transport.clear_cookies(Host::Modern);
        self.transport.clear_cookies(Host::Sso);
        self.transport
            .restore_cookies(Host::Modern, &saved.session_cookies);
        self.transport.restore_cookies(Host::Sso, &saved.login_cookies);

        let parts = RequestParts::new().params(session_check_params(self.urls));
        let response = match self.transport.get(Host::Sso, sso::LOGIN, parts).await {
            Ok(response) => response,
            Err(err) if err.is_rejected_status() => {
                info!("Session expired ({}), authenticating again", err);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        debug!(http.status = response.status, "Session response");

        if !response.is_success() {
            info!("Session expired (HTTP {}), authenticating again", response.status);
            return Ok(None);
        }

        let profile = match extract_profile(&response.text()) {
            Ok(PageProfile::Found(profile)) => profile,
            Ok(PageProfile::Missing(variable)) => {
                info!("Session expired ({} not on page), authenticating again", variable);
                return Ok(None);
            }
            Err(err) => {
                warn!("Unreadable session page ({}), authenticating again", err);
                return Ok(None);
            }
        };

        if profile.display_name != saved.display_name {
            info!("Session not valid for user {}", profile.display_name);
            return Ok(None);
        }

        Ok(Some(profile))
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<UserProfile> {
        self.transport.clear_cookies(Host::Modern);
        self.transport.clear_cookies(Host::Sso);

        let params = signin_params(self.urls);

        let signin_parts = RequestParts::new()
            .header(headers::REFERER, self.urls.login_page())
            .params(params.clone());
        let response = self.transport.get(Host::Sso, sso::SIGNIN, signin_parts).await?;

        let csrf = extract_csrf_token(&response.text()).ok_or_else(|| {
            GarminError::auth(format!(
                "CSRF token not found on sign-in page (HTTP {})",
                response.status
            ))
        })?;
        debug!("CSRF token found, referer {}", response.final_url);

        let form = vec![
            ("username".to_string(), credentials.username.clone()),
            ("password".to_string(), credentials.password.clone()),
            ("embed".to_string(), "false".to_string()),
            ("_csrf".to_string(), csrf),
        ];
        let post_parts = RequestParts::new()
            .header(headers::REFERER, response.final_url.clone())
            .params(params);
        let response = self
            .transport
            .post(Host::Sso, sso::SIGNIN, post_parts, RequestBody::Form(form))
            .await?;

        let ticket = extract_ticket(&response.text()).ok_or_else(|| {
            GarminError::auth(format!(
                "Login ticket not found in sign-in response (HTTP {}); credentials rejected?",
                response.status
            ))
        })?;
        debug!("Login ticket found");

        let response = self
            .transport
            .get(Host::Modern, "", RequestParts::new().param("ticket", ticket))
            .await?;

        match extract_profile(&response.text())? {
            PageProfile::Found(profile) => {
                debug!(
                    display_name = %profile.display_name,
                    unit_system = %profile.unit_system,
                    "Profile loaded"
                );
                Ok(profile)
            }
            PageProfile::Missing(variable) => Err(GarminError::auth(format!(
                "{} not found on application page (HTTP {})",
                variable, response.status
            ))),
        }
    }

    fn session_data(&self, profile: &UserProfile) -> SessionData {
        SessionData {
            display_name: profile.display_name.clone(),
            session_cookies: self.transport.cookies(Host::Modern),
            login_cookies: self.transport.cookies(Host::Sso),
        }
    }

    fn transition(&mut self, next: AuthState) {
        debug!(from = ?self.state, to = ?next, "Authentication state change");
        self.state = next;
    }
}

/// Query of the SSO `login` checkpoint used to revalidate saved cookies
pub fn session_check_params(urls: &ServiceUrls) -> Vec<(String, String)> {
    vec![
        ("service".to_string(), format!("{}/", urls.modern)),
        ("webhost".to_string(), urls.connect.clone()),
        ("gateway".to_string(), "true".to_string()),
        ("generateExtraServiceTicket".to_string(), "true".to_string()),
        ("generateTwoExtraServiceTickets".to_string(), "true".to_string()),
    ]
}

/// Query of the SSO sign-in widget, shared by its GET and POST
pub fn signin_params(urls: &ServiceUrls) -> Vec<(String, String)> {
    let login_page = urls.login_page();
    let fixed = [
        ("service", urls.modern.as_str()),
        ("webhost", urls.connect.as_str()),
        ("source", login_page.as_str()),
        ("redirectAfterAccountLoginUrl", urls.modern.as_str()),
        ("redirectAfterAccountCreationUrl", urls.modern.as_str()),
        ("gauthHost", urls.sso.as_str()),
        ("locale", sso::LOCALE),
        ("id", "gauth-widget"),
        ("cssUrl", urls.css.as_str()),
        ("privacyStatementUrl", sso::PRIVACY_STATEMENT_URL),
        ("clientId", sso::CLIENT_ID),
        ("rememberMeShown", "true"),
        ("rememberMeChecked", "false"),
        ("createAccountShown", "true"),
        ("openCreateAccount", "false"),
        ("displayNameShown", "false"),
        ("consumeServiceTicket", "false"),
        ("initialFocus", "true"),
        ("embedWidget", "false"),
        ("generateExtraServiceTicket", "true"),
        ("generateTwoExtraServiceTickets", "false"),
        ("generateNoServiceTicket", "false"),
        ("globalOptInShown", "true"),
        ("globalOptInChecked", "false"),
        ("mobile", "false"),
        ("connectLegalTerms", "true"),
        ("locationPromptShown", "true"),
        ("showPassword", "true"),
    ];

    fixed
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
