// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared fixtures for the mocked Garmin Connect integration tests

#![allow(dead_code)]

use garmin_workouts::client::GarminClient;
use garmin_workouts::config::{HttpConfig, ServiceUrls};
use garmin_workouts::models::Credentials;
use garmin_workouts::transport::HttpTransport;
use mockito::{Matcher, Mock, ServerGuard};

pub const CSRF_TOKEN: &str = "d3c1a5f0b2";
pub const TICKET: &str = "ST-0421-abcDEF-cas";

pub fn signin_page() -> String {
    format!(
        r#"<html><body><form method="post">
            <input type="hidden" name="_csrf" value="{}" />
        </form></body></html>"#,
        CSRF_TOKEN
    )
}

pub fn ticket_page() -> String {
    format!(
        r#"<script>var response_url = "https:\/\/connect.garmin.com\/modern\/?ticket={}";</script>"#,
        TICKET
    )
}

/// Application page carrying both profile blocks, with escaped quotes the way
/// the real page embeds them
pub fn app_page(display_name: &str) -> String {
    format!(
        r#"<html><script>
            window.VIEWER_USERPREFERENCES = {{\"displayName\":\"{}\",\"measurementSystem\":\"metric\"}};
            window.VIEWER_SOCIAL_PROFILE = {{"fullName":"Ada Runner","userProfileId":7}};
        </script></html>"#,
        display_name
    )
}

pub fn credentials() -> Credentials {
    Credentials::new("runner@example.com", "hunter2")
}

pub fn client_for(server: &ServerGuard) -> GarminClient<HttpTransport> {
    let urls = ServiceUrls::with_base(&server.url()).expect("mock server URL");
    GarminClient::connect(urls, &HttpConfig::default(), credentials()).expect("HTTP client")
}

/// Mocks of the three full sign-in requests, each expected once
pub struct SigninMocks {
    pub page: Mock,
    pub post: Mock,
    pub ticket: Mock,
}

impl SigninMocks {
    pub async fn assert(&self) {
        self.page.assert_async().await;
        self.post.assert_async().await;
        self.ticket.assert_async().await;
    }
}

pub async fn mock_full_signin(server: &mut ServerGuard, display_name: &str, hits: usize) -> SigninMocks {
    let page = server
        .mock("GET", "/sso/signin")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("clientId".into(), "GarminConnect".into()),
            Matcher::UrlEncoded("id".into(), "gauth-widget".into()),
        ]))
        .match_header("referer", format!("{}/en-US/signin", server.url()).as_str())
        .match_header("nk", "NT")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_header("set-cookie", "GARMIN-SSO=1; Path=/; Secure")
        .with_body(signin_page())
        .expect(hits)
        .create_async()
        .await;

    let post = server
        .mock("POST", "/sso/signin")
        .match_query(Matcher::UrlEncoded("clientId".into(), "GarminConnect".into()))
        .match_header("referer", Matcher::Regex(r"/sso/signin\?".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "runner@example.com".into()),
            Matcher::UrlEncoded("password".into(), "hunter2".into()),
            Matcher::UrlEncoded("embed".into(), "false".into()),
            Matcher::UrlEncoded("_csrf".into(), CSRF_TOKEN.into()),
        ]))
        .with_status(200)
        .with_header("set-cookie", "CASTGC=TGT-1; Path=/sso; Secure")
        .with_body(ticket_page())
        .expect(hits)
        .create_async()
        .await;

    let ticket = server
        .mock("GET", "/modern/")
        .match_query(Matcher::UrlEncoded("ticket".into(), TICKET.into()))
        .with_status(200)
        .with_header("set-cookie", "SESSIONID=fresh; Path=/; HttpOnly")
        .with_body(app_page(display_name))
        .expect(hits)
        .create_async()
        .await;

    SigninMocks { page, post, ticket }
}
