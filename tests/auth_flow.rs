// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for the SSO login flow and session reuse
//!
//! A mockito server stands in for both the SSO host (`/sso`) and the
//! application host (`/modern`).

mod common;

use anyhow::Result;
use common::{app_page, client_for, mock_full_signin};
use garmin_workouts::errors::GarminError;
use garmin_workouts::session::SessionStore;
use mockito::{Matcher, Server};
use tempfile::TempDir;

#[tokio::test]
async fn test_full_login_collects_both_cookie_sets() -> Result<()> {
    let mut server = Server::new_async().await;
    let signin = mock_full_signin(&mut server, "runner42", 1).await;

    let mut client = client_for(&server);
    let session = client.login(None).await?;

    signin.assert().await;
    assert_eq!(session.display_name, "runner42");
    assert_eq!(session.login_cookies.get("GARMIN-SSO").map(String::as_str), Some("1"));
    assert_eq!(session.login_cookies.get("CASTGC").map(String::as_str), Some("TGT-1"));
    assert_eq!(session.session_cookies.get("SESSIONID").map(String::as_str), Some("fresh"));
    assert!(!session.session_cookies.contains_key("CASTGC"));

    let profile = client.profile().expect("profile after login");
    assert_eq!(profile.full_name, "Ada Runner");
    assert_eq!(profile.unit_system, "metric");

    Ok(())
}

#[tokio::test]
async fn test_saved_session_skips_sign_in() -> Result<()> {
    let mut server = Server::new_async().await;
    let temp_dir = TempDir::new()?;
    let store = SessionStore::new(temp_dir.path().join("session.json"));

    // first run signs in and saves the session
    let signin = mock_full_signin(&mut server, "runner42", 1).await;
    let mut first = client_for(&server);
    store.save(&first.login(None).await?)?;

    // second run restores the cookies and only hits the session checkpoint
    let checkpoint = server
        .mock("GET", "/sso/login")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("service".into(), format!("{}/modern/", server.url())),
            Matcher::UrlEncoded("gateway".into(), "true".into()),
            Matcher::UrlEncoded("generateExtraServiceTicket".into(), "true".into()),
        ]))
        .match_header("cookie", Matcher::Regex("CASTGC=TGT-1".to_string()))
        .with_status(200)
        .with_body(app_page("runner42"))
        .expect(1)
        .create_async()
        .await;

    let saved = store.load()?.expect("saved session");
    let mut second = client_for(&server);
    let session = second.login(Some(&saved)).await?;

    checkpoint.assert_async().await;
    signin.assert().await;
    assert_eq!(session, saved);
    assert_eq!(second.display_name()?, "runner42");

    Ok(())
}

#[tokio::test]
async fn test_session_of_another_user_is_discarded() -> Result<()> {
    let mut server = Server::new_async().await;
    let checkpoint = server
        .mock("GET", "/sso/login")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(app_page("someone_else"))
        .expect(1)
        .create_async()
        .await;
    let signin = mock_full_signin(&mut server, "runner42", 1).await;

    let saved = garmin_workouts::models::SessionData {
        display_name: "runner42".to_string(),
        session_cookies: [("SESSIONID".to_string(), "stale".to_string())].into(),
        login_cookies: [("CASTGC".to_string(), "TGT-stale".to_string())].into(),
    };

    let mut client = client_for(&server);
    let session = client.login(Some(&saved)).await?;

    checkpoint.assert_async().await;
    signin.assert().await;
    assert_eq!(session.display_name, "runner42");
    assert_eq!(session.session_cookies.get("SESSIONID").map(String::as_str), Some("fresh"));
    assert_eq!(session.login_cookies.get("CASTGC").map(String::as_str), Some("TGT-1"));

    Ok(())
}

#[tokio::test]
async fn test_rejected_checkpoint_falls_back_to_sign_in() -> Result<()> {
    let mut server = Server::new_async().await;
    let _checkpoint = server
        .mock("GET", "/sso/login")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;
    let signin = mock_full_signin(&mut server, "runner42", 1).await;

    let saved = garmin_workouts::models::SessionData {
        display_name: "runner42".to_string(),
        session_cookies: Default::default(),
        login_cookies: Default::default(),
    };

    let mut client = client_for(&server);
    client.login(Some(&saved)).await?;

    signin.assert().await;
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() -> Result<()> {
    let mut server = Server::new_async().await;
    let _checkpoint = server
        .mock("GET", "/sso/login")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;
    let signin = mock_full_signin(&mut server, "runner42", 0).await;

    let saved = garmin_workouts::models::SessionData {
        display_name: "runner42".to_string(),
        session_cookies: Default::default(),
        login_cookies: Default::default(),
    };

    let mut client = client_for(&server);
    let result = client.login(Some(&saved)).await;

    assert!(matches!(result, Err(GarminError::TooManyRequests(_))));
    signin.assert().await;
    Ok(())
}

#[tokio::test]
async fn test_missing_csrf_token_stops_login() -> Result<()> {
    let mut server = Server::new_async().await;
    let page = server
        .mock("GET", "/sso/signin")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html><body>Down for maintenance</body></html>")
        .create_async()
        .await;
    let post = server
        .mock("POST", "/sso/signin")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut client = client_for(&server);
    let err = client.login(None).await.unwrap_err();

    page.assert_async().await;
    post.assert_async().await;
    assert!(matches!(err, GarminError::Authentication { .. }));
    assert!(err.to_string().contains("CSRF"));
    assert!(err.to_string().contains("200"));
    assert!(client.profile().is_none());
    Ok(())
}

#[tokio::test]
async fn test_rejected_credentials() -> Result<()> {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/sso/signin")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(common::signin_page())
        .create_async()
        .await;
    let _post = server
        .mock("POST", "/sso/signin")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<div class=\"error\">Invalid sign in. (Passwords are case sensitive.)</div>")
        .create_async()
        .await;
    let ticket = server
        .mock("GET", "/modern/")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut client = client_for(&server);
    let err = client.login(None).await.unwrap_err();

    ticket.assert_async().await;
    assert!(err.to_string().contains("ticket"));
    assert!(!err.to_string().contains("hunter2"));
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_post_is_an_authentication_error() -> Result<()> {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/sso/signin")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(common::signin_page())
        .create_async()
        .await;
    let _post = server
        .mock("POST", "/sso/signin")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let mut client = client_for(&server);
    let err = client.login(None).await.unwrap_err();

    assert!(matches!(err, GarminError::Authentication { status: Some(401), .. }));
    Ok(())
}
