// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for uploading generated workouts

mod common;

use anyhow::Result;
use common::{client_for, mock_full_signin};
use garmin_workouts::errors::GarminError;
use garmin_workouts::workout::FartlekGenerator;
use mockito::{Matcher, Server};
use serde_json::json;

const WORKOUT_PATH: &str = "/modern/proxy/workout-service/workout";

#[tokio::test]
async fn test_workout_is_posted_with_editor_headers() -> Result<()> {
    let mut server = Server::new_async().await;
    let signin = mock_full_signin(&mut server, "runner42", 1).await;

    let upload = server
        .mock("POST", WORKOUT_PATH)
        .match_header("referer", format!("{}/modern/workout/create/running", server.url()).as_str())
        .match_header("nk", "NT")
        .match_header("x-app-ver", "4.38.2.0")
        .match_header("content-type", "application/json")
        .match_header("cookie", Matcher::Regex("SESSIONID=fresh".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "sportType": {"sportTypeId": 1, "sportTypeKey": "running"},
            "workoutName": "Running workout (30:00)",
            "workoutSegments": [{"segmentOrder": 1}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"workoutId": 987654, "workoutName": "Running workout (30:00)"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut client = client_for(&server);
    client.login(None).await?;

    let workout = FartlekGenerator::seeded(21).create_workout("30:00", "05:00", None)?;
    let created = client.add_workout(&workout).await?;

    signin.assert().await;
    upload.assert_async().await;
    assert_eq!(created["workoutId"], 987654);
    Ok(())
}

#[tokio::test]
async fn test_posted_steps_match_the_workout() -> Result<()> {
    let mut server = Server::new_async().await;
    let workout = FartlekGenerator::seeded(4).create_workout("45:00", "04:30", Some("Track night"))?;
    let payload = serde_json::to_value(workout.to_payload()?)?;

    let upload = server
        .mock("POST", WORKOUT_PATH)
        .match_body(Matcher::Json(payload))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    client.add_workout(&workout).await?;

    upload.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_upload_failures_are_classified() -> Result<()> {
    let workout = FartlekGenerator::seeded(1).create_workout("20:00", "05:30", None)?;

    for status in [500u16, 403, 429, 401] {
        let mut server = Server::new_async().await;
        let _upload = server
            .mock("POST", WORKOUT_PATH)
            .with_status(status as usize)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.add_workout(&workout).await.unwrap_err();

        assert_eq!(err.status(), Some(status));
        match status {
            500 => assert!(matches!(err, GarminError::Connection { .. })),
            403 => assert!(matches!(err, GarminError::Forbidden(_))),
            429 => assert!(matches!(err, GarminError::TooManyRequests(_))),
            _ => assert!(matches!(err, GarminError::Authentication { .. })),
        }
    }

    Ok(())
}
