// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Garmin Connect Client
//!
//! Session owner plus thin accessors over the application's REST proxy.
//! Every accessor is a GET against an [`Endpoint`] returning the service's
//! JSON untouched; only the workout upload and logout change server state.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::config::{HttpConfig, ServiceUrls};
use crate::constants::{defaults, headers, Endpoint};
use crate::errors::{GarminError, Result};
use crate::logging::AppLogger;
use crate::models::{Credentials, SessionData, UserProfile};
use crate::transport::{Host, HttpTransport, RequestBody, RequestParts, Transport};
use crate::workout::Workout;

/// File formats offered by the activity download service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityDownloadFormat {
    /// The FIT file as recorded by the device (zipped)
    Original,
    Tcx,
    Gpx,
    Kml,
    Csv,
}

impl ActivityDownloadFormat {
    fn endpoint(self) -> Endpoint {
        match self {
            ActivityDownloadFormat::Original => Endpoint::FitDownload,
            ActivityDownloadFormat::Tcx => Endpoint::TcxDownload,
            ActivityDownloadFormat::Gpx => Endpoint::GpxDownload,
            ActivityDownloadFormat::Kml => Endpoint::KmlDownload,
            ActivityDownloadFormat::Csv => Endpoint::CsvDownload,
        }
    }
}

pub struct GarminClient<T: Transport> {
    transport: T,
    urls: ServiceUrls,
    credentials: Credentials,
    session: Option<SessionData>,
    profile: Option<UserProfile>,
}

impl GarminClient<HttpTransport> {
    /// Client over a fresh HTTP transport
    pub fn connect(urls: ServiceUrls, http: &HttpConfig, credentials: Credentials) -> Result<Self> {
        let transport = HttpTransport::new(&urls, http)?;
        Ok(Self::new(transport, urls, credentials))
    }
}

impl<T: Transport> GarminClient<T> {
    pub fn new(transport: T, urls: ServiceUrls, credentials: Credentials) -> Self {
        Self {
            transport,
            urls,
            credentials,
            session: None,
            profile: None,
        }
    }

    /// Log in, reusing `saved` when it still belongs to a live session
    ///
    /// Returns the session to persist for the next run.
    pub async fn login(&mut self, saved: Option<&SessionData>) -> Result<SessionData> {
        let (session, profile) = Authenticator::new(&self.transport, &self.urls)
            .login(&self.credentials, saved)
            .await?;

        info!(
            display_name = %profile.display_name,
            full_name = %profile.full_name,
            "Logged in to Garmin Connect"
        );
        self.session = Some(session.clone());
        self.profile = Some(profile);
        Ok(session)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> Option<&SessionData> {
        self.session.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn display_name(&self) -> Result<&str> {
        self.profile
            .as_ref()
            .map(|profile| profile.display_name.as_str())
            .ok_or_else(|| GarminError::auth("Not logged in"))
    }

    pub fn full_name(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.full_name.as_str())
    }

    pub fn unit_system(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.unit_system.as_str())
    }

    async fn get_json(&self, path: &str, parts: RequestParts) -> Result<Value> {
        self.transport.get(Host::Modern, path, parts).await?.json()
    }

    /// Daily activity summary; privacy-protected answers mean the session is not trusted
    pub async fn user_summary(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::DailySummary.with_segment(self.display_name()?);
        debug!("Requesting user summary");

        let summary = self
            .get_json(&path, RequestParts::new().param("calendarDate", date_param(date)))
            .await?;

        if summary.get("privacyProtected").and_then(Value::as_bool) == Some(true) {
            return Err(GarminError::auth("User summary is privacy protected"));
        }
        Ok(summary)
    }

    pub async fn steps_data(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::SummaryChart.with_segment(self.display_name()?);
        debug!("Requesting steps data");
        self.get_json(&path, RequestParts::new().param("date", date_param(date)))
            .await
    }

    pub async fn heart_rate(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::DailyHeartRate.with_segment(self.display_name()?);
        debug!("Requesting heart rate data");
        self.get_json(&path, RequestParts::new().param("date", date_param(date)))
            .await
    }

    pub async fn sleep_data(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::DailySleep.with_segment(self.display_name()?);
        debug!("Requesting sleep data");
        let parts = RequestParts::new()
            .param("date", date_param(date))
            .param("nonSleepBufferMinutes", defaults::SLEEP_BUFFER_MINUTES.to_string());
        self.get_json(&path, parts).await
    }

    pub async fn stress_data(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::DailyStress.with_segment(&date_param(date));
        debug!("Requesting stress data");
        self.get_json(&path, RequestParts::new()).await
    }

    pub async fn resting_heart_rate(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::RestingHeartRate.with_segment(self.display_name()?);
        debug!("Requesting resting heart rate data");
        let parts = RequestParts::new()
            .param("fromDate", date_param(date))
            .param("untilDate", date_param(date))
            .param("metricId", defaults::RESTING_HEART_RATE_METRIC_ID.to_string());
        self.get_json(&path, parts).await
    }

    /// Weight and body composition; `end` defaults to `start`
    pub async fn body_composition(&self, start: NaiveDate, end: Option<NaiveDate>) -> Result<Value> {
        debug!("Requesting body composition");
        let parts = RequestParts::new()
            .param("startDate", date_param(start))
            .param("endDate", date_param(end.unwrap_or(start)));
        self.get_json(Endpoint::BodyComposition.path(), parts).await
    }

    pub async fn max_metrics(&self, date: NaiveDate) -> Result<Value> {
        let day = date_param(date);
        let path = Endpoint::MaxMetrics.with_segment(&format!("{}/{}", day, day));
        debug!("Requesting max metrics");
        self.get_json(&path, RequestParts::new()).await
    }

    pub async fn hydration_data(&self, date: NaiveDate) -> Result<Value> {
        let path = Endpoint::DailyHydration.with_segment(&date_param(date));
        debug!("Requesting hydration data");
        self.get_json(&path, RequestParts::new()).await
    }

    pub async fn personal_records(&self) -> Result<Value> {
        let path = Endpoint::PersonalRecords.with_segment(self.display_name()?);
        debug!("Requesting personal records");
        self.get_json(&path, RequestParts::new()).await
    }

    pub async fn earned_badges(&self) -> Result<Value> {
        debug!("Requesting earned badges");
        self.get_json(Endpoint::EarnedBadges.path(), RequestParts::new())
            .await
    }

    pub async fn devices(&self) -> Result<Value> {
        debug!("Requesting devices");
        self.get_json(Endpoint::Devices.path(), RequestParts::new()).await
    }

    pub async fn device_settings(&self, device_id: &str) -> Result<Value> {
        let path = Endpoint::DeviceService.with_segment(&format!("device-info/settings/{}", device_id));
        debug!(device_id, "Requesting device settings");
        self.get_json(&path, RequestParts::new()).await
    }

    /// Alarms of every registered device, in device order
    pub async fn device_alarms(&self) -> Result<Vec<Value>> {
        debug!("Requesting device alarms");
        let devices = self.devices().await?;

        let mut alarms = Vec::new();
        for device in devices.as_array().into_iter().flatten() {
            let Some(device_id) = device.get("deviceId").and_then(id_segment) else {
                continue;
            };
            let settings = self.device_settings(&device_id).await?;
            if let Some(device_alarms) = settings.get("alarms").and_then(Value::as_array) {
                alarms.extend(device_alarms.iter().cloned());
            }
        }
        Ok(alarms)
    }

    pub async fn last_used_device(&self) -> Result<Value> {
        debug!("Requesting last used device");
        self.get_json(&Endpoint::DeviceService.with_segment("mylastused"), RequestParts::new())
            .await
    }

    pub async fn activities(&self, start: usize, limit: usize) -> Result<Value> {
        debug!(start, limit, "Requesting activities");
        let parts = RequestParts::new()
            .param("start", start.to_string())
            .param("limit", limit.to_string());
        self.get_json(Endpoint::Activities.path(), parts).await
    }

    pub async fn last_activity(&self) -> Result<Option<Value>> {
        let activities = self.activities(0, 1).await?;
        Ok(activities.as_array().and_then(|list| list.last()).cloned())
    }

    /// All activities between two dates, fetched a page at a time until an empty page
    ///
    /// `activity_type` is a service key such as `running` or `cycling`.
    pub async fn activities_by_date(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        activity_type: Option<&str>,
    ) -> Result<Vec<Value>> {
        let page_size = defaults::ACTIVITY_PAGE_SIZE;
        let mut activities = Vec::new();
        let mut start = 0;

        info!(%start_date, %end_date, "Requesting activities by date");
        loop {
            let mut parts = RequestParts::new()
                .param("startDate", date_param(start_date))
                .param("endDate", date_param(end_date))
                .param("start", start.to_string())
                .param("limit", page_size.to_string());
            if let Some(activity_type) = activity_type {
                parts = parts.param("activityType", activity_type);
            }

            debug!("Requesting activities {} to {}", start, start + page_size);
            let page = self.get_json(Endpoint::Activities.path(), parts).await?;
            match page.as_array() {
                Some(list) if !list.is_empty() => {
                    activities.extend(list.iter().cloned());
                    start += page_size;
                }
                _ => break,
            }
        }

        Ok(activities)
    }

    pub async fn activity_splits(&self, activity_id: &str) -> Result<Value> {
        let path = Endpoint::Activity.with_segment(&format!("{}/splits", activity_id));
        debug!(activity_id, "Requesting activity splits");
        self.get_json(&path, RequestParts::new()).await
    }

    /// Raw bytes of an activity export
    pub async fn download_activity(
        &self,
        activity_id: &str,
        format: ActivityDownloadFormat,
    ) -> Result<Vec<u8>> {
        let path = format.endpoint().with_segment(activity_id);
        debug!(activity_id, ?format, "Downloading activity");
        let response = self.transport.get(Host::Modern, &path, RequestParts::new()).await?;
        Ok(response.body)
    }

    /// Create `workout` in the account's workout library
    pub async fn add_workout(&self, workout: &Workout) -> Result<Value> {
        let payload = serde_json::to_value(workout.to_payload()?)?;
        let parts = RequestParts::new()
            .header(
                headers::REFERER,
                format!("{}/{}", self.urls.modern, headers::WORKOUT_CREATE_PAGE),
            )
            .header(headers::NK, headers::NK_VALUE)
            .header(headers::APP_VERSION, headers::APP_VERSION_VALUE);

        let result = self
            .transport
            .post(Host::Modern, Endpoint::Workout.path(), parts, RequestBody::Json(payload))
            .await
            .and_then(|response| response.json());

        AppLogger::log_workout_submission(&workout.name, workout.steps.len(), result.is_ok());
        result
    }

    /// End the server session and drop local cookies
    pub async fn logout(&mut self) -> Result<()> {
        self.transport
            .get(Host::Modern, Endpoint::Logout.path(), RequestParts::new().param("url", ""))
            .await?;

        self.transport.clear_cookies(Host::Modern);
        self.transport.clear_cookies(Host::Sso);
        if let Some(profile) = self.profile.take() {
            AppLogger::log_auth_event(&profile.display_name, "logout", true, None);
        }
        self.session = None;
        Ok(())
    }
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn id_segment(id: &Value) -> Option<String> {
    match id {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}
