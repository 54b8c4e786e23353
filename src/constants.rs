// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Service hosts, SSO paths, request headers and the endpoint path table.
//! Environment lookups live in [`env_config`].

use std::env;

/// Host names for the two Garmin Connect deployments
pub mod hosts {
    pub const GLOBAL_CONNECT: &str = "https://connect.garmin.com";
    pub const GLOBAL_SSO: &str = "https://sso.garmin.com/sso";
    pub const GLOBAL_MODERN: &str = "https://connect.garmin.com/modern";
    pub const GLOBAL_CSS: &str =
        "https://static.garmincdn.com/com.garmin.connect/ui/css/gauth-custom-v1.2-min.css";

    pub const CHINA_CONNECT: &str = "https://connect.garmin.cn";
    pub const CHINA_SSO: &str = "https://sso.garmin.cn/sso";
    pub const CHINA_MODERN: &str = "https://connect.garmin.cn/modern";
    pub const CHINA_CSS: &str =
        "https://static.garmincdn.cn/cn.garmin.connect/ui/css/gauth-custom-v1.2-min.css";
}

/// Single sign-on paths and page markers
pub mod sso {
    /// Sign-in widget, relative to the SSO base
    pub const SIGNIN: &str = "signin";
    /// Session checkpoint used to revalidate saved cookies
    pub const LOGIN: &str = "login";
    /// Connect login page, relative to the connect root; sent as `Referer`
    pub const LOGIN_PAGE: &str = "/en-US/signin";
    pub const PRIVACY_STATEMENT_URL: &str = "//connect.garmin.com/en-US/privacy/";
    pub const CLIENT_ID: &str = "GarminConnect";
    pub const LOCALE: &str = "en_US";

    /// JavaScript variables carrying the profile on application pages
    pub const USER_PREFERENCES_VAR: &str = "VIEWER_USERPREFERENCES";
    pub const SOCIAL_PROFILE_VAR: &str = "VIEWER_SOCIAL_PROFILE";
}

/// Request headers
pub mod headers {
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:82.0) Gecko/20100101 Firefox/82.0";
    pub const NK: &str = "NK";
    pub const NK_VALUE: &str = "NT";
    pub const APP_VERSION: &str = "X-app-ver";
    pub const APP_VERSION_VALUE: &str = "4.38.2.0";
    pub const REFERER: &str = "Referer";
    /// Page the workout editor posts from, relative to the app base
    pub const WORKOUT_CREATE_PAGE: &str = "workout/create/running";
}

/// Defaults for transport and paging
pub mod defaults {
    pub const HTTP_TIMEOUT_SECS: u64 = 60;
    pub const MAX_REDIRECTS: usize = 10;
    pub const ACTIVITY_PAGE_SIZE: usize = 20;
    pub const SLEEP_BUFFER_MINUTES: u32 = 60;
    pub const RESTING_HEART_RATE_METRIC_ID: u32 = 60;
    pub const CONFIG_DIR_NAME: &str = "garmin-workouts";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
    pub const SESSION_FILE_NAME: &str = "session.json";
}

/// REST endpoints of the application host, relative to its base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    DailySummary,
    SummaryChart,
    DailyHeartRate,
    DailySleep,
    DailyStress,
    RestingHeartRate,
    BodyComposition,
    MaxMetrics,
    DailyHydration,
    PersonalRecords,
    EarnedBadges,
    Devices,
    DeviceService,
    Activities,
    Activity,
    FitDownload,
    TcxDownload,
    GpxDownload,
    KmlDownload,
    CsvDownload,
    Workout,
    Logout,
}

impl Endpoint {
    /// Path template for this endpoint
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::DailySummary => "proxy/usersummary-service/usersummary/daily",
            Endpoint::SummaryChart => "proxy/wellness-service/wellness/dailySummaryChart",
            Endpoint::DailyHeartRate => "proxy/wellness-service/wellness/dailyHeartRate",
            Endpoint::DailySleep => "proxy/wellness-service/wellness/dailySleepData",
            Endpoint::DailyStress => "proxy/wellness-service/wellness/dailyStress",
            Endpoint::RestingHeartRate => "proxy/userstats-service/wellness/daily",
            Endpoint::BodyComposition => "proxy/weight-service/weight/dateRange",
            Endpoint::MaxMetrics => "proxy/metrics-service/metrics/maxmet/daily",
            Endpoint::DailyHydration => "proxy/usersummary-service/usersummary/hydration/daily",
            Endpoint::PersonalRecords => "proxy/personalrecord-service/personalrecord/prs",
            Endpoint::EarnedBadges => "proxy/badge-service/badge/earned",
            Endpoint::Devices => "proxy/device-service/deviceregistration/devices",
            Endpoint::DeviceService => "proxy/device-service/deviceservice",
            Endpoint::Activities => "proxy/activitylist-service/activities/search/activities",
            Endpoint::Activity => "proxy/activity-service/activity",
            Endpoint::FitDownload => "proxy/download-service/files/activity",
            Endpoint::TcxDownload => "proxy/download-service/export/tcx/activity",
            Endpoint::GpxDownload => "proxy/download-service/export/gpx/activity",
            Endpoint::KmlDownload => "proxy/download-service/export/kml/activity",
            Endpoint::CsvDownload => "proxy/download-service/export/csv/activity",
            Endpoint::Workout => "proxy/workout-service/workout",
            Endpoint::Logout => "auth/logout/",
        }
    }

    /// Path with a trailing segment, e.g. a display name or an activity id
    pub fn with_segment(self, segment: &str) -> String {
        format!("{}/{}", self.path(), segment)
    }
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Deployment to talk to (`global` or `china`)
    pub fn domain() -> Option<String> {
        env::var("GARMIN_DOMAIN").ok()
    }

    /// Override every service host with one base URL
    pub fn base_url() -> Option<String> {
        env::var("GARMIN_BASE_URL").ok()
    }

    /// Where the saved session lives
    pub fn session_file() -> Option<String> {
        env::var("GARMIN_SESSION_FILE").ok()
    }

    /// Transport timeout in seconds
    pub fn http_timeout_secs() -> u64 {
        env::var("GARMIN_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::defaults::HTTP_TIMEOUT_SECS)
    }

    /// Whether to verify TLS certificates
    pub fn verify_tls() -> bool {
        parse_flag(env::var("GARMIN_VERIFY_TLS").ok(), true)
    }

    /// Whether the transport follows redirects
    pub fn follow_redirects() -> bool {
        parse_flag(env::var("GARMIN_FOLLOW_REDIRECTS").ok(), true)
    }

    /// Account name used when no `--username` flag is given
    pub fn username() -> Option<String> {
        env::var("GARMIN_USERNAME").ok()
    }

    /// Password used when no `--password` flag is given
    pub fn password() -> Option<String> {
        env::var("GARMIN_PASSWORD").ok()
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string())
    }

    fn parse_flag(value: Option<String>, default: bool) -> bool {
        match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            _ => default,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_segments() {
        assert_eq!(
            Endpoint::DailySummary.with_segment("runner42"),
            "proxy/usersummary-service/usersummary/daily/runner42"
        );
        assert_eq!(
            Endpoint::Activity.with_segment("1234/splits"),
            "proxy/activity-service/activity/1234/splits"
        );
    }

    #[test]
    fn test_endpoints_are_relative() {
        for endpoint in [Endpoint::Workout, Endpoint::Devices, Endpoint::Logout] {
            assert!(!endpoint.path().starts_with('/'));
        }
    }
}
