// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Extraction of tokens and embedded JSON from SSO and application pages.
//!
//! Every function returns `None` when its marker is absent so callers can
//! tell "the session is gone" apart from a hard failure.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::constants::sso;
use crate::errors::{GarminError, Result};
use crate::models::UserProfile;

fn csrf_regex() -> Option<&'static Regex> {
    static CSRF_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    CSRF_REGEX
        .get_or_init(|| Regex::new(r#"name="_csrf"\s+value="(\w+)""#).ok())
        .as_ref()
}

fn ticket_regex() -> Option<&'static Regex> {
    static TICKET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    TICKET_REGEX
        .get_or_init(|| Regex::new(r"\?ticket=([\w-]+)").ok())
        .as_ref()
}

fn first_capture(regex: Option<&Regex>, text: &str) -> Option<String> {
    regex?
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// CSRF token of the sign-in form
pub fn extract_csrf_token(html: &str) -> Option<String> {
    first_capture(csrf_regex(), html)
}

/// Service ticket handed out after a successful credential POST
pub fn extract_ticket(html: &str) -> Option<String> {
    first_capture(ticket_regex(), html)
}

/// Parse the object literal assigned to the JavaScript variable `name`
///
/// Matches `name = { ... };`, taking everything up to the first `};` after
/// the opening brace, with `\"` unescaped. `Ok(None)` means the assignment is
/// not on the page; a present but unparseable literal is an error.
pub fn extract_embedded_json(html: &str, name: &str) -> Result<Option<Value>> {
    let Some(start) = find_object_assignment(html, name) else {
        return Ok(None);
    };
    let Some(length) = html[start..].find("};") else {
        return Ok(None);
    };

    let literal = html[start..=start + length].replace("\\\"", "\"");
    serde_json::from_str(&literal)
        .map(Some)
        .map_err(|e| GarminError::auth(format!("Malformed {} JSON: {}", name, e)))
}

/// Byte offset of the `{` in the first `name = {`, whitespace allowed around `=`
fn find_object_assignment(html: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let mut from = 0;
    while let Some(offset) = html[from..].find(name) {
        let after_name = from + offset + name.len();
        let value = html[after_name..]
            .trim_start()
            .strip_prefix('=')
            .map(str::trim_start)
            .filter(|value| value.starts_with('{'));
        if let Some(value) = value {
            return Some(html.len() - value.len());
        }
        from = after_name;
    }
    None
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPreferences {
    display_name: String,
    measurement_system: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialProfile {
    #[serde(default)]
    full_name: Option<String>,
}

/// Outcome of looking for the profile blocks on an application page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageProfile {
    Found(UserProfile),
    /// The named JavaScript variable is not on the page
    Missing(&'static str),
}

/// Build the user profile from `VIEWER_USERPREFERENCES` and `VIEWER_SOCIAL_PROFILE`
pub fn extract_profile(html: &str) -> Result<PageProfile> {
    let Some(preferences) = extract_embedded_json(html, sso::USER_PREFERENCES_VAR)? else {
        return Ok(PageProfile::Missing(sso::USER_PREFERENCES_VAR));
    };
    let Some(social) = extract_embedded_json(html, sso::SOCIAL_PROFILE_VAR)? else {
        return Ok(PageProfile::Missing(sso::SOCIAL_PROFILE_VAR));
    };

    let preferences: UserPreferences = serde_json::from_value(preferences).map_err(|e| {
        GarminError::auth(format!("Unexpected {} content: {}", sso::USER_PREFERENCES_VAR, e))
    })?;
    let social: SocialProfile = serde_json::from_value(social).map_err(|e| {
        GarminError::auth(format!("Unexpected {} content: {}", sso::SOCIAL_PROFILE_VAR, e))
    })?;

    Ok(PageProfile::Found(UserProfile {
        display_name: preferences.display_name,
        full_name: social.full_name.unwrap_or_default(),
        unit_system: preferences.measurement_system,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const APP_PAGE: &str = r#"<html><script>
        window.VIEWER_USERPREFERENCES = {\"displayName\":\"runner42\",\"measurementSystem\":\"metric\",\"format\":{\"id\":1}};
        window.VIEWER_SOCIAL_PROFILE = {"fullName":"Ada Runner","userProfileId":7};
    </script></html>"#;

    #[test]
    fn test_csrf_token() {
        let html = r#"<input type="hidden" name="_csrf" value="A1B2C3D4" />"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("A1B2C3D4"));
        assert_eq!(extract_csrf_token("<form></form>"), None);
        assert_eq!(extract_csrf_token(r#"name="_csrf" value="""#), None);
    }

    #[test]
    fn test_ticket() {
        let html = r#"var response_url = "https:\/\/connect.garmin.com\/modern\/?ticket=ST-0421-abcDEF-cas";"#;
        assert_eq!(extract_ticket(html).as_deref(), Some("ST-0421-abcDEF-cas"));
        assert_eq!(extract_ticket("Invalid sign in"), None);
    }

    #[test]
    fn test_embedded_json_unescapes_quotes() {
        let preferences = extract_embedded_json(APP_PAGE, "VIEWER_USERPREFERENCES")
            .unwrap()
            .unwrap();

        assert_eq!(preferences["displayName"], "runner42");
        assert_eq!(preferences["format"], json!({"id": 1}));
    }

    #[test]
    fn test_embedded_json_stops_at_first_terminator() {
        let html = r#"A = {"x":1}; B = {"y":2};"#;

        assert_eq!(extract_embedded_json(html, "A").unwrap(), Some(json!({"x": 1})));
        assert_eq!(extract_embedded_json(html, "B").unwrap(), Some(json!({"y": 2})));
    }

    #[test]
    fn test_embedded_json_absent_is_not_an_error() {
        assert_eq!(extract_embedded_json("<html></html>", "VIEWER_USERPREFERENCES").unwrap(), None);
        assert_eq!(extract_embedded_json("VIEWER_USERPREFERENCES = {", "VIEWER_USERPREFERENCES").unwrap(), None);
    }

    #[test]
    fn test_embedded_json_assignment_spacing() {
        assert_eq!(extract_embedded_json(r#"A={"x":1};"#, "A").unwrap(), Some(json!({"x": 1})));
        assert_eq!(
            extract_embedded_json("A \n\t=\n  {\"x\":1};", "A").unwrap(),
            Some(json!({"x": 1}))
        );
        // a mention without an object assignment is skipped
        let html = r#"if (A) { go(); } A = {"x":2};"#;
        assert_eq!(extract_embedded_json(html, "A").unwrap(), Some(json!({"x": 2})));
        assert_eq!(extract_embedded_json(r#"A = [1];"#, "A").unwrap(), None);
        assert_eq!(extract_embedded_json(r#"A = {"x":1};"#, "").unwrap(), None);
    }

    #[test]
    fn test_embedded_json_malformed_is_an_error() {
        let result = extract_embedded_json("A = {not json};", "A");
        assert!(matches!(result, Err(GarminError::Authentication { .. })));
    }

    #[test]
    fn test_profile_found() {
        let profile = extract_profile(APP_PAGE).unwrap();

        assert_eq!(
            profile,
            PageProfile::Found(UserProfile {
                display_name: "runner42".to_string(),
                full_name: "Ada Runner".to_string(),
                unit_system: "metric".to_string(),
            })
        );
    }

    #[test]
    fn test_profile_missing_blocks() {
        assert_eq!(
            extract_profile("<html></html>").unwrap(),
            PageProfile::Missing("VIEWER_USERPREFERENCES")
        );

        let only_preferences = r#"VIEWER_USERPREFERENCES = {"displayName":"a","measurementSystem":"metric"};"#;
        assert_eq!(
            extract_profile(only_preferences).unwrap(),
            PageProfile::Missing("VIEWER_SOCIAL_PROFILE")
        );
    }

    #[test]
    fn test_profile_null_full_name() {
        let html = r#"VIEWER_USERPREFERENCES = {"displayName":"a","measurementSystem":"statute_us"};
            VIEWER_SOCIAL_PROFILE = {"fullName":null};"#;

        match extract_profile(html).unwrap() {
            PageProfile::Found(profile) => {
                assert_eq!(profile.full_name, "");
                assert_eq!(profile.unit_system, "statute_us");
            }
            other => panic!("expected a profile, got {:?}", other),
        }
    }
}
