// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the Garmin Connect client

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::constants::{defaults, env_config, hosts, sso};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Which Garmin Connect deployment to use
    #[serde(default)]
    pub domain: ServiceDomain,
    /// Send every request to this base instead of the real hosts
    #[serde(default)]
    pub base_url: Option<String>,
    /// Saved session location, defaults to the user config directory
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceDomain {
    #[default]
    Global,
    China,
}

impl ServiceDomain {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "global" | "com" => Ok(ServiceDomain::Global),
            "china" | "cn" => Ok(ServiceDomain::China),
            _ => Err(anyhow::anyhow!(
                "Unknown Garmin domain: {}. Supported: global, china",
                value
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    #[serde(default = "default_true")]
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
            verify_tls: true,
            follow_redirects: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    defaults::HTTP_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

/// Resolved base URLs for one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrls {
    /// Connect root, e.g. `https://connect.garmin.com`
    pub connect: String,
    /// SSO base, e.g. `https://sso.garmin.com/sso`
    pub sso: String,
    /// Application base, e.g. `https://connect.garmin.com/modern`
    pub modern: String,
    /// Stylesheet the SSO widget is asked to load
    pub css: String,
}

impl ServiceUrls {
    pub fn for_domain(domain: ServiceDomain) -> Self {
        match domain {
            ServiceDomain::Global => Self {
                connect: hosts::GLOBAL_CONNECT.to_string(),
                sso: hosts::GLOBAL_SSO.to_string(),
                modern: hosts::GLOBAL_MODERN.to_string(),
                css: hosts::GLOBAL_CSS.to_string(),
            },
            ServiceDomain::China => Self {
                connect: hosts::CHINA_CONNECT.to_string(),
                sso: hosts::CHINA_SSO.to_string(),
                modern: hosts::CHINA_MODERN.to_string(),
                css: hosts::CHINA_CSS.to_string(),
            },
        }
    }

    /// Serve SSO under `{base}/sso` and the application under `{base}/modern`
    pub fn with_base(base: &str) -> Result<Self> {
        let parsed = Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
        let root = parsed.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            sso: format!("{}/sso", root),
            modern: format!("{}/modern", root),
            css: format!("{}/gauth-custom.css", root),
            connect: root,
        })
    }

    /// Connect login page, sent as `Referer` to the SSO widget
    pub fn login_page(&self) -> String {
        format!("{}{}", self.connect, sso::LOGIN_PAGE)
    }
}

impl Config {
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| {
            default_config_dir()
                .join(defaults::CONFIG_FILE_NAME)
                .to_string_lossy()
                .to_string()
        });

        if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            dotenv::dotenv().ok();
            Self::from_env()
        }
    }

    /// Build a configuration from `GARMIN_*` environment variables
    pub fn from_env() -> Result<Self> {
        let domain = match env_config::domain() {
            Some(value) => ServiceDomain::parse(&value)?,
            None => ServiceDomain::default(),
        };

        Ok(Config {
            domain,
            base_url: env_config::base_url(),
            session_file: env_config::session_file().map(PathBuf::from),
            http: HttpConfig {
                timeout_secs: env_config::http_timeout_secs(),
                verify_tls: env_config::verify_tls(),
                follow_redirects: env_config::follow_redirects(),
            },
        })
    }

    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(|| {
            default_config_dir()
                .join(defaults::CONFIG_FILE_NAME)
                .to_string_lossy()
                .to_string()
        });

        let parent = Path::new(&config_path).parent().context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn service_urls(&self) -> Result<ServiceUrls> {
        match &self.base_url {
            Some(base) => ServiceUrls::with_base(base),
            None => Ok(ServiceUrls::for_domain(self.domain)),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| default_config_dir().join(defaults::SESSION_FILE_NAME))
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join(defaults::CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}
