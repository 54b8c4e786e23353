// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Saved sessions on disk
//!
//! The file holds cookies that grant account access; it is written with
//! owner-only permissions on Unix.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::Result;
use crate::models::SessionData;

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session, `None` when there is none yet
    pub fn load(&self) -> Result<Option<SessionData>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No saved session");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let session: SessionData = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            display_name = %session.display_name,
            "Loaded saved session"
        );
        Ok(Some(session))
    }

    pub fn save(&self, session: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        restrict_permissions(&self.path)?;

        info!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Forget the saved session; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
