use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// On-disk cache of the bearer token.
///
/// The file holds the raw token and nothing else. Failures here never stop a
/// command: an unreadable cache behaves like an empty one, and a failed save
/// only costs a token fetch on the next run.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token, if there is one
    pub fn load(&self) -> Option<String> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No cached credential");
            return None;
        }

        match std::fs::read_to_string(&self.path) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read cached credential");
                None
            }
        }
    }

    /// Persist a token, replacing whatever was cached before
    pub fn save(&self, token: &str) {
        if let Err(e) = self.try_save(token) {
            warn!(path = %self.path.display(), error = %e, "Failed to cache credential");
        }
    }

    fn try_save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        std::fs::write(&self.path, token).context("Failed to write credential file")?;
        debug!(path = %self.path.display(), "Cached credential");
        Ok(())
    }
}
