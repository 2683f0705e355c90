use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ensure_cache_dir;
use crate::error::{CounselError, CounselResult};
use crate::intake::CaseForm;

const HANDOFF_FILE: &str = "handoff.json";

/// What intake hands to the analysis session: the created case and the form
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHandoff {
    pub case_id: String,
    pub form: CaseForm,
    pub created_at: DateTime<Utc>,
}

impl SessionHandoff {
    pub fn new(case_id: impl Into<String>, form: CaseForm) -> Self {
        Self {
            case_id: case_id.into(),
            form,
            created_at: Utc::now(),
        }
    }

    pub fn title(&self) -> &str {
        &self.form.case_title
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.created_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age > ttl,
            Err(_) => false,
        }
    }

    pub fn default_path() -> CounselResult<PathBuf> {
        Ok(ensure_cache_dir()?.join(HANDOFF_FILE))
    }

    /// Persists the snapshot to the cache directory.
    pub fn save(&self) -> CounselResult<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> CounselResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(case_id = %self.case_id, path = %path.display(), "Saved session handoff");
        Ok(())
    }

    pub fn load(ttl: Duration) -> CounselResult<Option<Self>> {
        Self::load_from(&Self::default_path()?, ttl)
    }

    /// Reads a snapshot, treating a missing, unreadable or stale file as absent.
    pub fn load_from(path: &Path, ttl: Duration) -> CounselResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let handoff: SessionHandoff = match serde_json::from_str(&raw) {
            Ok(h) => h,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring unreadable handoff");
                return Ok(None);
            }
        };
        if handoff.is_expired(ttl) {
            debug!(case_id = %handoff.case_id, "Ignoring expired handoff");
            return Ok(None);
        }
        Ok(Some(handoff))
    }

    pub fn clear_at(path: &Path) -> CounselResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CounselError::from(e)),
        }
    }
}
