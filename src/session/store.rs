//! Session persistence gateway — a single named slot with age-based expiry.
//!
//! The slot holds `{formData, step, timestamp}` and is overwritten
//! unconditionally on every save (last-write-wins). Expiry is evaluated on
//! read: a snapshot older than the TTL is deleted and reported as absent.
//!
//! An unavailable or corrupt slot fails with [`StorageError`]; callers catch
//! it and degrade to "no saved session" rather than crash the wizard.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::form::model::LoanFormData;
use crate::form::state::WizardStep;

/// Default slot file name, the storage key of the session.
pub const SESSION_FILE_NAME: &str = "ume_loans_session.json";

/// Age after which a saved session is treated as absent.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Durable snapshot of wizard progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    pub form_data: LoanFormData,
    pub step: WizardStep,
    /// Save time, stored as epoch millis for format stability.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl SavedSession {
    /// Whether this snapshot is older than `ttl` as of `now`.
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.timestamp);
        age.num_milliseconds() > ttl.as_millis() as i64
    }
}

/// Gateway to the durable session slot.
pub trait SessionStore: Send + Sync {
    /// Snapshot `{formData, step, timestamp: now}`, overwriting any prior
    /// snapshot unconditionally.
    fn save_progress(&self, form_data: &LoanFormData, step: WizardStep)
    -> Result<(), StorageError>;

    /// Read the snapshot. Absent → `None`; expired → slot deleted and `None`;
    /// corrupt or unreadable → `StorageError`.
    fn get_progress(&self) -> Result<Option<SavedSession>, StorageError>;

    /// Delete the snapshot unconditionally.
    fn clear_progress(&self) -> Result<(), StorageError>;
}

/// File-backed session store: one JSON file as the slot.
pub struct FileSessionStore {
    path: PathBuf,
    ttl: Duration,
}

impl FileSessionStore {
    /// Store backed by the given file with the standard 24h expiry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, SESSION_TTL)
    }

    /// Store with a custom expiry window.
    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save_progress(
        &self,
        form_data: &LoanFormData,
        step: WizardStep,
    ) -> Result<(), StorageError> {
        let session = SavedSession {
            form_data: form_data.clone(),
            step,
            timestamp: Utc::now(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a torn write never corrupts the slot.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&session)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(step = %step, "Session snapshot saved");
        Ok(())
    }

    fn get_progress(&self) -> Result<Option<SavedSession>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: SavedSession = serde_json::from_str(&raw)?;

        if session.is_expired(Utc::now(), self.ttl) {
            info!("Saved session expired, discarding");
            self.clear_progress()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    fn clear_progress(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session store for tests and no-persistence runs.
pub struct MemorySessionStore {
    slot: Mutex<Option<SavedSession>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ttl: SESSION_TTL,
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// Seed the slot directly (test helper for expiry scenarios).
    pub fn put(&self, session: SavedSession) {
        *self.slot.lock().expect("session slot mutex poisoned") = Some(session);
    }
}

impl SessionStore for MemorySessionStore {
    fn save_progress(
        &self,
        form_data: &LoanFormData,
        step: WizardStep,
    ) -> Result<(), StorageError> {
        self.put(SavedSession {
            form_data: form_data.clone(),
            step,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn get_progress(&self) -> Result<Option<SavedSession>, StorageError> {
        let mut slot = self.slot.lock().expect("session slot mutex poisoned");
        match &*slot {
            Some(session) if session.is_expired(Utc::now(), self.ttl) => {
                *slot = None;
                Ok(None)
            }
            other => Ok(other.clone()),
        }
    }

    fn clear_progress(&self) -> Result<(), StorageError> {
        *self.slot.lock().expect("session slot mutex poisoned") = None;
        Ok(())
    }
}
