//! Persisted calibration
//!
//! Loading never fails: anything missing, unreadable or of the wrong
//! size falls back to the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;

use super::{default_calibration, Calibration, CalibrationTriple};
use crate::NUM_VOICES;

/// Failure to persist calibration
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("calibration I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("calibration encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for the calibration table
///
/// Both calls may block, so neither belongs on the audio thread.
pub trait CalibrationStore: Send {
    /// Persisted calibration, or the defaults
    fn load(&self) -> Calibration;

    /// Persist `calibration`, replacing whatever was stored
    fn save(&mut self, calibration: &Calibration) -> Result<(), StoreError>;

    /// The stored calibration if it changed since the last call
    ///
    /// The first call reports whatever is stored. A store that has
    /// vanished reports nothing.
    fn reload_if_changed(&mut self) -> Option<Calibration>;
}

/// Calibration kept as a JSON array of `{idle, touch, barefoot}` objects
pub struct JsonCalibrationStore {
    path: PathBuf,
    seen_modified: Option<SystemTime>,
}

impl JsonCalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<CalibrationTriple>, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl CalibrationStore for JsonCalibrationStore {
    fn load(&self) -> Calibration {
        match self.read() {
            Ok(triples) => match Calibration::try_from(triples) {
                Ok(calibration) => calibration,
                Err(triples) => {
                    debug!(
                        "{:?} holds {} entries, expected {}; using defaults",
                        self.path,
                        triples.len(),
                        NUM_VOICES
                    );
                    default_calibration()
                }
            },
            Err(e) => {
                debug!("no usable calibration at {:?} ({}); using defaults", self.path, e);
                default_calibration()
            }
        }
    }

    fn save(&mut self, calibration: &Calibration) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&calibration[..])?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn reload_if_changed(&mut self) -> Option<Calibration> {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok()?;
        if self.seen_modified == Some(modified) {
            return None;
        }
        self.seen_modified = Some(modified);
        Some(self.load())
    }
}
