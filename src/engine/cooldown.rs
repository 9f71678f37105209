//! Minimum interval between two published predictions.
//!
//! The last prediction time is a float of seconds since the Unix epoch, `0` meaning
//! "never", persisted as plain text so that a restart keeps honoring the interval.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const DEFAULT_COOLDOWN_SECS: u64 = 30;
pub const MIN_COOLDOWN_SECS: u64 = 30;
pub const MAX_COOLDOWN_SECS: u64 = 600;

/// Wall clock in seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Single-value file holding the last prediction time.
#[derive(Debug, Clone)]
pub struct TimestampFile {
    path: Option<PathBuf>,
}

impl TimestampFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Keeps the timestamp in memory only.
    pub fn none() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Missing, unreadable or implausible values (non-finite, negative, in the future)
    /// read as "never predicted".
    pub fn load(&self) -> f64 {
        let Some(path) = &self.path else {
            return 0.0;
        };
        match read_timestamp(path) {
            Ok(Some(ts)) if !ts.is_finite() || ts < 0.0 || ts > unix_now() => {
                warn!(path = %path.display(), value = ts, "implausible last prediction time, ignoring it");
                0.0
            }
            Ok(Some(ts)) => {
                info!(path = %path.display(), elapsed = unix_now() - ts, "loaded last prediction time");
                ts
            }
            Ok(None) => 0.0,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot load last prediction time");
                0.0
            }
        }
    }

    /// Best effort; failures are logged and otherwise ignored.
    pub fn save(&self, timestamp: f64) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_timestamp(path, timestamp) {
            warn!(path = %path.display(), error = %e, "cannot save last prediction time");
        }
    }
}

fn read_timestamp(path: &Path) -> Result<Option<f64>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| Error::Config {
            message: format!("invalid timestamp {:?}: {}", raw.trim(), e),
        })
}

fn write_timestamp(path: &Path, timestamp: f64) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, timestamp.to_string())?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[derive(Debug)]
pub struct CooldownGate {
    cooldown_secs: u64,
    last_prediction_time: f64,
    file: TimestampFile,
}

impl CooldownGate {
    /// Loads the persisted timestamp from `file`.
    pub fn new(cooldown_secs: u64, file: TimestampFile) -> Self {
        let last_prediction_time = file.load();
        Self {
            cooldown_secs: clamp_cooldown(cooldown_secs),
            last_prediction_time,
            file,
        }
    }

    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    pub fn last_prediction_time(&self) -> f64 {
        self.last_prediction_time
    }

    /// Rejects values outside `MIN_COOLDOWN_SECS..=MAX_COOLDOWN_SECS`.
    pub fn set_cooldown_secs(&mut self, secs: u64) -> Result<u64> {
        if !(MIN_COOLDOWN_SECS..=MAX_COOLDOWN_SECS).contains(&secs) {
            return Err(Error::Config {
                message: format!(
                    "cooldown must be between {} and {} seconds",
                    MIN_COOLDOWN_SECS, MAX_COOLDOWN_SECS
                ),
            });
        }
        let old = self.cooldown_secs;
        self.cooldown_secs = secs;
        info!(old, new = secs, "cooldown updated");
        Ok(old)
    }

    pub fn allow(&self, now: f64) -> bool {
        if self.last_prediction_time == 0.0 {
            debug!("no previous prediction, cooldown open");
            return true;
        }
        let elapsed = now - self.last_prediction_time;
        let open = elapsed >= self.cooldown_secs as f64;
        debug!(elapsed, cooldown = self.cooldown_secs, open, "cooldown check");
        open
    }

    /// Seconds left before `allow` turns true again.
    pub fn remaining(&self, now: f64) -> f64 {
        if self.last_prediction_time == 0.0 {
            return 0.0;
        }
        (self.cooldown_secs as f64 - (now - self.last_prediction_time)).max(0.0)
    }

    /// Stamp a prediction at `now` and write it through.
    pub fn record(&mut self, now: f64) {
        self.last_prediction_time = now;
        self.file.save(now);
    }

    pub fn reset(&mut self) {
        self.last_prediction_time = 0.0;
        self.file.save(0.0);
    }
}

pub fn clamp_cooldown(secs: u64) -> u64 {
    secs.clamp(MIN_COOLDOWN_SECS, MAX_COOLDOWN_SECS)
}
