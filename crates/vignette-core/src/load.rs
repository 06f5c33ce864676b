//! Model load tracking
//!
//! The engine's asset loader reports progress, success or failure; this
//! tracker turns those into the status shown in place of the scene.

use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Failed to load model {path}: {reason}")]
    AssetFailed { path: String, reason: String },
    #[error("Timed out loading model {path} after {secs}s")]
    TimedOut { path: String, secs: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading { percent: u8 },
    Ready,
    Failed(LoadError),
}

/// Tracks the single pending model load
#[derive(Debug, Clone)]
pub struct LoadTracker {
    path: String,
    timeout: Duration,
    status: LoadStatus,
}

impl LoadTracker {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            status: LoadStatus::Loading { percent: 0 },
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, LoadStatus::Loading { .. })
    }

    /// Record progress; a zero total keeps the previous percentage
    pub fn progress(&mut self, loaded: u64, total: u64) {
        let LoadStatus::Loading { percent } = &mut self.status else {
            return;
        };
        if total == 0 {
            return;
        }
        let ratio = loaded.min(total) as f64 / total as f64;
        *percent = (ratio * 100.0).round() as u8;
    }

    pub fn succeed(&mut self) {
        if self.is_loading() {
            info!(path = %self.path, "Model loaded");
            self.status = LoadStatus::Ready;
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.is_loading() {
            let err = LoadError::AssetFailed {
                path: self.path.clone(),
                reason: reason.into(),
            };
            error!("{}", err);
            self.status = LoadStatus::Failed(err);
        }
    }

    /// Fail the load once it has been pending longer than the timeout.
    /// Returns true if this call caused the failure.
    pub fn check_timeout(&mut self, elapsed: Duration) -> bool {
        if !self.is_loading() || elapsed <= self.timeout {
            return false;
        }
        let err = LoadError::TimedOut {
            path: self.path.clone(),
            secs: self.timeout.as_secs(),
        };
        error!("{}", err);
        self.status = LoadStatus::Failed(err);
        true
    }

    /// Text for the loading indicator, `None` once the model is shown
    pub fn status_text(&self) -> Option<String> {
        match &self.status {
            LoadStatus::Loading { percent } => Some(format!("Loading {}%", percent)),
            LoadStatus::Ready => None,
            LoadStatus::Failed(_) => Some("Error loading model".to_string()),
        }
    }
}
