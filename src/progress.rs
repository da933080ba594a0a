//! Structured progress events pushed to an optional observer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::Summary;

/// Periodic progress events fire once per this many units.
pub const PROGRESS_INTERVAL: u64 = 1000;

pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProgressEvent {
    Log { level: LogLevel, message: String },
    Parsing { count: u64, done: bool },
    ParsingStorefront { count: u64, done: bool },
    WebdavScan { count: u64 },
    Summary { summary: Summary },
}

/// Cloneable handle around an optional [`ProgressCallback`].
///
/// The sink is push-only; emitting never blocks on the observer.
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<ProgressCallback>,
}

impl Progress {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            callback(&event);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.emit(ProgressEvent::Log {
            level: LogLevel::Info,
            message,
        });
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.emit(ProgressEvent::Log {
            level: LogLevel::Warning,
            message,
        });
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("attached", &self.callback.is_some())
            .finish()
    }
}

/// Returns true when `count` lands on a periodic progress boundary.
pub fn is_progress_tick(count: u64) -> bool {
    count > 0 && count % PROGRESS_INTERVAL == 0
}
