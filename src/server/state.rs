//! Application state management

use chrono::{DateTime, Utc};

use crate::inference::Predictor;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// Read-only after construction; the predictor carries its own atomic
/// request counter.
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: Predictor,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, predictor: Predictor) -> Self {
        Self {
            config,
            predictor,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}
