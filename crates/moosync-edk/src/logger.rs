//! Per-actor logger for extension code.

use std::fmt::Display;

use crate::api::Api;

/// Preference that turns on debug output.
pub const DEBUGGING_PREFERENCE: &str = "DEBUGGING";

/// Prefixes every message with `[actor]`. Debug output is written only
/// while the `DEBUGGING` preference is true.
#[derive(Debug, Clone)]
pub struct ExtensionLogger {
    actor: String,
    api: Api,
}

impl ExtensionLogger {
    pub fn new(actor: impl Into<String>, api: Api) -> Self {
        Self {
            actor: actor.into(),
            api,
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Any failure reading the preference counts as off.
    pub fn debugging(&self) -> bool {
        self.api
            .get_preference_value::<bool>(DEBUGGING_PREFERENCE, None)
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!("[{}] {}", self.actor, message);
    }

    pub fn debug(&self, message: impl Display) {
        if self.debugging() {
            tracing::debug!("[{}] {}", self.actor, message);
        }
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!("[{}] {}", self.actor, message);
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!("[{}] {}", self.actor, message);
    }
}
