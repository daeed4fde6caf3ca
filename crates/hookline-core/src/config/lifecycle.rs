//! Lifecycle orchestrator configuration.

use serde::{Deserialize, Serialize};

/// How concurrent `run` calls on a single orchestrator are coordinated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// Every run proceeds independently; shared external state is the caller's problem.
    #[default]
    Concurrent,
    /// Runs on the same instance are queued behind an async mutex.
    Serialized,
}

impl RunPolicy {
    /// Returns the string name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concurrent => "concurrent",
            Self::Serialized => "serialized",
        }
    }
}

impl std::fmt::Display for RunPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Coordination policy for concurrent runs.
    #[serde(default)]
    pub run_policy: RunPolicy,
}
