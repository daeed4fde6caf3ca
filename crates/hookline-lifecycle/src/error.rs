//! Lifecycle error types.

use std::fmt;

use thiserror::Error;

use hookline_core::error::{AppError, ErrorKind};

/// Boxed cause returned by a failing hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the orchestrator.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A hook returned an error or panicked; the run was aborted.
    #[error("hook '{hook}' in point '{point}' failed: {source}")]
    HookExecution {
        /// Point owning the failing hook.
        point: String,
        /// Name of the failing hook.
        hook: String,
        /// The hook's own error.
        #[source]
        source: HookError,
    },

    /// `replace_hook` referenced a point, or a hook within it, that does not exist.
    #[error("{}", not_found_message(.point, .hook.as_deref()))]
    NotFound {
        /// Point that was looked up.
        point: String,
        /// Hook that was looked up, when the point itself exists.
        hook: Option<String>,
    },

    /// A replacement hook's name collides with another hook in the same point.
    #[error("point '{point}' already has a hook named '{hook}'")]
    DuplicateHook {
        /// Point holding the collision.
        point: String,
        /// The colliding hook name.
        hook: String,
    },
}

fn not_found_message(point: &str, hook: Option<&str>) -> String {
    match hook {
        Some(hook) => format!("hook '{hook}' not found in point '{point}'"),
        None => format!("point '{point}' not found"),
    }
}

impl LifecycleError {
    /// Returns the point name this error refers to.
    pub fn point(&self) -> &str {
        match self {
            Self::HookExecution { point, .. }
            | Self::NotFound { point, .. }
            | Self::DuplicateHook { point, .. } => point,
        }
    }

    /// Returns the hook name this error refers to, if any.
    pub fn hook(&self) -> Option<&str> {
        match self {
            Self::HookExecution { hook, .. } | Self::DuplicateHook { hook, .. } => Some(hook),
            Self::NotFound { hook, .. } => hook.as_deref(),
        }
    }

    /// Returns the workspace error category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HookExecution { .. } => ErrorKind::HookExecution,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateHook { .. } => ErrorKind::Conflict,
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        AppError::with_source(kind, message, err)
    }
}

/// Cause recorded when a hook panics instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPanic {
    /// The panic payload, when it was a string.
    pub message: String,
}

impl HookPanic {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

impl fmt::Display for HookPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook panicked: {}", self.message)
    }
}

impl std::error::Error for HookPanic {}
