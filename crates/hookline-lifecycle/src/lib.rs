//! # hookline-lifecycle
//!
//! Lifecycle hook orchestrator. Provides:
//!
//! - Named points holding ordered hooks
//! - A per-run [`Store`] accumulating point → hook → result
//! - Strictly sequential async runs with fail-fast error propagation
//! - Runtime extension (`add_points`) and in-place hook replacement
//!   (`replace_hook`)

pub mod error;
pub mod hooks;
pub mod orchestrator;

pub use error::{HookError, HookPanic, LifecycleError};
pub use hooks::definitions::{Hook, HookExec, Point};
pub use hooks::dispatcher::{HookDispatcher, LifecycleResult};
pub use hooks::store::Store;
pub use orchestrator::{Orchestrator, PointBatch};

pub use hookline_core::config::lifecycle::{LifecycleConfig, RunPolicy};
