//! Hook system: hook and point definitions, the per-run store, and the
//! sequential dispatcher.

pub mod definitions;
pub mod dispatcher;
pub mod store;

pub use definitions::{Hook, HookExec, Point};
pub use dispatcher::{HookDispatcher, LifecycleResult};
pub use store::Store;
