//! Hook and point definitions.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use super::store::Store;
use crate::error::HookError;

/// The executable unit behind a hook.
///
/// Receives the run options, the name of the point being executed, and the
/// store built so far in the current run. The returned value is recorded in
/// the store under the hook's name once the future resolves.
#[async_trait]
pub trait HookExec: Send + Sync + fmt::Debug {
    /// Executes the hook.
    async fn execute(
        &self,
        options: &Value,
        point: &str,
        store: &Store,
    ) -> Result<Value, HookError>;
}

/// Signature of a synchronous hook closure.
type SyncFn = dyn Fn(&Value, &str, &Store) -> Result<Value, HookError> + Send + Sync;

/// Signature of an asynchronous hook closure.
type AsyncFn = dyn for<'a> Fn(&'a Value, &'a str, &'a Store) -> BoxFuture<'a, Result<Value, HookError>>
    + Send
    + Sync;

/// Hook backed by a closure that returns its value immediately.
pub struct FnExec {
    f: Arc<SyncFn>,
}

impl fmt::Debug for FnExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExec").field("f", &"<closure>").finish()
    }
}

#[async_trait]
impl HookExec for FnExec {
    async fn execute(
        &self,
        options: &Value,
        point: &str,
        store: &Store,
    ) -> Result<Value, HookError> {
        (self.f)(options, point, store)
    }
}

/// Hook backed by a closure that returns a boxed future.
pub struct AsyncFnExec {
    f: Arc<AsyncFn>,
}

impl fmt::Debug for AsyncFnExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnExec").field("f", &"<closure>").finish()
    }
}

#[async_trait]
impl HookExec for AsyncFnExec {
    async fn execute(
        &self,
        options: &Value,
        point: &str,
        store: &Store,
    ) -> Result<Value, HookError> {
        (self.f)(options, point, store).await
    }
}

/// Hook that always yields the same value.
#[derive(Debug, Clone)]
pub struct ValueExec(pub Value);

#[async_trait]
impl HookExec for ValueExec {
    async fn execute(
        &self,
        _options: &Value,
        _point: &str,
        _store: &Store,
    ) -> Result<Value, HookError> {
        Ok(self.0.clone())
    }
}

/// A named unit of work attached to a point.
///
/// Cloning a hook is cheap: the executable unit is shared.
#[derive(Clone)]
pub struct Hook {
    name: String,
    exec: Arc<dyn HookExec>,
}

impl Hook {
    /// Creates a hook from any [`HookExec`] implementation.
    pub fn new(name: impl Into<String>, exec: impl HookExec + 'static) -> Self {
        Self {
            name: name.into(),
            exec: Arc::new(exec),
        }
    }

    /// Creates a hook sharing an existing executable unit.
    pub fn from_arc(name: impl Into<String>, exec: Arc<dyn HookExec>) -> Self {
        Self {
            name: name.into(),
            exec,
        }
    }

    /// Creates a hook from a synchronous closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &str, &Store) -> Result<Value, HookError> + Send + Sync + 'static,
    {
        Self::new(name, FnExec { f: Arc::new(f) })
    }

    /// Creates a hook from a closure returning a boxed future.
    ///
    /// ```rust,ignore
    /// let hook = Hook::from_async("fetch", |options, _point, _store| {
    ///     Box::pin(async move { Ok(options["url"].clone()) })
    /// });
    /// ```
    pub fn from_async<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a Value, &'a str, &'a Store) -> BoxFuture<'a, Result<Value, HookError>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, AsyncFnExec { f: Arc::new(f) })
    }

    /// Creates a hook that always yields `value`.
    pub fn value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, ValueExec(value.into()))
    }

    /// Returns the hook name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the executable unit.
    pub fn exec(&self) -> &Arc<dyn HookExec> {
        &self.exec
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("exec", &self.exec)
            .finish()
    }
}

/// A named, ordered stage of the lifecycle.
///
/// Hook order is execution order. Hook names are expected to be unique
/// within a point; see [`Point::duplicate_hook_names`].
#[derive(Debug, Clone)]
pub struct Point {
    name: String,
    hooks: Vec<Hook>,
}

impl Point {
    /// Creates an empty point.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: Vec::new(),
        }
    }

    /// Appends a hook.
    pub fn with_hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Appends several hooks, preserving their order.
    pub fn with_hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Returns the point name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hooks in execution order.
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Returns the first hook named `name`.
    pub fn hook(&self, name: &str) -> Option<&Hook> {
        self.hooks.iter().find(|h| h.name == name)
    }

    /// Returns the position of the first hook named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.hooks.iter().position(|h| h.name == name)
    }

    /// Returns the number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns whether the point has no hooks.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns hook names that appear more than once, in first-seen order.
    pub fn duplicate_hook_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for hook in &self.hooks {
            if !seen.insert(hook.name.as_str()) && !duplicates.contains(&hook.name.as_str()) {
                duplicates.push(hook.name.as_str());
            }
        }
        duplicates
    }

    pub(crate) fn hooks_mut(&mut self) -> &mut Vec<Hook> {
        &mut self.hooks
    }
}
