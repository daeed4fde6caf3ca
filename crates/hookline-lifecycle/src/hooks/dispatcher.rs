//! Hook dispatcher: walks a snapshot of points and records each hook's result.
//!
//! - Points run in sequence order, hooks in declaration order.
//! - Each hook is awaited before the next one starts; no two hooks ever run
//!   concurrently, even across points.
//! - Every hook sees the store built so far in the current run.
//! - The first hook error or panic aborts the walk.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::definitions::{Hook, Point};
use super::store::Store;
use crate::error::{HookError, HookPanic, LifecycleError};

/// Value produced by a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleResult {
    run_id: Uuid,
    options: Value,
    store: Store,
    points_executed: usize,
    hooks_executed: usize,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl LifecycleResult {
    /// Returns the identifier of the run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the options forwarded to every hook.
    pub fn options(&self) -> &Value {
        &self.options
    }

    /// Returns the completed store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Consumes the result, returning the store.
    pub fn into_store(self) -> Store {
        self.store
    }

    /// Returns how many point entries were walked.
    pub fn points_executed(&self) -> usize {
        self.points_executed
    }

    /// Returns how many hooks were executed.
    pub fn hooks_executed(&self) -> usize {
        self.hooks_executed
    }

    /// Returns when the run started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the run finished.
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

/// Executes a fixed sequence of points.
///
/// Owns its points, so a dispatcher obtained from
/// [`Orchestrator::snapshot`](crate::Orchestrator::snapshot) is unaffected by
/// later mutations of the orchestrator and can be moved into a spawned task.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    points: Vec<Point>,
}

impl HookDispatcher {
    /// Creates a dispatcher over `points`.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Returns the points this dispatcher walks.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Runs every hook in order and returns the aggregated result.
    pub async fn dispatch(&self, options: Option<Value>) -> Result<LifecycleResult, LifecycleError> {
        let options = options.unwrap_or(Value::Null);
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let started = Instant::now();

        info!(
            run_id = %run_id,
            points = self.points.len(),
            "Lifecycle run started"
        );

        let mut store = Store::new();
        let mut hooks_executed = 0;

        for point in &self.points {
            debug!(run_id = %run_id, point = %point.name(), hooks = point.len(), "Entering point");
            store.enter_point(point.name());

            for hook in point.hooks() {
                debug!(run_id = %run_id, point = %point.name(), hook = %hook.name(), "Hook pending");

                let value = match execute_hook(hook, &options, point.name(), &store).await {
                    Ok(value) => value,
                    Err(cause) => {
                        error!(
                            run_id = %run_id,
                            point = %point.name(),
                            hook = %hook.name(),
                            error = %cause,
                            "Hook rejected, aborting run"
                        );
                        return Err(LifecycleError::HookExecution {
                            point: point.name().to_string(),
                            hook: hook.name().to_string(),
                            source: cause,
                        });
                    }
                };

                debug!(run_id = %run_id, point = %point.name(), hook = %hook.name(), "Hook resolved");
                store.record(point.name(), hook.name(), value);
                hooks_executed += 1;
            }
        }

        info!(
            run_id = %run_id,
            points = self.points.len(),
            hooks = hooks_executed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Lifecycle run completed"
        );

        Ok(LifecycleResult {
            run_id,
            options,
            store,
            points_executed: self.points.len(),
            hooks_executed,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Awaits a single hook, turning a panic into an error.
async fn execute_hook(
    hook: &Hook,
    options: &Value,
    point: &str,
    store: &Store,
) -> Result<Value, HookError> {
    let exec = hook.exec();
    // Calling inside the block also catches panics raised before the first poll.
    let fut = AssertUnwindSafe(async { exec.execute(options, point, store).await });

    match fut.catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HookPanic::from_payload(payload).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_dispatch_yields_empty_store() {
        let result = HookDispatcher::new(Vec::new()).dispatch(None).await.unwrap();
        assert!(result.store().is_empty());
        assert_eq!(result.options(), &Value::Null);
        assert_eq!(result.points_executed(), 0);
        assert_eq!(result.hooks_executed(), 0);
        assert!(result.finished_at() >= result.started_at());
    }

    #[tokio::test]
    async fn test_point_without_hooks_records_empty_entry() {
        let dispatcher = HookDispatcher::new(vec![
            Point::new("empty"),
            Point::new("full").with_hook(Hook::value("h", true)),
        ]);

        let result = dispatcher.dispatch(Some(json!({"a": 1}))).await.unwrap();
        assert_eq!(
            serde_json::to_string(result.store()).unwrap(),
            r#"{"empty":{},"full":{"h":true}}"#
        );
        assert_eq!(result.store().get("full", "h"), Some(&json!(true)));
        assert_eq!(result.points_executed(), 2);
        assert_eq!(result.hooks_executed(), 1);
        assert_eq!(result.options(), &json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_panicking_hook_becomes_execution_error() {
        let dispatcher = HookDispatcher::new(vec![Point::new("build").with_hook(Hook::from_fn(
            "explode",
            |_, _, _| panic!("kaboom"),
        ))]);

        let err = dispatcher.dispatch(None).await.unwrap_err();
        match err {
            LifecycleError::HookExecution {
                point,
                hook,
                source,
            } => {
                assert_eq!(point, "build");
                assert_eq!(hook, "explode");
                let panic = source.downcast_ref::<HookPanic>().unwrap();
                assert_eq!(panic.message, "kaboom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_ids_differ_between_runs() {
        let dispatcher = HookDispatcher::new(vec![Point::new("p").with_hook(Hook::value("h", 1))]);
        let first = dispatcher.dispatch(None).await.unwrap();
        let second = dispatcher.dispatch(None).await.unwrap();
        assert_ne!(first.run_id(), second.run_id());
        assert_eq!(first.store(), second.store());
    }
}
