//! Orchestrator: owns the point sequence and executes runs over it.

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use hookline_core::config::lifecycle::{LifecycleConfig, RunPolicy};

use crate::error::LifecycleError;
use crate::hooks::definitions::{Hook, Point};
use crate::hooks::dispatcher::{HookDispatcher, LifecycleResult};

/// One or more points to append with [`Orchestrator::add_points`].
#[derive(Debug, Clone, Default)]
pub struct PointBatch(Vec<Point>);

impl PointBatch {
    /// Returns the points in append order.
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl From<Point> for PointBatch {
    fn from(point: Point) -> Self {
        Self(vec![point])
    }
}

impl From<Vec<Point>> for PointBatch {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl<const N: usize> From<[Point; N]> for PointBatch {
    fn from(points: [Point; N]) -> Self {
        Self(points.into())
    }
}

impl FromIterator<Point> for PointBatch {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Runs a named, ordered sequence of points.
///
/// The sequence can be extended with [`add_points`](Self::add_points) and
/// edited with [`replace_hook`](Self::replace_hook). Each call to
/// [`run`](Self::run) walks a snapshot of the sequence taken when it starts.
#[derive(Debug)]
pub struct Orchestrator {
    /// Live point sequence.
    points: Vec<Point>,
    /// Coordination policy for concurrent runs.
    policy: RunPolicy,
    /// Held for the duration of a run under [`RunPolicy::Serialized`].
    run_lock: Mutex<()>,
}

impl Orchestrator {
    /// Creates an orchestrator owning `points`.
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        let points: Vec<Point> = points.into_iter().collect();
        for point in &points {
            warn_on_duplicate_hooks(point);
        }
        for (index, point) in points.iter().enumerate() {
            if points[..index].iter().any(|p| p.name() == point.name()) {
                warn!(point = %point.name(), "Duplicate point name in initial sequence");
            }
        }

        Self {
            points,
            policy: RunPolicy::default(),
            run_lock: Mutex::new(()),
        }
    }

    /// Creates an orchestrator configured from `config`.
    pub fn with_config(points: impl IntoIterator<Item = Point>, config: &LifecycleConfig) -> Self {
        Self::new(points).with_policy(config.run_policy)
    }

    /// Sets the run policy.
    pub fn with_policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the run policy.
    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    /// Returns the live point sequence.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the first point named `name`.
    pub fn point(&self, name: &str) -> Option<&Point> {
        self.points.iter().find(|p| p.name() == name)
    }

    /// Returns point names in sequence order.
    pub fn point_names(&self) -> Vec<&str> {
        self.points.iter().map(Point::name).collect()
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends one or more points to the end of the sequence.
    ///
    /// Names are not checked for uniqueness. A duplicate point runs as well,
    /// and its results overwrite the earlier point's entries in the store.
    pub fn add_points(&mut self, points: impl Into<PointBatch>) {
        for point in points.into().into_points() {
            if self.point(point.name()).is_some() {
                warn!(point = %point.name(), "Appending point with a name already in the sequence");
            }
            warn_on_duplicate_hooks(&point);

            debug!(point = %point.name(), hooks = point.len(), "Point appended");
            self.points.push(point);
        }
    }

    /// Replaces `hook_name` in the first point named `point_name`, keeping
    /// its position. The new hook's own name becomes its store key.
    pub fn replace_hook(
        &mut self,
        point_name: &str,
        hook_name: &str,
        hook: Hook,
    ) -> Result<(), LifecycleError> {
        let point = self
            .points
            .iter_mut()
            .find(|p| p.name() == point_name)
            .ok_or_else(|| LifecycleError::NotFound {
                point: point_name.to_string(),
                hook: None,
            })?;

        let index = point
            .position(hook_name)
            .ok_or_else(|| LifecycleError::NotFound {
                point: point_name.to_string(),
                hook: Some(hook_name.to_string()),
            })?;

        let collides = point
            .hooks()
            .iter()
            .enumerate()
            .any(|(i, h)| i != index && h.name() == hook.name());
        if collides {
            return Err(LifecycleError::DuplicateHook {
                point: point_name.to_string(),
                hook: hook.name().to_string(),
            });
        }

        info!(
            point = %point_name,
            replaced = %hook_name,
            hook = %hook.name(),
            position = index,
            "Hook replaced"
        );
        point.hooks_mut()[index] = hook;

        Ok(())
    }

    /// Returns a dispatcher over a copy of the current sequence.
    ///
    /// The dispatcher ignores the run policy; it owns its points and can be
    /// moved into a spawned task.
    pub fn snapshot(&self) -> HookDispatcher {
        HookDispatcher::new(self.points.clone())
    }

    /// Runs every hook of every point in order.
    ///
    /// `options` is forwarded to each hook unchanged (`null` when absent).
    /// Fails fast with [`LifecycleError::HookExecution`] on the first hook
    /// error; no later hook is invoked.
    pub async fn run(&self, options: Option<Value>) -> Result<LifecycleResult, LifecycleError> {
        let dispatcher = self.snapshot();

        let _guard = match self.policy {
            RunPolicy::Serialized => Some(self.run_lock.lock().await),
            RunPolicy::Concurrent => None,
        };

        dispatcher.dispatch(options).await
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn warn_on_duplicate_hooks(point: &Point) {
    for hook in point.duplicate_hook_names() {
        warn!(point = %point.name(), hook = %hook, "Duplicate hook name within point");
    }
}
