//! Per-run result store: point name → hook name → resolved value.
//!
//! Backed by [`IndexMap`] so iteration follows insertion order, which is the
//! execution order of points and of hooks within each point.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Results recorded for a single point, keyed by hook name.
pub type PointResults = IndexMap<String, Value>;

/// Accumulated hook results for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    points: IndexMap<String, PointResults>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value recorded for `hook` in `point`.
    pub fn get(&self, point: &str, hook: &str) -> Option<&Value> {
        self.points.get(point).and_then(|hooks| hooks.get(hook))
    }

    /// Returns all results recorded for `point`.
    pub fn point(&self, point: &str) -> Option<&PointResults> {
        self.points.get(point)
    }

    /// Returns whether `point` was entered during the run.
    pub fn contains_point(&self, point: &str) -> bool {
        self.points.contains_key(point)
    }

    /// Returns point names in execution order.
    pub fn point_names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    /// Iterates over points and their results in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PointResults)> {
        self.points.iter().map(|(name, hooks)| (name.as_str(), hooks))
    }

    /// Returns the number of distinct points entered.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the total number of recorded hook results.
    pub fn hook_count(&self) -> usize {
        self.points.values().map(IndexMap::len).sum()
    }

    /// Converts the store into a JSON object.
    ///
    /// Key order in the result follows `serde_json`'s map, not execution
    /// order; serialize the store itself when order matters.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.points
                .iter()
                .map(|(point, hooks)| {
                    let hooks = hooks
                        .iter()
                        .map(|(hook, value)| (hook.clone(), value.clone()))
                        .collect();
                    (point.clone(), Value::Object(hooks))
                })
                .collect(),
        )
    }

    /// Consumes the store, returning the underlying map.
    pub fn into_inner(self) -> IndexMap<String, PointResults> {
        self.points
    }

    /// Ensures `point` has an entry, even if it never records a hook. A point
    /// entered twice keeps its first position.
    pub(crate) fn enter_point(&mut self, point: &str) {
        self.points.entry(point.to_string()).or_default();
    }

    /// Records a hook result. An existing point key keeps its position; an
    /// existing hook key is overwritten in place.
    pub(crate) fn record(&mut self, point: &str, hook: &str, value: Value) {
        self.points
            .entry(point.to_string())
            .or_default()
            .insert(hook.to_string(), value);
    }
}
