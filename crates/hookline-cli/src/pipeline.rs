//! Pipeline file format and conversion into lifecycle points.
//!
//! ```toml
//! [[points]]
//! name = "build"
//!
//! [[points.hooks]]
//! name = "version"
//! value = "1.2.0"
//!
//! [[points.hooks]]
//! name = "compile"
//! command = "make release"
//!
//! [[replace]]
//! point = "build"
//! hook = "compile"
//! with = { name = "compile-debug", command = "make debug" }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hookline_core::config::commands::CommandConfig;
use hookline_core::error::{AppError, ErrorKind};
use hookline_lifecycle::{Hook, Orchestrator, Point};

use crate::command_hook::CommandExec;

/// A parsed pipeline file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineFile {
    /// Points in execution order.
    #[serde(default)]
    pub points: Vec<PointSpec>,
    /// Hook replacements applied after the points are registered.
    #[serde(default)]
    pub replace: Vec<ReplaceSpec>,
}

/// A point declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSpec {
    /// Point name.
    pub name: String,
    /// Hooks in execution order.
    #[serde(default)]
    pub hooks: Vec<HookSpec>,
}

/// A hook declaration. Exactly one of `value` or `command` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSpec {
    /// Hook name.
    pub name: String,
    /// Constant result.
    #[serde(default)]
    pub value: Option<toml::Value>,
    /// Shell command whose stdout is the result.
    #[serde(default)]
    pub command: Option<String>,
    /// Working directory for `command`, relative to the pipeline file.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// A `replace_hook` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceSpec {
    /// Point holding the hook.
    pub point: String,
    /// Hook to replace.
    pub hook: String,
    /// Replacement hook.
    pub with: HookSpec,
}

/// Kind of hook a spec resolves to, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Constant value.
    Value,
    /// Shell command.
    Command,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Command => write!(f, "command"),
        }
    }
}

impl HookSpec {
    /// Returns the hook kind, rejecting specs with both or neither source.
    pub fn kind(&self) -> Result<HookKind, AppError> {
        match (&self.value, &self.command) {
            (Some(_), None) => Ok(HookKind::Value),
            (None, Some(_)) => Ok(HookKind::Command),
            (Some(_), Some(_)) => Err(AppError::validation(format!(
                "hook '{}' sets both `value` and `command`",
                self.name
            ))),
            (None, None) => Err(AppError::validation(format!(
                "hook '{}' needs either `value` or `command`",
                self.name
            ))),
        }
    }

    /// Builds the runtime hook. `base_dir` anchors relative working dirs.
    pub fn to_hook(&self, config: &CommandConfig, base_dir: &Path) -> Result<Hook, AppError> {
        match self.kind()? {
            HookKind::Value => {
                let value = self.value.as_ref().map(toml_to_json).unwrap_or(Value::Null);
                Ok(Hook::value(&self.name, value))
            }
            HookKind::Command => {
                let command = self.command.as_deref().unwrap_or_default();
                let working_dir = self.working_dir.as_ref().map(|dir| base_dir.join(dir));
                let exec =
                    CommandExec::new(&self.name, command, config).with_working_dir(working_dir);
                Ok(Hook::new(&self.name, exec))
            }
        }
    }
}

impl PipelineFile {
    /// Reads and parses a pipeline file.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to read pipeline '{}': {e}", path.display()),
                e,
            )
        })?;
        Self::parse(&content).map_err(|e| {
            AppError::new(
                e.kind,
                format!("Invalid pipeline '{}': {}", path.display(), e.message),
            )
        })
    }

    /// Parses pipeline TOML.
    pub fn parse(content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, format!("TOML parse error: {e}"), e)
        })
    }

    /// Builds lifecycle points from the declarations.
    pub fn to_points(
        &self,
        config: &CommandConfig,
        base_dir: &Path,
    ) -> Result<Vec<Point>, AppError> {
        self.points
            .iter()
            .map(|spec| {
                let hooks = spec
                    .hooks
                    .iter()
                    .map(|hook| hook.to_hook(config, base_dir))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Point::new(&spec.name).with_hooks(hooks))
            })
            .collect()
    }

    /// Applies every `[[replace]]` entry to `orchestrator`, in file order.
    pub fn apply_replacements(
        &self,
        orchestrator: &mut Orchestrator,
        config: &CommandConfig,
        base_dir: &Path,
    ) -> Result<(), AppError> {
        for replacement in &self.replace {
            let hook = replacement.with.to_hook(config, base_dir)?;
            orchestrator.replace_hook(&replacement.point, &replacement.hook, hook)?;
        }
        Ok(())
    }
}

/// Converts a TOML value to JSON. Datetimes become RFC 3339 strings.
pub fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Returns the directory a pipeline path is relative to.
pub fn base_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
