//! Validate a pipeline file without running it.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use crate::pipeline::{PipelineFile, base_dir};
use hookline_core::config::AppConfig;
use hookline_core::error::AppError;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Pipeline file to check
    pub pipeline: PathBuf,
}

/// Hook display row
#[derive(Debug, Serialize, Tabled)]
struct HookRow {
    /// Point name
    point: String,
    /// Hook name
    hook: String,
    /// Hook kind
    kind: String,
}

/// Findings for a pipeline file.
#[derive(Debug, Default, PartialEq, Eq)]
struct Report {
    warnings: Vec<String>,
    errors: Vec<String>,
}

/// Execute the validate command
pub async fn execute(
    args: &ValidateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let file = PipelineFile::load(&args.pipeline).await?;
    let report = inspect(&file);

    let rows: Vec<HookRow> = file
        .points
        .iter()
        .flat_map(|point| {
            point.hooks.iter().map(|hook| HookRow {
                point: point.name.clone(),
                hook: hook.name.clone(),
                kind: hook
                    .kind()
                    .map(|k| k.to_string())
                    .unwrap_or_else(|_| "invalid".to_string()),
            })
        })
        .collect();
    output::print_rows(&rows, &rows, format);

    for warning in &report.warnings {
        output::print_warning(warning);
    }
    for error in &report.errors {
        output::print_error(error);
    }

    if !report.errors.is_empty() {
        return Err(AppError::validation(format!(
            "Pipeline '{}' has {} error(s)",
            args.pipeline.display(),
            report.errors.len()
        )));
    }

    file.to_points(&config.commands, &base_dir(&args.pipeline))?;
    output::print_success(&format!(
        "Pipeline '{}' is valid ({} points)",
        args.pipeline.display(),
        file.points.len()
    ));

    Ok(())
}

/// Checks naming rules and replacement targets.
///
/// Duplicate point names and replacements pointing outside this file are
/// warnings: the first is allowed by the orchestrator, the second may target
/// a file this one is appended to. Duplicate hook names and malformed hooks
/// are errors.
fn inspect(file: &PipelineFile) -> Report {
    let mut report = Report::default();
    let mut point_names = HashSet::new();

    for point in &file.points {
        if !point_names.insert(point.name.as_str()) {
            report.warnings.push(format!(
                "point '{}' is declared more than once; later results overwrite earlier ones",
                point.name
            ));
        }

        let mut hook_names = HashSet::new();
        for hook in &point.hooks {
            if !hook_names.insert(hook.name.as_str()) {
                report.errors.push(format!(
                    "hook '{}' is declared more than once in point '{}'",
                    hook.name, point.name
                ));
            }
            if let Err(e) = hook.kind() {
                report.errors.push(e.message);
            }
        }
    }

    for replacement in &file.replace {
        if let Err(e) = replacement.with.kind() {
            report.errors.push(e.message);
        }
        match file.points.iter().find(|p| p.name == replacement.point) {
            None => report.warnings.push(format!(
                "replacement targets point '{}' which this file does not declare",
                replacement.point
            )),
            Some(point) if !point.hooks.iter().any(|h| h.name == replacement.hook) => {
                report.warnings.push(format!(
                    "replacement targets hook '{}' which point '{}' does not declare",
                    replacement.hook, replacement.point
                ))
            }
            Some(_) => {}
        }
    }

    report
}
