//! Run a pipeline.

use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;
use tabled::Tabled;
use tracing::info;

use crate::output::{self, OutputFormat};
use crate::pipeline::{PipelineFile, base_dir};
use hookline_core::config::AppConfig;
use hookline_core::error::{AppError, ErrorKind};
use hookline_core::result::AppResult;
use hookline_lifecycle::Orchestrator;

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Pipeline file to run
    pub pipeline: PathBuf,
    /// Extra pipeline files whose points are appended, in order
    #[arg(short, long = "append")]
    pub append: Vec<PathBuf>,
    /// JSON value forwarded to every hook
    #[arg(short, long)]
    pub options: Option<String>,
}

/// Store display row
#[derive(Debug, Tabled)]
struct ResultRow {
    /// Point name
    point: String,
    /// Hook name
    hook: String,
    /// Recorded value
    value: String,
}

/// Execute the run command
pub async fn execute(
    args: &RunArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let options = parse_options(args.options.as_deref())?;
    let orchestrator = build_orchestrator(&args.pipeline, &args.append, config).await?;

    let result = orchestrator.run(options).await?;

    let rows: Vec<ResultRow> = result
        .store()
        .iter()
        .flat_map(|(point, hooks)| {
            hooks.iter().map(move |(hook, value)| ResultRow {
                point: point.to_string(),
                hook: hook.clone(),
                value: display_value(value),
            })
        })
        .collect();

    output::print_rows(&rows, &result, format);
    if format == OutputFormat::Table {
        output::print_success(&format!(
            "Run {} completed: {} hooks across {} points",
            result.run_id(),
            result.hooks_executed(),
            result.points_executed()
        ));
    }

    Ok(())
}

/// Loads `pipeline`, then appends each file in `append` through `add_points`.
///
/// Each file's `[[replace]]` entries are applied right after its points are
/// registered, so an appended file may replace hooks of earlier files.
pub async fn build_orchestrator(
    pipeline: &Path,
    append: &[PathBuf],
    config: &AppConfig,
) -> AppResult<Orchestrator> {
    let file = PipelineFile::load(pipeline).await?;
    let base = base_dir(pipeline);

    let points = file.to_points(&config.commands, &base)?;
    let mut orchestrator = Orchestrator::with_config(points, &config.lifecycle);
    file.apply_replacements(&mut orchestrator, &config.commands, &base)?;

    for path in append {
        let extra = PipelineFile::load(path).await?;
        let base = base_dir(path);
        orchestrator.add_points(extra.to_points(&config.commands, &base)?);
        extra.apply_replacements(&mut orchestrator, &config.commands, &base)?;
    }

    info!(
        pipeline = %pipeline.display(),
        appended = append.len(),
        points = orchestrator.len(),
        policy = %orchestrator.policy(),
        "Pipeline assembled"
    );

    Ok(orchestrator)
}

fn parse_options(raw: Option<&str>) -> AppResult<Option<Value>> {
    raw.map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("--options is not valid JSON: {e}"),
                e,
            )
        })
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
