//! Analyze Command
//!
//! Ingests a folder, runs the five-stage review with live progress on stderr,
//! then prints or writes the report.
//!
//! Usage:
//!   codementor analyze <PATH> [--goal TEXT] [--format text|json|yaml] [--output FILE]

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ai::SharedProvider;
use crate::analysis::AnalysisPipeline;
use crate::cli::progress::{ConsoleRenderer, ProgressTracker};
use crate::cli::report::{self, ReportFormat};
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::Config;
use crate::constants::goals::DEFAULT_GOAL;
use crate::types::{ProjectFile, Result};

pub struct AnalyzeOptions {
    pub path: PathBuf,
    pub goal: Option<String>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    /// Suppress live progress lines
    pub quiet: bool,
}

pub async fn run(options: AnalyzeOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.path)?;
    let files = ctx.load_files()?;
    let provider = ctx.analysis_provider()?;
    let goal = resolve_goal(options.goal.as_deref());

    Output::new().info(&format!(
        "Analyzing {} files from {}",
        files.len(),
        options.path.display()
    ));

    execute(
        &ctx.config,
        provider,
        &files,
        &goal,
        options.format,
        options.output,
        options.quiet,
    )
    .await
}

/// Blank or missing goals fall back to the generic review goal
pub fn resolve_goal(goal: Option<&str>) -> String {
    match goal.map(str::trim) {
        Some(goal) if !goal.is_empty() => goal.to_string(),
        _ => DEFAULT_GOAL.to_string(),
    }
}

/// Run the pipeline over already-loaded files and emit the report
pub(crate) async fn execute(
    config: &Config,
    provider: SharedProvider,
    files: &[ProjectFile],
    goal: &str,
    format: ReportFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let pipeline = AnalysisPipeline::from_config(provider, config);
    let tracker = ProgressTracker::new();
    let renderer = (!quiet).then(|| ConsoleRenderer::new().spawn(tracker.subscribe()));

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling analysis");
                cancel.cancel();
            }
        })
    };

    let result = pipeline
        .run_with_cancel(files, goal, &tracker, &cancel)
        .await;
    ctrl_c.abort();
    drop(tracker);
    if let Some(handle) = renderer {
        let _ = handle.await;
    }

    let report = result?;
    let rendered = report::render(&report, format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &rendered)?;
            Output::new().success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", rendered),
    }

    let usage = pipeline.metrics();
    info!(
        calls = usage.api_calls,
        tokens = usage.total_tokens,
        worst = ?report.worst_severity(),
        "Analysis usage"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stages::fixtures;
    use crate::analysis::testing::MockProvider;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_goal() {
        assert_eq!(resolve_goal(Some("Harden auth")), "Harden auth");
        assert_eq!(resolve_goal(Some("  ")), DEFAULT_GOAL);
        assert_eq!(resolve_goal(None), DEFAULT_GOAL);
    }

    #[tokio::test]
    async fn test_execute_writes_json_report() {
        let mock = Arc::new(MockProvider::new());
        for payload in fixtures::ALL {
            mock.push_ok(payload);
        }
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports/report.json");
        let files = vec![ProjectFile::new("app.js", "var tasks = [];")];

        execute(
            &Config::default(),
            mock.clone(),
            &files,
            "Review",
            ReportFormat::Json,
            Some(out.clone()),
            true,
        )
        .await
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(written["architecture"]["pattern"], "Monolithic Script");
        assert_eq!(mock.generate_calls(), 5);
    }

    #[tokio::test]
    async fn test_execute_surfaces_stage_failure() {
        let mock = Arc::new(MockProvider::new());
        mock.push_ok(fixtures::UNDERSTANDING);
        mock.push_err(crate::types::ErrorCategory::Auth, "invalid api key");
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.txt");

        let err = execute(
            &Config::default(),
            mock,
            &[ProjectFile::new("a.py", "x = 1")],
            "Review",
            ReportFormat::Text,
            Some(out.clone()),
            true,
        )
        .await
        .unwrap_err();

        assert_eq!(err.failed_step(), Some(crate::types::StepId::Architecture));
        assert!(!out.exists());
    }
}
