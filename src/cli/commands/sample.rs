//! Sample Command
//!
//! Runs the bundled TaskFlow Lite project with its preset goal. Handy for
//! checking provider credentials without pointing at a real codebase.

use crate::ai::create_provider;
use crate::cli::commands::analyze;
use crate::cli::report::ReportFormat;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::ingest::{sample_files, sample_goal};
use crate::types::Result;

pub async fn run(format: ReportFormat, quiet: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let provider = create_provider(&config.analysis_provider())?;
    let files = sample_files();

    Output::new().info(&format!(
        "Running sample project TaskFlow Lite ({} files)",
        files.len()
    ));

    analyze::execute(
        &config,
        provider,
        &files,
        sample_goal(),
        format,
        None,
        quiet,
    )
    .await
}
