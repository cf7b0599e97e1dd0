//! Config Command
//!
//! Usage:
//!   codementor config show [--format toml|json]
//!   codementor config path
//!   codementor config init [--global] [--force]

use clap::ValueEnum;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

/// Print the merged effective configuration
pub fn show(format: ConfigFormat) -> Result<()> {
    ConfigLoader::show_config(format == ConfigFormat::Json)
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let (scope, path) = if global {
        ("global", ConfigLoader::init_global(force)?)
    } else {
        ("project", ConfigLoader::init_project(force)?)
    };

    Output::new().success(&format!(
        "Initialized {} configuration at {}",
        scope,
        path.display()
    ));
    Ok(())
}
