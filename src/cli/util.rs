//! CLI Common Utilities
//!
//! Shared setup for the commands that talk to a model: load configuration,
//! ingest the project folder, build providers.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::ai::{SharedProvider, TimeoutConfig, create_provider};
use crate::config::{Config, ConfigLoader};
use crate::ingest::ProjectLoader;
use crate::types::{MentorError, ProjectFile, Result};

/// Command execution context
pub struct CommandContext {
    pub config: Config,
    pub project_root: PathBuf,
}

impl CommandContext {
    /// Load the merged configuration for a project folder
    pub fn load(project_root: &Path) -> Result<Self> {
        let config = ConfigLoader::load()?;
        Ok(Self::with_config(config, project_root))
    }

    pub fn with_config(config: Config, project_root: &Path) -> Self {
        Self {
            config,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Ingest the project folder; an empty result is an error at the CLI
    pub fn load_files(&self) -> Result<Vec<ProjectFile>> {
        let files = ProjectLoader::from_config(&self.project_root, &self.config.ingest)?.load()?;

        if files.is_empty() {
            return Err(MentorError::Ingest {
                path: self.project_root.display().to_string(),
                message: "no eligible text files found".to_string(),
            });
        }

        let total_chars: usize = files.iter().map(|f| f.char_len()).sum();
        info!(
            files = files.len(),
            chars = total_chars,
            "Ingested {}",
            self.project_root.display()
        );
        Ok(files)
    }

    pub fn analysis_provider(&self) -> Result<SharedProvider> {
        create_provider(&self.config.analysis_provider())
    }

    pub fn chat_provider(&self) -> Result<SharedProvider> {
        create_provider(&self.config.chat_provider())
    }

    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig::from_secs(self.config.llm.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_files_reads_project() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')").unwrap();

        let ctx = CommandContext::with_config(Config::default(), dir.path());
        let files = ctx.load_files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "main.py");
    }

    #[test]
    fn test_load_files_rejects_empty_project() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();

        let ctx = CommandContext::with_config(Config::default(), dir.path());
        assert!(matches!(ctx.load_files(), Err(MentorError::Ingest { .. })));
    }

    #[test]
    fn test_timeouts_follow_config() {
        let mut config = Config::default();
        config.llm.timeout_secs = 7;
        let ctx = CommandContext::with_config(config, Path::new("."));
        assert_eq!(ctx.timeouts().chat_request.as_secs(), 7);
    }
}
