//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/codementor/config.toml)
//! 3. Project config (.codementor/config.toml)
//! 4. Environment variables (CODEMENTOR_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{MentorError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_with_project(&Self::project_config_path())
    }

    fn load_with_project(project_path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(project_path));
        }

        // e.g. CODEMENTOR_LLM_PROVIDER -> llm.provider
        figment = figment.merge(Env::prefixed("CODEMENTOR_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| MentorError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| MentorError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (~/.config/codementor/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("codementor"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".codementor")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration as TOML or JSON
    pub fn render_config(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| MentorError::Config(e.to_string()))
        }
    }

    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render_config(&config, as_json)?);
        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            MentorError::Config("Cannot determine global config directory".to_string())
        })?;
        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = Self::project_config_path();
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    fn write_default(path: &Path, force: bool) -> Result<()> {
        if !path.exists() || force {
            fs::write(path, Self::default_config_template())?;
            info!("Created config: {}", path.display());
        } else {
            info!("Config exists: {}", path.display());
        }
        Ok(())
    }

    fn default_config_template() -> &'static str {
        r#"# codementor configuration
# Project settings in .codementor/config.toml override the global file.
# Environment variables (CODEMENTOR_LLM_MODEL, ...) override both.

version = "1.0"

[llm]
provider = "gemini"
# model = "gemini-2.5-pro"
timeout_secs = 120
temperature = 0.2
# API keys are read from GEMINI_API_KEY / OPENAI_API_KEY when not set here.

[chat]
# model = "gemini-2.5-flash"

[context]
max_file_chars = 4000

[ingest]
max_file_size = 1048576
exclude = []
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[llm]\nprovider = \"ollama\"\nmodel = \"llama3:latest\"\n\n[context]\nmax_file_chars = 1000\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3:latest"));
        assert_eq!(config.context.max_file_chars, 1000);
        // Untouched sections keep defaults
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(!config.ingest.extensions.is_empty());
    }

    #[test]
    fn test_load_from_file_validates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntemperature = 5.0\n").unwrap();

        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(MentorError::Config(_))
        ));
    }

    #[test]
    fn test_default_template_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, ConfigLoader::default_config_template()).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: This test is the only one touching this variable
        unsafe {
            std::env::set_var("CODEMENTOR_LLM_PROVIDER", "ollama");
        }
        let result = ConfigLoader::load_with_project(&temp_dir.path().join("missing.toml"));
        unsafe {
            std::env::remove_var("CODEMENTOR_LLM_PROVIDER");
        }
        assert_eq!(result.unwrap().llm.provider, "ollama");
    }

    #[test]
    fn test_render_config_hides_api_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("top-secret".to_string());

        let toml_text = ConfigLoader::render_config(&config, false).unwrap();
        let json_text = ConfigLoader::render_config(&config, true).unwrap();
        assert!(!toml_text.contains("top-secret"));
        assert!(!json_text.contains("top-secret"));
        assert!(toml_text.contains("[llm]"));
    }
}
