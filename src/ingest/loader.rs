use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::config::IngestConfig;
use crate::constants::ingest as ingest_constants;
use crate::types::{MentorError, ProjectFile, Result};

/// Walks a project folder and returns its text files
pub struct ProjectLoader {
    root: PathBuf,
    extensions: Vec<String>,
    ignored_dirs: Vec<String>,
    exclude: Vec<glob::Pattern>,
    max_file_size: u64,
}

impl ProjectLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: to_owned_list(ingest_constants::TEXT_EXTENSIONS),
            ignored_dirs: to_owned_list(ingest_constants::IGNORED_DIRS),
            exclude: Vec::new(),
            max_file_size: ingest_constants::MAX_FILE_SIZE,
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &IngestConfig) -> Result<Self> {
        Self::new(root)
            .with_extensions(config.extensions.clone())
            .with_ignored_dirs(config.ignored_dirs.clone())
            .with_max_file_size(config.max_file_size)
            .with_exclude(&config.exclude)
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn with_ignored_dirs(mut self, dirs: Vec<String>) -> Self {
        self.ignored_dirs = dirs;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Glob patterns matched against the `/`-separated relative path
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| {
                    MentorError::Config(format!("Invalid ingest exclude pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every eligible file, sorted by relative path
    pub fn load(&self) -> Result<Vec<ProjectFile>> {
        if !self.root.is_dir() {
            return Err(MentorError::Ingest {
                path: self.root.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let ignored = self.ignored_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_exclude(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && is_ignored_name(&ignored, entry.file_name()))
            })
            .build();

        let mut files = Vec::new();
        let mut skipped = 0usize;

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(relative) = self.relative_path(path) else {
                continue;
            };

            if !self.is_eligible(&relative, path) {
                skipped += 1;
                continue;
            }

            match std::fs::read(path) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => files.push(ProjectFile::new(relative, content)),
                    Err(_) => {
                        debug!(path = %relative, "Skipping non-UTF-8 file");
                        skipped += 1;
                    }
                },
                Err(err) => {
                    warn!(path = %relative, "Failed to read file: {}", err);
                    skipped += 1;
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(
            root = %self.root.display(),
            loaded = files.len(),
            skipped,
            "Project loaded"
        );

        Ok(files)
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }

    fn is_eligible(&self, relative: &str, path: &Path) -> bool {
        if relative
            .split('/')
            .any(|part| self.ignored_dirs.iter().any(|d| d == part))
        {
            return false;
        }

        if self.exclude.iter().any(|p| p.matches(relative)) {
            return false;
        }

        if !self.has_text_extension(relative) {
            return false;
        }

        path.metadata()
            .map(|m| m.len() <= self.max_file_size)
            .unwrap_or(false)
    }

    /// Suffix match so dotfiles like `.env` count as `env`
    fn has_text_extension(&self, relative: &str) -> bool {
        let lower = relative.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }
}

fn is_ignored_name(ignored: &[String], name: &std::ffi::OsStr) -> bool {
    let name = name.to_string_lossy();
    ignored.iter().any(|d| *d == name)
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
