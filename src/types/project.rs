//! Project input types
//!
//! `ProjectFile` is the unit handed to the analysis pipeline and chat sessions.
//! Content is stored in full; any truncation is a context-building policy.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single text file belonging to the analyzed project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    /// File name without directories
    pub name: String,
    /// Path relative to the project root, `/`-separated
    pub path: String,
    pub content: String,
    pub mime_type: String,
}

impl ProjectFile {
    /// Build a file from a relative path, deriving name and mime type
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        let mime_type = guess_mime_type(&path).to_string();

        Self {
            name,
            path,
            content: content.into(),
            mime_type,
        }
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Mime type from file extension; unknown text falls back to `text/plain`
pub fn guess_mime_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("md") => "text/markdown",
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("jsx") => "application/javascript",
        Some("ts") | Some("tsx") => "application/typescript",
        Some("json") => "application/json",
        Some("yml") | Some("yaml") => "application/yaml",
        Some("py") => "text/x-python",
        Some("rs") => "text/x-rust",
        Some("go") => "text/x-go",
        Some("java") => "text/x-java",
        Some("c") | Some("h") => "text/x-c",
        Some("cpp") => "text/x-c++",
        Some("cs") => "text/x-csharp",
        Some("php") => "application/x-php",
        Some("rb") => "text/x-ruby",
        _ => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_name_and_mime() {
        let file = ProjectFile::new("src/utils.js", "function f() {}");
        assert_eq!(file.name, "utils.js");
        assert_eq!(file.path, "src/utils.js");
        assert_eq!(file.mime_type, "application/javascript");
    }

    #[test]
    fn test_unknown_extension_is_plain_text() {
        assert_eq!(guess_mime_type("Makefile"), "text/plain");
        assert_eq!(guess_mime_type(".env"), "text/plain");
        assert_eq!(guess_mime_type("README.MD"), "text/markdown");
    }

    #[test]
    fn test_serializes_camel_case() {
        let file = ProjectFile::new("README.md", "# Hi");
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["mimeType"], "text/markdown");
    }
}
