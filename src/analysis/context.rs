//! Context Assembly
//!
//! Turns project files into the text blobs sent to the model.
//!
//! - [`ContextBuilder::build`]: analysis context, each file capped at a fixed
//!   number of characters
//! - [`full_context`]: chat grounding context, untruncated
//!
//! Both are pure and deterministic. There is no global budget across files.

use crate::constants::context as ctx;
use crate::types::ProjectFile;
use crate::types::utils::truncate_chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBuilder {
    max_file_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(ctx::MAX_FILE_CHARS)
    }
}

impl ContextBuilder {
    pub fn new(max_file_chars: usize) -> Self {
        Self { max_file_chars }
    }

    pub fn max_file_chars(&self) -> usize {
        self.max_file_chars
    }

    /// `File: <path>\nContent:\n<content>` per file, joined by a `---` rule
    pub fn build(&self, files: &[ProjectFile]) -> String {
        files
            .iter()
            .map(|f| {
                format!(
                    "File: {}\nContent:\n{}",
                    f.path,
                    truncate_chars(&f.content, self.max_file_chars)
                )
            })
            .collect::<Vec<_>>()
            .join(ctx::ANALYSIS_SEPARATOR)
    }
}

/// Complete project text for chat grounding: `Path: <path>\nContent:\n<content>`
/// per file, joined by a blank line
pub fn full_context(files: &[ProjectFile]) -> String {
    files
        .iter()
        .map(|f| format!("Path: {}\nContent:\n{}", f.path, f.content))
        .collect::<Vec<_>>()
        .join(ctx::CHAT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn files() -> Vec<ProjectFile> {
        vec![
            ProjectFile::new("README.md", "# TaskFlow"),
            ProjectFile::new("src/app.js", "var tasks = [];"),
        ]
    }

    #[test]
    fn test_build_format() {
        let context = ContextBuilder::default().build(&files());
        assert_eq!(
            context,
            "File: README.md\nContent:\n# TaskFlow\n\n---\n\nFile: src/app.js\nContent:\nvar tasks = [];"
        );
    }

    #[test]
    fn test_build_empty() {
        assert_eq!(ContextBuilder::default().build(&[]), "");
        assert_eq!(full_context(&[]), "");
    }

    #[test]
    fn test_truncates_large_file_only() {
        let big = "x".repeat(ctx::MAX_FILE_CHARS + 500);
        let files = vec![
            ProjectFile::new("big.js", big),
            ProjectFile::new("small.js", "tiny"),
        ];
        let context = ContextBuilder::default().build(&files);
        let expected_big = format!("File: big.js\nContent:\n{}", "x".repeat(ctx::MAX_FILE_CHARS));

        assert!(context.starts_with(&expected_big));
        assert!(context.ends_with("File: small.js\nContent:\ntiny"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let files = vec![ProjectFile::new("kr.md", "가나다라마")];
        let context = ContextBuilder::new(3).build(&files);
        assert_eq!(context, "File: kr.md\nContent:\n가나다");
    }

    #[test]
    fn test_full_context_is_untruncated() {
        let big = "y".repeat(ctx::MAX_FILE_CHARS * 2);
        let files = vec![ProjectFile::new("a.py", big.clone()), ProjectFile::new("b.py", "b")];
        let context = full_context(&files);
        assert_eq!(context, format!("Path: a.py\nContent:\n{}\n\nPath: b.py\nContent:\nb", big));
    }

    proptest! {
        #[test]
        fn prop_build_is_deterministic(
            entries in prop::collection::vec(("[a-z/]{1,12}\\.[a-z]{1,3}", "\\PC{0,64}"), 0..6),
            limit in 1usize..80,
        ) {
            let files: Vec<ProjectFile> = entries
                .iter()
                .map(|(path, content)| ProjectFile::new(path.clone(), content.clone()))
                .collect();
            let builder = ContextBuilder::new(limit);
            prop_assert_eq!(builder.build(&files), builder.build(&files));
        }

        #[test]
        fn prop_file_content_never_exceeds_limit(
            content in "\\PC{0,200}",
            limit in 1usize..120,
        ) {
            let files = vec![ProjectFile::new("f.txt", content.clone())];
            let context = ContextBuilder::new(limit).build(&files);
            let body = context.strip_prefix("File: f.txt\nContent:\n").unwrap_or_default();

            prop_assert_eq!(body.chars().count(), content.chars().count().min(limit));
            prop_assert!(content.starts_with(body));
        }
    }
}
