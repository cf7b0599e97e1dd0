//! Bundled demo project
//!
//! TaskFlow Lite is a six-file browser app seeded with a hard-coded key, an
//! `eval` call and a busy-wait loop, so a run over it has something to find.

use crate::constants::goals::SAMPLE_PROJECT_GOAL;
use crate::types::ProjectFile;

const SAMPLE_SOURCES: [(&str, &str); 6] = [
    (
        "README.md",
        include_str!("../../samples/taskflow-lite/README.md"),
    ),
    (
        "index.html",
        include_str!("../../samples/taskflow-lite/index.html"),
    ),
    (
        "config.js",
        include_str!("../../samples/taskflow-lite/config.js"),
    ),
    ("app.js", include_str!("../../samples/taskflow-lite/app.js")),
    (
        "utils.js",
        include_str!("../../samples/taskflow-lite/utils.js"),
    ),
    (
        "styles.css",
        include_str!("../../samples/taskflow-lite/styles.css"),
    ),
];

/// The sample project in presentation order
pub fn sample_files() -> Vec<ProjectFile> {
    SAMPLE_SOURCES
        .iter()
        .map(|(path, content)| ProjectFile::new(*path, content.trim_end()))
        .collect()
}

pub fn sample_goal() -> &'static str {
    SAMPLE_PROJECT_GOAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_six_files_in_order() {
        let files = sample_files();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["README.md", "index.html", "config.js", "app.js", "utils.js", "styles.css"]
        );
        assert_eq!(files[0].mime_type, "text/markdown");
        assert_eq!(files[5].mime_type, "text/css");
    }

    #[test]
    fn test_sample_carries_seeded_flaws() {
        let files = sample_files();
        let content = |path: &str| {
            files
                .iter()
                .find(|f| f.path == path)
                .map(|f| f.content.clone())
                .unwrap()
        };

        assert!(content("config.js").contains("tf_live_9384720194872349872"));
        assert!(content("app.js").starts_with("// Global tasks array\nvar tasks = [];"));
        assert!(content("app.js").contains("console.log(\"App loaded with key:\", API_KEY);"));
        assert!(content("utils.js").contains("eval(\"(\" + jsonStr + \")\")"));
        assert!(content("utils.js").contains("while (Date.now() - start < 50)"));
        assert!(files.iter().all(|f| !f.content.ends_with('\n')));
    }

    #[test]
    fn test_sample_goal() {
        assert!(sample_goal().starts_with("Improve security, performance"));
    }
}
