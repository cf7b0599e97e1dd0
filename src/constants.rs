//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Context assembly constants
pub mod context {
    /// Per-file character cap for the analysis context
    pub const MAX_FILE_CHARS: usize = 4000;

    /// Separator between file entries in the analysis context
    pub const ANALYSIS_SEPARATOR: &str = "\n\n---\n\n";

    /// Separator between file entries in the chat context
    pub const CHAT_SEPARATOR: &str = "\n\n";
}

/// Goal defaults substituted by callers when the user leaves the goal empty
pub mod goals {
    pub const DEFAULT_GOAL: &str = "Analyze this project for architecture and best practices.";

    pub const SAMPLE_PROJECT_GOAL: &str = "Improve security, performance, and document the architecture for a production-ready handover.";
}

/// Chat presentation constants
pub mod chat {
    /// Shown when the model returns an empty reply
    pub const EMPTY_REPLY_FALLBACK: &str = "I couldn't process that request.";

    /// Shown when a send fails
    pub const SEND_FAILURE_FALLBACK: &str = "Error connecting to mentor.";

    /// Prefix of the fixed system instruction bound to every session
    pub const SYSTEM_PREFIX: &str = "You are an expert Software Mentor. Context:\n";
}

/// Project ingestion constants
pub mod ingest {
    /// Maximum file size to ingest (1MB)
    pub const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Extensions treated as text and ingested
    pub const TEXT_EXTENSIONS: &[&str] = &[
        "ts", "tsx", "js", "jsx", "json", "html", "css", "md", "py", "go", "rs", "java", "c",
        "cpp", "h", "cs", "php", "rb", "yml", "yaml", "txt", "env",
    ];

    /// Directories never descended into
    pub const IGNORED_DIRS: &[&str] = &[
        "node_modules",
        ".git",
        "dist",
        "build",
        ".next",
        "out",
        "vendor",
    ];
}

/// HTTP/Network constants
pub mod network {
    /// Default model request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
