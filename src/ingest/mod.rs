//! Project Ingestion
//!
//! Turns a folder into the `ProjectFile` list the analysis core consumes.
//! Text-file filtering and ignored-directory rules are applied here, once;
//! the pipeline and chat sessions trust their input.

mod loader;
mod sample;

pub use loader::ProjectLoader;
pub use sample::{sample_files, sample_goal};
