pub mod commands;
pub mod progress;
pub mod report;
pub mod ui;
pub mod util;

pub use progress::{ConsoleRenderer, ProgressState, ProgressTracker};
pub use report::ReportFormat;
pub use util::CommandContext;
