use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codementor::cli::ReportFormat;
use codementor::cli::commands::config::ConfigFormat;

#[derive(Parser)]
#[command(name = "codementor")]
#[command(
    version,
    about = "Multi-stage LLM review of a codebase, with a project-grounded mentor chat"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Debug-level logging")]
    verbose: bool,

    #[arg(long, short, global = true, help = "Errors only; hides live progress")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project folder and print the report
    Analyze {
        #[arg(help = "Project folder")]
        path: PathBuf,
        #[arg(long, short, help = "What the review should focus on")]
        goal: Option<String>,
        #[arg(long, short, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        #[arg(long, short, help = "Write the report to a file instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Chat with a mentor that has read the whole project
    Chat {
        #[arg(help = "Project folder")]
        path: PathBuf,
    },

    /// Analyze the bundled TaskFlow Lite sample
    Sample {
        #[arg(long, short, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, short, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcodementor hit an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            path,
            goal,
            format,
            output,
        } => {
            use codementor::cli::commands::analyze::{self, AnalyzeOptions};

            let rt = Runtime::new()?;
            rt.block_on(analyze::run(AnalyzeOptions {
                path,
                goal,
                format,
                output,
                quiet: cli.quiet,
            }))?;
        }
        Commands::Chat { path } => {
            let rt = Runtime::new()?;
            rt.block_on(codementor::cli::commands::chat::run(&path))?;
        }
        Commands::Sample { format } => {
            let rt = Runtime::new()?;
            rt.block_on(codementor::cli::commands::sample::run(format, cli.quiet))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                codementor::cli::commands::config::show(format)?;
            }
            ConfigAction::Path => {
                codementor::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                codementor::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
