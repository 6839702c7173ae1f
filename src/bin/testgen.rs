//! Binary entry point for the testgen CLI.
//!
//! ## Usage
//!
//! ```bash
//! # List projects and their sibling test projects
//! testgen projects
//!
//! # Actions offered on the type declared at line 5, column 18
//! testgen actions --at src/Acme.Widgets/Core/Foo.cs:5:18
//!
//! # Preview the unit fixture as a unified diff
//! testgen preview --at src/Acme.Widgets/Core/Foo.cs:5:18 --kind unit
//!
//! # Create the integration fixture on disk
//! testgen apply --at src/Acme.Widgets/Core/Foo.cs:5:18 --kind integration
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use testgen::cli::{run_actions, run_apply, run_preview, run_projects, CliContext, PreviewFormat};
use testgen::csharp::template::FixtureFlavor;
use testgen::error::{OutputErrorCode, TestgenError};
use testgen::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Scaffold NUnit test fixtures for C# types.
///
/// All output is JSON, except `preview`, which prints a unified diff by default.
#[derive(Parser, Debug)]
#[command(name = "testgen", version, about = "Scaffold NUnit test fixtures for C# types")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// JSON file overriding naming conventions.
    #[arg(long, global = true)]
    conventions: Option<PathBuf>,

    /// Additional directory names to skip during discovery.
    #[arg(long, global = true)]
    exclude: Vec<String>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Fixture kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    /// Unit test fixture (fake-aware base, setup per test).
    Unit,
    /// Integration test fixture (setup once per fixture).
    Integration,
}

impl From<Kind> for FixtureFlavor {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Unit => FixtureFlavor::Unit,
            Kind::Integration => FixtureFlavor::Integration,
        }
    }
}

/// Output format for the preview command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Unified diff format (default, compatible with `git apply`).
    #[default]
    Diff,
    /// Full JSON response.
    Json,
}

impl From<Format> for PreviewFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Diff => PreviewFormat::Diff,
            Format::Json => PreviewFormat::Json,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List projects and their sibling test projects.
    Projects,
    /// List the actions offered at a selection.
    Actions {
        /// Selection (file:line:col).
        #[arg(long)]
        at: String,
    },
    /// Show what an action would create without writing anything.
    Preview {
        /// Selection (file:line:col).
        #[arg(long)]
        at: String,
        /// Fixture kind.
        #[arg(long, value_enum)]
        kind: Kind,
        /// Output format.
        #[arg(long, value_enum, default_value = "diff")]
        format: Format,
    },
    /// Create the fixture file on disk.
    Apply {
        /// Selection (file:line:col).
        #[arg(long)]
        at: String,
        /// Fixture kind.
        #[arg(long, value_enum)]
        kind: Kind,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.global.log_level, cli.global.log_format);

    // Execute command and handle errors
    match execute(cli) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            let _ = io::stdout().flush();
            ExitCode::SUCCESS
        }
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::new(&err, None);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<String, TestgenError> {
    let workspace = match cli.global.workspace {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| TestgenError::internal(format!("cannot read current directory: {}", e)))?,
    };
    let ctx = CliContext::new(&workspace, cli.global.conventions.as_deref())?
        .with_excludes(&cli.global.exclude);

    match cli.command {
        Command::Projects => run_projects(&ctx),
        Command::Actions { at } => run_actions(&ctx, &at),
        Command::Preview { at, kind, format } => run_preview(&ctx, &at, kind.into(), format.into()),
        Command::Apply { at, kind } => run_apply(&ctx, &at, kind.into()),
    }
}
