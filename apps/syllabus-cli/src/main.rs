//! Syllabus report CLI
//!
//! Sends PDFs to the syllabus analysis service and prints the normalized
//! reports:
//! - Paper alignment (exam questions vs. syllabus)
//! - Syllabus changes (old vs. new syllabus)
//! - Syllabus mapping (overall similarity score)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use syllabus_report::{ChangeFilter, ReportKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod reporter;

use commands::{AnalysisInput, CommandContext, UploadKind};
use reporter::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "syllabus")]
#[command(version, about = "Syllabus alignment, diff and mapping reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "console")]
    format: OutputFormat,

    /// Analysis service URL (overrides SYLLABUS_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// TOML config file with an [api] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the analysis service is running
    Health,

    /// Upload a single PDF
    Upload {
        #[arg(long, value_enum)]
        kind: UploadKind,

        file: PathBuf,
    },

    /// Check each exam question against a syllabus
    Align {
        #[arg(long)]
        paper: Option<PathBuf>,

        #[arg(long)]
        syllabus: Option<PathBuf>,

        /// Show the bundled sample report instead of calling the service
        #[arg(long)]
        placeholder: bool,
    },

    /// List topics added, removed or modified between two syllabi
    Changes {
        #[arg(long)]
        old: Option<PathBuf>,

        #[arg(long)]
        new: Option<PathBuf>,

        /// all, added, removed or modified
        #[arg(long, default_value = "all")]
        filter: ChangeFilter,

        /// Show the bundled sample report instead of calling the service
        #[arg(long)]
        placeholder: bool,
    },

    /// Score how well an old syllabus maps onto a new one
    Mapping {
        #[arg(long)]
        old: Option<PathBuf>,

        #[arg(long)]
        new: Option<PathBuf>,

        /// Show the bundled sample report instead of calling the service
        #[arg(long)]
        placeholder: bool,
    },

    /// Normalize a saved JSON payload (or the bundled sample) without calling the service
    Render {
        /// alignment, changes or mapping
        #[arg(long)]
        kind: ReportKind,

        /// all, added, removed or modified
        #[arg(long, default_value = "all")]
        filter: ChangeFilter,

        payload: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so report output on stdout stays clean
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::resolve_config(cli.config.as_deref(), cli.api_url, cli.timeout_ms)?;
    let ctx = CommandContext {
        config,
        format: cli.format,
    };

    match cli.command {
        Command::Health => commands::health(&ctx).await,
        Command::Upload { kind, file } => commands::upload(&ctx, kind, &file).await,
        Command::Align {
            paper,
            syllabus,
            placeholder,
        } => {
            let input = AnalysisInput {
                first: paper,
                second: syllabus,
                placeholder,
            };
            commands::align(&ctx, input).await
        }
        Command::Changes {
            old,
            new,
            filter,
            placeholder,
        } => {
            let input = AnalysisInput {
                first: old,
                second: new,
                placeholder,
            };
            commands::changes(&ctx, input, filter).await
        }
        Command::Mapping {
            old,
            new,
            placeholder,
        } => {
            let input = AnalysisInput {
                first: old,
                second: new,
                placeholder,
            };
            commands::mapping(&ctx, input).await
        }
        Command::Render {
            kind,
            filter,
            payload,
        } => commands::render(&ctx, kind, payload.as_deref(), filter),
    }
}
