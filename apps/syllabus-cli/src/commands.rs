//! Subcommand implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use syllabus_client::{
    AnalysisClient, ClientConfig, ClientError, ComparisonForm, LoadOutcome, ReportView,
    UploadFile,
};
use syllabus_report::{normalize, ChangeFilter, NormalizedReport, ReportKind, ReportSource};
use tracing::{debug, info};

use crate::reporter::{OutputFormat, RenderedReport, Reporter};

/// Settings shared by every subcommand
pub struct CommandContext {
    pub config: ClientConfig,
    pub format: OutputFormat,
}

impl CommandContext {
    fn client(&self) -> Result<AnalysisClient> {
        AnalysisClient::new(self.config.clone()).context("Failed to build analysis client")
    }

    fn report(&self, report: &RenderedReport) -> Result<()> {
        Reporter::new(self.format).report(report)
    }

    fn print_json(&self, value: &Value) -> Result<()> {
        let output = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
            _ => serde_json::to_string(value)?,
        };
        println!("{}", output);
        Ok(())
    }
}

/// Resolve client settings: flag > environment > config file > defaults
pub fn resolve_config(
    config_path: Option<&Path>,
    api_url: Option<String>,
    timeout_ms: Option<u64>,
) -> Result<ClientConfig> {
    let config = load_config(config_path)?
        .with_env()
        .context("Invalid environment configuration")?;
    apply_flags(config, api_url, timeout_ms)
}

fn load_config(config_path: Option<&Path>) -> Result<ClientConfig> {
    match config_path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Ok(ClientConfig::default()),
    }
}

fn apply_flags(
    mut config: ClientConfig,
    api_url: Option<String>,
    timeout_ms: Option<u64>,
) -> Result<ClientConfig> {
    if let Some(url) = api_url {
        config.base_url = url;
    }
    if let Some(timeout_ms) = timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    config.validate()?;
    debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "Resolved client config");
    Ok(config)
}

pub async fn health(ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    let body = client
        .health()
        .await
        .with_context(|| format!("Analysis service at {} is not reachable", ctx.config.base_url))?;

    if ctx.format.is_json() {
        return ctx.print_json(&body);
    }

    let status = body.get("status").and_then(Value::as_str).unwrap_or("unknown");
    let message = body.get("message").and_then(Value::as_str).unwrap_or("");
    println!("{}: {} {}", ctx.config.base_url, status, message);
    Ok(())
}

pub async fn upload(ctx: &CommandContext, kind: UploadKind, path: &Path) -> Result<()> {
    let file = UploadFile::from_path(path)?;
    let client = ctx.client()?;

    let receipt = match kind {
        UploadKind::Paper => client.upload_paper(&file).await,
        UploadKind::Syllabus => client.upload_syllabus(&file).await,
    }
    .with_context(|| format!("Failed to upload {}", path.display()))?;

    if ctx.format.is_json() {
        return ctx.print_json(&serde_json::to_value(&receipt)?);
    }

    println!("Uploaded {} ({} bytes)", receipt.filename, file.len());
    if let Some(stored) = &receipt.file_path {
        println!("  Stored at: {}", stored);
    }
    if let Some(message) = &receipt.message {
        println!("  {}", message);
    }
    Ok(())
}

/// Which single-file upload endpoint to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum UploadKind {
    Paper,
    Syllabus,
}

/// Two input files for one analysis
pub struct AnalysisInput {
    pub first: Option<PathBuf>,
    pub second: Option<PathBuf>,
    pub placeholder: bool,
}

pub async fn align(ctx: &CommandContext, input: AnalysisInput) -> Result<()> {
    analyze(ctx, ReportKind::PaperAlignment, input, ChangeFilter::All).await
}

pub async fn changes(
    ctx: &CommandContext,
    input: AnalysisInput,
    filter: ChangeFilter,
) -> Result<()> {
    analyze(ctx, ReportKind::SyllabusChanges, input, filter).await
}

pub async fn mapping(ctx: &CommandContext, input: AnalysisInput) -> Result<()> {
    analyze(ctx, ReportKind::SyllabusMapping, input, ChangeFilter::All).await
}

/// Print whatever the view ended up showing, then surface a failed load
async fn analyze(
    ctx: &CommandContext,
    kind: ReportKind,
    input: AnalysisInput,
    filter: ChangeFilter,
) -> Result<()> {
    let run = run_analysis(ctx, kind, input).await?;
    ctx.report(&run.rendered.with_filter(filter))?;
    match run.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Outcome of one analysis. A failed load still renders the empty report
/// the view fell back to.
pub struct AnalysisRun {
    pub rendered: RenderedReport,
    pub failure: Option<anyhow::Error>,
}

/// Normalize a saved payload, or the bundled placeholder when no file is given
pub fn render(
    ctx: &CommandContext,
    kind: ReportKind,
    path: Option<&Path>,
    filter: ChangeFilter,
) -> Result<()> {
    let (origin, source) = match path {
        Some(path) => (path.display().to_string(), ReportSource::Live(read_payload(path)?)),
        None => ("placeholder".to_string(), ReportSource::Placeholder),
    };

    let report = normalize(kind, &source)?;
    ctx.report(&RenderedReport::new(origin, report).with_filter(filter))
}

fn read_payload(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Payload is not valid JSON: {}", path.display()))
}

fn form_for(kind: ReportKind) -> ComparisonForm {
    match kind {
        ReportKind::PaperAlignment => ComparisonForm::paper_alignment(),
        ReportKind::SyllabusChanges | ReportKind::SyllabusMapping => {
            ComparisonForm::syllabus_pair()
        }
    }
}

/// Fill a form from the command line, leaving unusable files flagged on their slot
fn fill_form(
    kind: ReportKind,
    first: Option<PathBuf>,
    second: Option<PathBuf>,
) -> Result<ComparisonForm> {
    let mut form = form_for(kind);
    let [first_slot, second_slot] = form.slots();

    for (slot, path) in [(first_slot, first), (second_slot, second)] {
        let Some(path) = path else { continue };
        match form.select_path(slot, &path) {
            Ok(()) | Err(ClientError::InvalidFile { .. }) => {}
            Err(e) => return Err(e).with_context(|| format!("Cannot use {} file", slot)),
        }
    }

    Ok(form)
}

async fn run_analysis(
    ctx: &CommandContext,
    kind: ReportKind,
    input: AnalysisInput,
) -> Result<AnalysisRun> {
    let view = ReportView::for_kind(kind);

    if input.placeholder {
        info!(kind = %kind, "Using placeholder report");
        let outcome = view.load_payload(async move { kind.placeholder_payload() }).await;
        return finish(&view, "placeholder", outcome);
    }

    let mut form = fill_form(kind, input.first, input.second)?;
    let (first, second) = form.submission()?;
    let client = ctx.client()?;

    let outcome = match kind {
        ReportKind::PaperAlignment => {
            view.load_payload(client.analyze_paper(first, second)).await
        }
        ReportKind::SyllabusChanges => {
            view.load_payload(client.diff_syllabus(first, second)).await
        }
        ReportKind::SyllabusMapping => {
            view.load_payload(client.compare_syllabi(first, second)).await
        }
    };

    finish(&view, &ctx.config.base_url, outcome)
}

fn finish<E>(
    view: &ReportView<NormalizedReport>,
    origin: &str,
    outcome: LoadOutcome<E>,
) -> Result<AnalysisRun>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let failure = match outcome {
        LoadOutcome::Loaded => None,
        LoadOutcome::Failed(e) => {
            Some(anyhow::Error::new(e).context(format!("{} analysis failed", view.kind())))
        }
        LoadOutcome::Stale => bail!("{} load was superseded", view.kind()),
    };

    let snapshot = view.snapshot();
    Ok(AnalysisRun {
        rendered: RenderedReport::new(origin, snapshot.value).with_loaded_at(snapshot.loaded_at),
        failure,
    })
}
