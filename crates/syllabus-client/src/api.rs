//! HTTP client for the syllabus analysis service
//!
//! Endpoints:
//!
//! | Method | Path                              | Multipart fields              |
//! |--------|-----------------------------------|-------------------------------|
//! | GET    | `/`                               |                               |
//! | POST   | `/api/upload-paper`               | `file`                        |
//! | POST   | `/api/upload-syllabus`            | `file`                        |
//! | POST   | `/api/analyze-paper`              | `paper`, `syllabus`           |
//! | POST   | `/api/diff-syllabus`              | `old_syllabus`, `new_syllabus`|
//! | POST   | `/api/compare-syllabi-detailed`   | `old_syllabus`, `new_syllabus`|
//!
//! Analysis responses are returned as raw JSON; turning them into reports is
//! left to `syllabus_report`.

use std::time::Instant;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::upload::{UploadFile, UploadSlot};

pub const HEALTH_PATH: &str = "/";
pub const UPLOAD_PAPER_PATH: &str = "/api/upload-paper";
pub const UPLOAD_SYLLABUS_PATH: &str = "/api/upload-syllabus";
pub const ANALYZE_PAPER_PATH: &str = "/api/analyze-paper";
pub const DIFF_SYLLABUS_PATH: &str = "/api/diff-syllabus";
pub const COMPARE_SYLLABI_PATH: &str = "/api/compare-syllabi-detailed";

const PDF_MIME: &str = "application/pdf";

/// Acknowledgement returned by the single-file upload endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: String,
    /// Where the service stored the file (paper uploads only)
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AnalysisClient {
    /// Build a client with the configured base URL and request timeout
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ping the service root
    pub async fn health(&self) -> Result<Value> {
        let request = self.http.get(self.config.endpoint(HEALTH_PATH));
        self.send(HEALTH_PATH, request).await
    }

    pub async fn upload_paper(&self, file: &UploadFile) -> Result<UploadReceipt> {
        self.upload(UPLOAD_PAPER_PATH, file).await
    }

    pub async fn upload_syllabus(&self, file: &UploadFile) -> Result<UploadReceipt> {
        self.upload(UPLOAD_SYLLABUS_PATH, file).await
    }

    /// Per-question alignment of an exam paper against a syllabus
    pub async fn analyze_paper(&self, paper: &UploadFile, syllabus: &UploadFile) -> Result<Value> {
        self.analyze(
            ANALYZE_PAPER_PATH,
            [(UploadSlot::Paper, paper), (UploadSlot::Syllabus, syllabus)],
        )
        .await
    }

    /// Topic-level changes between two syllabus versions
    pub async fn diff_syllabus(&self, old: &UploadFile, new: &UploadFile) -> Result<Value> {
        self.analyze(
            DIFF_SYLLABUS_PATH,
            [(UploadSlot::OldSyllabus, old), (UploadSlot::NewSyllabus, new)],
        )
        .await
    }

    /// Overall mapping score between two syllabi
    pub async fn compare_syllabi(&self, old: &UploadFile, new: &UploadFile) -> Result<Value> {
        self.analyze(
            COMPARE_SYLLABI_PATH,
            [(UploadSlot::OldSyllabus, old), (UploadSlot::NewSyllabus, new)],
        )
        .await
    }

    async fn upload(&self, path: &'static str, file: &UploadFile) -> Result<UploadReceipt> {
        let form = Form::new().part("file", pdf_part(file)?);
        let request = self.http.post(self.config.endpoint(path)).multipart(form);
        let body = self.send(path, request).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn analyze(
        &self,
        path: &'static str,
        files: [(UploadSlot, &UploadFile); 2],
    ) -> Result<Value> {
        let mut form = Form::new();
        for (slot, file) in files {
            debug!(field = slot.field_name(), name = file.name(), "Attaching upload");
            form = form.part(slot.field_name(), pdf_part(file)?);
        }

        let request = self.http.post(self.config.endpoint(path)).multipart(form);
        self.send(path, request).await
    }

    async fn send(&self, path: &'static str, request: RequestBuilder) -> Result<Value> {
        let started = Instant::now();
        info!(endpoint = path, "Calling analysis service");

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            let detail = error_detail(status, &body);
            warn!(endpoint = path, status = status.as_u16(), elapsed_ms, detail = %detail, "Analysis service rejected request");
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        info!(endpoint = path, status = status.as_u16(), elapsed_ms, "Analysis service responded");
        Ok(serde_json::from_str(&body)?)
    }
}

fn pdf_part(file: &UploadFile) -> Result<Part> {
    Ok(Part::bytes(file.bytes().to_vec())
        .file_name(file.name().to_string())
        .mime_str(PDF_MIME)?)
}

/// Human-readable reason for a failed request.
///
/// The service answers errors with `{"detail": ...}`, where detail is a
/// string or, for validation failures, a list of `{"msg": ...}` objects.
fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(Value::String(message)) => message,
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                Value::Array(items).to_string()
            } else {
                messages.join("; ")
            }
        }
        Some(Value::Null) | None if !body.trim().is_empty() => body.trim().to_string(),
        Some(Value::Null) | None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Some(other) => other.to_string(),
    }
}
