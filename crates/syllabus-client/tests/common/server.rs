//! Stand-in for the analysis service
//!
//! Binds an axum router on an ephemeral localhost port. Each analysis
//! handler echoes the multipart fields it received under `received` so tests
//! can check what the client sent.

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Serve `router` in the background and return its base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Router answering every endpoint the way a healthy service does
pub fn analysis_service() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/upload-paper", post(upload_paper))
        .route("/api/upload-syllabus", post(upload_syllabus))
        .route("/api/analyze-paper", post(analyze_paper))
        .route("/api/diff-syllabus", post(diff_syllabus))
        .route("/api/compare-syllabi-detailed", post(compare_syllabi))
}

/// Router failing every analysis the way the service does when the model call errors
#[allow(dead_code)]
pub fn failing_service(detail: &'static str) -> Router {
    let fail = move || async move {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
    };
    Router::new()
        .route("/api/analyze-paper", post(fail))
        .route("/api/diff-syllabus", post(fail))
        .route("/api/compare-syllabi-detailed", post(fail))
}

#[derive(Debug)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    size: usize,
}

async fn read_fields(mut multipart: Multipart) -> Vec<ReceivedField> {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            size,
        });
    }
    fields
}

fn echo(fields: &[ReceivedField]) -> Value {
    fields
        .iter()
        .map(|f| {
            json!({
                "field": f.name,
                "file_name": f.file_name,
                "content_type": f.content_type,
                "size": f.size,
            })
        })
        .collect()
}

fn file_name(fields: &[ReceivedField], field: &str) -> Option<String> {
    fields
        .iter()
        .find(|f| f.name == field)
        .and_then(|f| f.file_name.clone())
}

/// Files the service refuses, mirroring its extension check
fn reject_unless_pdfs(fields: &[ReceivedField], names: &[&str]) -> Option<Response> {
    let all_pdfs = names.iter().all(|name| {
        file_name(fields, name).is_some_and(|file| file.ends_with(".pdf"))
    });
    (!all_pdfs).then(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Both files must be PDFs" })),
        )
            .into_response()
    })
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Syllabus Alignment API is running" }))
}

async fn upload_paper(multipart: Multipart) -> Json<Value> {
    let fields = read_fields(multipart).await;
    let name = file_name(&fields, "file").unwrap_or_default();
    Json(json!({
        "success": true,
        "filename": name,
        "file_path": format!("uploads/{}", name),
        "received": echo(&fields),
    }))
}

async fn upload_syllabus(multipart: Multipart) -> Json<Value> {
    let fields = read_fields(multipart).await;
    Json(json!({
        "success": true,
        "filename": file_name(&fields, "file").unwrap_or_default(),
        "message": "Syllabus uploaded successfully",
    }))
}

async fn analyze_paper(multipart: Multipart) -> Response {
    let fields = read_fields(multipart).await;
    if let Some(rejection) = reject_unless_pdfs(&fields, &["paper", "syllabus"]) {
        return rejection;
    }

    Json(json!({
        "success": true,
        "paper_file": file_name(&fields, "paper"),
        "syllabus_file": file_name(&fields, "syllabus"),
        "received": echo(&fields),
        "report": {
            "paper_analysis": [
                { "question_no": 1, "topic": "Quadratic Equations", "status": "aligned", "confidence": 0.92 },
                { "question_no": 2, "topic": "Matrices", "status": "out_of_scope", "confidence": "0.81" },
                { "question_no": 3, "topic": "Quadratic Equations", "status": "need_review", "confidence": 0.41, "elaboration": "Uses the discriminant beyond the stated depth" },
                { "question_no": 4, "status": "pending" }
            ]
        }
    }))
    .into_response()
}

async fn diff_syllabus(multipart: Multipart) -> Response {
    let fields = read_fields(multipart).await;
    if let Some(rejection) = reject_unless_pdfs(&fields, &["old_syllabus", "new_syllabus"]) {
        return rejection;
    }

    Json(json!({
        "success": true,
        "old_file": file_name(&fields, "old_syllabus"),
        "new_file": file_name(&fields, "new_syllabus"),
        "received": echo(&fields),
        "report": {
            "syllabi_diff": [
                { "topic_name": "Set Language and Notation", "status": "removed", "description": "Venn diagrams moved to the lower grade" },
                { "topic_name": "Vectors", "status": "added", "description": "Column vectors and magnitude" },
                { "topic_name": "Statistics", "status": "modified", "old_summary": "Mean and median", "new_summary": "Mean, median and interquartile range" }
            ]
        }
    }))
    .into_response()
}

async fn compare_syllabi(multipart: Multipart) -> Response {
    let fields = read_fields(multipart).await;
    if let Some(rejection) = reject_unless_pdfs(&fields, &["old_syllabus", "new_syllabus"]) {
        return rejection;
    }

    Json(json!([
        {
            "similarity_score": 64.4,
            "ai_justification": {
                "overview": "The new syllabus keeps the algebra core but drops most of the geometry strand.",
                "key_similarities": ["Algebra strand unchanged"],
                "key_differences": ["Geometry reduced to transformations only"],
                "recommendation": "Rewrite the geometry scheme of work"
            },
            "received": echo(&fields)
        }
    ]))
    .into_response()
}
