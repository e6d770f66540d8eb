//! Axum route handler for the analysis pipeline.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::PipelineError;
use crate::models::analysis::{AnalysisOutcome, PipelineRequest};
use crate::state::AppState;

/// POST /analyze
///
/// Multipart form: `resume` (PDF file, required) and exactly one of
/// `jd_text` / `jd_url`. Unknown fields are ignored.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisOutcome>, PipelineError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut jd_text: Option<String> = None;
    let mut jd_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PipelineError::InvalidInput(format!("Failed to read multipart field: {e}"))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    PipelineError::InvalidInput(format!("Failed to read resume upload: {e}"))
                })?;
                resume = Some((filename, data));
            }
            "jd_text" | "jd_url" => {
                let value = field.text().await.map_err(|e| {
                    PipelineError::InvalidInput(format!("Failed to read {field_name}: {e}"))
                })?;
                if field_name == "jd_text" {
                    jd_text = Some(value);
                } else {
                    jd_url = Some(value);
                }
            }
            _ => {}
        }
    }

    let (resume_filename, resume_bytes) = resume
        .ok_or_else(|| PipelineError::InvalidInput("Resume PDF file is required".to_string()))?;

    info!(
        "Analyze request: resume={resume_filename} ({} bytes), jd_mode={}",
        resume_bytes.len(),
        if jd_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            "url"
        } else {
            "text"
        }
    );

    let outcome = state
        .pipeline
        .run(PipelineRequest {
            jd_text,
            jd_url,
            resume_bytes,
            resume_filename,
        })
        .await?;

    Ok(Json(outcome))
}
