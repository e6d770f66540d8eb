//! Pipeline Orchestrator — validate, resolve JD ∥ extract resume, analyze.

use std::path::Path;

use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::analysis::AnalysisEngine;
use crate::errors::PipelineError;
use crate::models::analysis::{
    AnalysisOutcome, JobDescriptionInput, NormalizedText, PipelineRequest, TextOrigin,
};
use crate::pipeline::jd_resolver::JdResolver;
use crate::pipeline::resume_extractor;

#[derive(Clone)]
pub struct Pipeline {
    resolver: JdResolver,
    engine: AnalysisEngine,
}

impl Pipeline {
    pub fn new(resolver: JdResolver, engine: AnalysisEngine) -> Self {
        Self { resolver, engine }
    }

    /// Runs one analysis end to end.
    ///
    /// Input validation happens before any network or PDF work. JD resolution and
    /// resume extraction then run concurrently; the first failure observed aborts
    /// the run and the other branch's result is discarded.
    #[instrument(
        skip_all,
        fields(run_id = %Uuid::new_v4(), resume_filename = %request.resume_filename)
    )]
    pub async fn run(&self, request: PipelineRequest) -> Result<AnalysisOutcome, PipelineError> {
        let PipelineRequest {
            jd_text,
            jd_url,
            resume_bytes,
            resume_filename,
        } = request;

        let jd_input = JobDescriptionInput::from_fields(jd_text, jd_url)?;
        validate_resume_filename(&resume_filename)?;

        let (jd, resume) = tokio::try_join!(
            self.resolver.resolve(jd_input),
            extract_resume_blocking(resume_bytes),
        )?;
        info!("Both inputs normalized, running analysis");

        let analysis = self.engine.analyze(&jd, &resume).await?;
        info!(report_chars = analysis.as_str().len(), "Analysis complete");

        Ok(AnalysisOutcome::new(analysis, resume_filename))
    }
}

/// The name must carry a `.pdf` extension, compared case-insensitively.
pub fn validate_resume_filename(filename: &str) -> Result<(), PipelineError> {
    let is_pdf = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput(
            "Resume must be a PDF file".to_string(),
        ))
    }
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_resume_blocking(pdf_bytes: Bytes) -> Result<NormalizedText, PipelineError> {
    tokio::task::spawn_blocking(move || resume_extractor::extract(&pdf_bytes))
        .await
        .map_err(|e| PipelineError::Extraction {
            origin: TextOrigin::Resume,
            message: format!("resume extraction task failed: {e}"),
        })?
}
