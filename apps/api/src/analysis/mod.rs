//! Analysis Engine — turns a normalized JD and resume into a skill-gap report.
//!
//! Builds the fixed prompt, makes exactly one LLM request, and returns the
//! response text untouched as an [`AnalysisReport`].

pub mod prompts;

use std::sync::Arc;

use tracing::info;

use crate::analysis::prompts::{GAP_ANALYSIS_PROMPT_TEMPLATE, JD_PLACEHOLDER, RESUME_PLACEHOLDER};
use crate::errors::PipelineError;
use crate::llm_client::LlmBackend;
use crate::models::analysis::{AnalysisReport, NormalizedText};

#[derive(Clone)]
pub struct AnalysisEngine {
    backend: Arc<dyn LlmBackend>,
    api_key: Option<String>,
}

impl AnalysisEngine {
    pub fn new(backend: Arc<dyn LlmBackend>, api_key: Option<String>) -> Self {
        Self { backend, api_key }
    }

    pub async fn analyze(
        &self,
        jd: &NormalizedText,
        resume: &NormalizedText,
    ) -> Result<AnalysisReport, PipelineError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                PipelineError::Configuration("GEMINI_API_KEY not found in environment".to_string())
            })?;

        let prompt = build_prompt(jd.as_str(), resume.as_str());
        info!(
            model = self.backend.model(),
            prompt_chars = prompt.len(),
            "Requesting gap analysis ({}: {} chars, {}: {} chars)",
            jd.origin(),
            jd.as_str().len(),
            resume.origin(),
            resume.as_str().len()
        );

        let text = self
            .backend
            .generate(api_key, &prompt)
            .await
            .map_err(|e| PipelineError::Upstream(format!("Gap analysis request failed: {e}")))?;

        if text.trim().is_empty() {
            return Err(PipelineError::Upstream(
                "LLM returned an empty response".to_string(),
            ));
        }

        Ok(AnalysisReport::new(text))
    }
}

/// Substitutes both texts verbatim into the template in a single pass, so
/// placeholder-like sequences inside either text are never re-expanded.
pub fn build_prompt(jd_text: &str, resume_text: &str) -> String {
    let (head, rest) = GAP_ANALYSIS_PROMPT_TEMPLATE
        .split_once(JD_PLACEHOLDER)
        .unwrap_or((GAP_ANALYSIS_PROMPT_TEMPLATE, ""));
    let (middle, tail) = rest.split_once(RESUME_PLACEHOLDER).unwrap_or((rest, ""));

    let mut prompt =
        String::with_capacity(GAP_ANALYSIS_PROMPT_TEMPLATE.len() + jd_text.len() + resume_text.len());
    prompt.push_str(head);
    prompt.push_str(jd_text);
    prompt.push_str(middle);
    prompt.push_str(resume_text);
    prompt.push_str(tail);
    prompt
}
