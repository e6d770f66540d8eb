use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use crate::errors::PipelineError;

/// Where a job description comes from. Exactly one source per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDescriptionInput {
    /// Plain text pasted by the caller. Used as-is.
    RawText(String),
    /// A job posting page to fetch and clean.
    SourceUrl(String),
}

impl JobDescriptionInput {
    /// Builds the input from the two optional form fields.
    ///
    /// A field that is missing or whitespace-only counts as absent. Exactly one
    /// of the two must remain, otherwise the request shape is invalid.
    pub fn from_fields(
        jd_text: Option<String>,
        jd_url: Option<String>,
    ) -> Result<Self, PipelineError> {
        let jd_text = jd_text.filter(|s| !s.trim().is_empty());
        let jd_url = jd_url.filter(|s| !s.trim().is_empty());

        match (jd_text, jd_url) {
            (Some(text), None) => Ok(Self::RawText(text)),
            (None, Some(url)) => Ok(Self::SourceUrl(url.trim().to_string())),
            (Some(_), Some(_)) => Err(PipelineError::InvalidInput(
                "Provide either jd_text or jd_url, not both".to_string(),
            )),
            (None, None) => Err(PipelineError::InvalidInput(
                "Either jd_text or jd_url must be provided".to_string(),
            )),
        }
    }
}

/// Diagnostic tag naming which side of the comparison a text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOrigin {
    Jd,
    Resume,
}

impl fmt::Display for TextOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOrigin::Jd => f.write_str("jd"),
            TextOrigin::Resume => f.write_str("resume"),
        }
    }
}

/// Extracted plain text that is guaranteed to contain something other than whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    origin: TextOrigin,
    text: String,
}

impl NormalizedText {
    /// Returns `None` when `text` is empty or whitespace-only.
    pub fn new(origin: TextOrigin, text: String) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { origin, text })
        }
    }

    pub fn origin(&self) -> TextOrigin {
        self.origin
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Free-form Markdown returned by the LLM. Never parsed or modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnalysisReport(String);

impl AnalysisReport {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything one orchestration run needs. Owned by a single run.
#[derive(Debug)]
pub struct PipelineRequest {
    pub jd_text: Option<String>,
    pub jd_url: Option<String>,
    pub resume_bytes: Bytes,
    pub resume_filename: String,
}

/// Success descriptor handed back to the calling shell.
#[derive(Debug, Serialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    pub analysis: AnalysisReport,
    pub resume_filename: String,
}

impl AnalysisOutcome {
    pub fn new(analysis: AnalysisReport, resume_filename: String) -> Self {
        Self {
            success: true,
            analysis,
            resume_filename,
        }
    }
}
