// Ingestion-and-analysis pipeline.
// JD Resolver and Resume Extractor are independent; the orchestrator joins them
// before the single LLM call. All LLM calls go through llm_client.

pub mod handlers;
pub mod jd_resolver;
pub mod orchestrator;
pub mod resume_extractor;

pub use orchestrator::Pipeline;
