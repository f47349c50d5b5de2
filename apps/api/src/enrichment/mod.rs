// AI enrichment: prompt building, provider call, response normalization.
// All provider calls go through llm_client::ChatCompletion.

pub mod ats_score;
pub mod certificate_verify;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod resume_improve;
