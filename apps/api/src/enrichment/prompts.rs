//! Prompt Builder — deterministic system + user message pairs for each enrichment task.

use serde_json::{Map, Value};

use crate::llm_client::prompts::{reply_shape, JSON_ONLY_SYSTEM};
use crate::llm_client::{ChatMessage, CompletionOptions};

/// System prompt for resume improvement. Truthfulness over flourish.
pub const RESUME_IMPROVE_SYSTEM: &str = "You are an expert resume writer and career coach. \
Your task is to improve resume content while maintaining professionalism and truthfulness. Focus on:
- Making language more impactful and concise
- Using strong action verbs
- Quantifying achievements where the original content supports it
- Ensuring consistent formatting and tone
- Highlighting key skills and accomplishments
Do not add false information or exaggerate claims.";

/// System prompt for ATS scoring. Keyword and format heuristics.
pub const ATS_SCORE_SYSTEM: &str = "You are an ATS (Applicant Tracking System) expert. \
Your task is to analyze resume content and provide an ATS compatibility score along with \
specific recommendations for improvement. Consider:
- Keyword optimization
- Format and structure
- File type compatibility
- Content relevance
- Industry-specific terminology
Return a score from 0-100 and detailed feedback.";

/// System prompt for certificate verification. Authenticity heuristics.
pub const CERTIFICATE_VERIFY_SYSTEM: &str = "You are an expert document analyzer specializing \
in certificate verification. Your task is to analyze certificate documents and determine their \
authenticity and validity. Consider:
- Document format and structure
- Issuer credibility
- Date validity
- Content consistency
- Security features (if mentioned)
Return a verification status and confidence score.";

const RESUME_IMPROVE_TEMPERATURE: f32 = 0.3;
const RESUME_IMPROVE_MAX_TOKENS: u32 = 2000;
const ATS_SCORE_TEMPERATURE: f32 = 0.2;
const ATS_SCORE_MAX_TOKENS: u32 = 1500;
const CERTIFICATE_VERIFY_TEMPERATURE: f32 = 0.1;
const CERTIFICATE_VERIFY_MAX_TOKENS: u32 = 1000;

const ATS_REPLY_FIELDS: &[(&str, &str)] = &[
    ("score", "integer between 0 and 100"),
    ("grade", "one of \"A\", \"B\", \"C\", \"D\", \"F\""),
    ("strengths", "array of strings describing positive aspects"),
    ("weaknesses", "array of strings describing areas for improvement"),
    (
        "recommendations",
        "array of strings with specific actionable suggestions",
    ),
];

const CERTIFICATE_REPLY_FIELDS: &[(&str, &str)] = &[
    ("status", "one of \"verified\", \"suspicious\", \"invalid\""),
    ("confidence", "number between 0 and 100"),
    ("reasoning", "string with a brief explanation"),
    (
        "recommendations",
        "string with any suggestions for further verification",
    ),
];

/// One enrichment task and the payload it carries.
#[derive(Debug, Clone, Copy)]
pub enum EnrichmentTask<'a> {
    ImproveResume(&'a Map<String, Value>),
    ScoreAts(&'a str),
    VerifyCertificate(&'a str),
}

impl EnrichmentTask<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            EnrichmentTask::ImproveResume(_) => "resume-improve",
            EnrichmentTask::ScoreAts(_) => "ats-score",
            EnrichmentTask::VerifyCertificate(_) => "certificate-verify",
        }
    }

    /// Exactly two messages: the task's system instructions, then the user payload.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(self.user_prompt()),
        ]
    }

    /// Lower temperatures for tasks that should read as consistent judgments.
    pub fn options(&self) -> CompletionOptions {
        match self {
            EnrichmentTask::ImproveResume(_) => {
                CompletionOptions::new(RESUME_IMPROVE_TEMPERATURE, RESUME_IMPROVE_MAX_TOKENS)
            }
            EnrichmentTask::ScoreAts(_) => {
                CompletionOptions::new(ATS_SCORE_TEMPERATURE, ATS_SCORE_MAX_TOKENS)
            }
            EnrichmentTask::VerifyCertificate(_) => CompletionOptions::new(
                CERTIFICATE_VERIFY_TEMPERATURE,
                CERTIFICATE_VERIFY_MAX_TOKENS,
            ),
        }
    }

    fn system_prompt(&self) -> String {
        let instructions = match self {
            EnrichmentTask::ImproveResume(_) => RESUME_IMPROVE_SYSTEM,
            EnrichmentTask::ScoreAts(_) => ATS_SCORE_SYSTEM,
            EnrichmentTask::VerifyCertificate(_) => CERTIFICATE_VERIFY_SYSTEM,
        };
        format!("{instructions}\n\n{JSON_ONLY_SYSTEM}")
    }

    fn user_prompt(&self) -> String {
        match self {
            EnrichmentTask::ImproveResume(resume) => {
                let rendered = serde_json::to_string_pretty(resume).unwrap_or_default();
                let fields: Vec<(&str, &str)> = resume
                    .keys()
                    .map(|k| (k.as_str(), "same type and structure as in the input"))
                    .collect();
                format!(
                    "Please improve the following resume content. Make it more professional \
                     and impactful while keeping it truthful:\n\n{rendered}\n\n\
                     Return the improved version in the same JSON structure. {}",
                    reply_shape(&fields)
                )
            }
            EnrichmentTask::ScoreAts(resume_text) => format!(
                "Please analyze this resume for ATS compatibility and provide a score with \
                 recommendations:\n\n{resume_text}\n\n{}",
                reply_shape(ATS_REPLY_FIELDS)
            ),
            EnrichmentTask::VerifyCertificate(document_text) => format!(
                "Please analyze this certificate document and determine its authenticity:\
                 \n\n{document_text}\n\n{}",
                reply_shape(CERTIFICATE_REPLY_FIELDS)
            ),
        }
    }
}
