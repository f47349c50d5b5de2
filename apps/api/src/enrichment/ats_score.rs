//! ATS scoring — scores plain resume text and derives the grade locally.

use serde::{Deserialize, Serialize};

use crate::enrichment::normalizer::{clamp_score, into_typed, parse_object, Grade};
use crate::enrichment::prompts::EnrichmentTask;
use crate::llm_client::{ChatCompletion, LlmError};

const TASK: &str = "ats-score";
const REQUIRED_FIELDS: &[&str] = &["score"];

/// Normalized ATS analysis. `grade` always agrees with `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsResult {
    pub score: u8,
    pub grade: Grade,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// What the provider sends back. Its own `grade` is ignored.
#[derive(Debug, Deserialize)]
struct AtsReply {
    score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

pub async fn score_ats(resume_text: &str, llm: &dyn ChatCompletion) -> Result<AtsResult, LlmError> {
    let task = EnrichmentTask::ScoreAts(resume_text);
    let raw = llm.complete(&task.messages(), &task.options()).await?;
    normalize_ats_reply(&raw)
}

/// Clamps the score into [0, 100] and overwrites the grade from it.
pub fn normalize_ats_reply(raw: &str) -> Result<AtsResult, LlmError> {
    let object = parse_object(TASK, raw, REQUIRED_FIELDS)?;
    let reply: AtsReply = into_typed(TASK, object)?;
    let score = clamp_score(reply.score);

    Ok(AtsResult {
        score,
        grade: Grade::from_score(score),
        strengths: reply.strengths,
        weaknesses: reply.weaknesses,
        recommendations: reply.recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCompletion;
    use serde_json::json;
    use std::sync::Arc;

    fn reply(score: serde_json::Value, grade: &str) -> String {
        json!({
            "score": score,
            "grade": grade,
            "strengths": ["Clear section headings"],
            "weaknesses": ["Few keywords"],
            "recommendations": ["Add a skills section"]
        })
        .to_string()
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let high = normalize_ats_reply(&reply(json!(135), "A")).unwrap();
        assert_eq!(high.score, 100);
        assert_eq!(high.grade, Grade::A);

        let low = normalize_ats_reply(&reply(json!(-20), "A")).unwrap();
        assert_eq!(low.score, 0);
        assert_eq!(low.grade, Grade::F);
    }

    #[test]
    fn test_provider_grade_is_overwritten() {
        let result = normalize_ats_reply(&reply(json!(82), "F")).unwrap();
        assert_eq!(result.score, 82);
        assert_eq!(result.grade, Grade::B);
    }

    #[test]
    fn test_boundary_scores() {
        for (score, grade) in [
            (90, Grade::A),
            (89, Grade::B),
            (80, Grade::B),
            (79, Grade::C),
            (60, Grade::D),
            (59, Grade::F),
        ] {
            let result = normalize_ats_reply(&reply(json!(score), "C")).unwrap();
            assert_eq!(result.grade, grade, "score {score}");
        }
    }

    #[test]
    fn test_fractional_score_stays_in_its_band() {
        let result = normalize_ats_reply(&reply(json!(89.6), "A")).unwrap();
        assert_eq!(result.score, 89);
        assert_eq!(result.grade, Grade::B);

        let result = normalize_ats_reply(&reply(json!(59.5), "D")).unwrap();
        assert_eq!(result.score, 59);
        assert_eq!(result.grade, Grade::F);
    }

    #[test]
    fn test_lists_are_carried_and_default_to_empty() {
        let full = normalize_ats_reply(&reply(json!(70), "C")).unwrap();
        assert_eq!(full.strengths, vec!["Clear section headings"]);
        assert_eq!(full.weaknesses, vec!["Few keywords"]);
        assert_eq!(full.recommendations, vec!["Add a skills section"]);

        let bare = normalize_ats_reply(r#"{"score": 70}"#).unwrap();
        assert!(bare.strengths.is_empty());
        assert!(bare.weaknesses.is_empty());
        assert!(bare.recommendations.is_empty());
    }

    #[test]
    fn test_missing_or_non_numeric_score_is_parse_error() {
        assert!(matches!(
            normalize_ats_reply(r#"{"grade": "A"}"#).unwrap_err(),
            LlmError::Parse(_)
        ));
        assert!(matches!(
            normalize_ats_reply(r#"{"score": "high"}"#).unwrap_err(),
            LlmError::Parse(_)
        ));
    }

    #[tokio::test]
    async fn test_score_ats_uses_task_budget() {
        let llm = FakeCompletion::replying(&reply(json!(75), "C"));

        let result = score_ats("Rust engineer", &llm).await.unwrap();

        assert_eq!(result.grade, Grade::C);
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.max_tokens, 1500);
        assert!(calls[0].0[1].content.contains("Rust engineer"));
    }

    #[tokio::test]
    async fn test_prose_reply_is_parse_error() {
        let llm = FakeCompletion::replying("Your resume looks great, I'd give it an 85.");
        let err = score_ats("resume", &llm).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_empty_reply_is_parse_error() {
        let llm = FakeCompletion::replying("");
        let err = score_ats("resume", &llm).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let llm = FakeCompletion::with(|_, _| {
            Err(LlmError::Provider {
                status: 429,
                message: "rate limited".to_string(),
            })
        });
        let err = score_ats("resume", &llm).await.unwrap_err();
        assert!(err.is_provider_error());
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_interfere() {
        // The fake echoes back the score embedded in each resume text.
        let llm = Arc::new(FakeCompletion::with(|messages, _| {
            let user = &messages[1].content;
            let start = user.find("SCORE=").map(|i| i + 6).unwrap_or(0);
            let digits: String = user[start..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            Ok(format!(r#"{{"score": {digits}, "strengths": ["{digits}"]}}"#))
        }));

        let mut set = tokio::task::JoinSet::new();
        for i in 0..32u8 {
            let llm = llm.clone();
            set.spawn(async move {
                let text = format!("Candidate {i} SCORE={}", i * 3);
                (i, score_ats(&text, llm.as_ref()).await)
            });
        }

        let mut seen = 0;
        while let Some(joined) = set.join_next().await {
            let (i, result) = joined.unwrap();
            let result = result.unwrap();
            assert_eq!(result.score, i * 3);
            assert_eq!(result.grade, Grade::from_score(i * 3));
            assert_eq!(result.strengths, vec![(i * 3).to_string()]);
            seen += 1;
        }
        assert_eq!(seen, 32);
        assert_eq!(llm.calls().len(), 32);
    }
}
