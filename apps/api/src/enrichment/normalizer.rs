//! Response Normalizer — turns raw provider text into a checked JSON object.
//!
//! Parsing is all-or-nothing: any failure becomes `LlmError::Parse` and no
//! partial object escapes. The raw text is logged here and never put into the
//! error, so it cannot reach an end user.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::llm_client::LlmError;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Letter grade derived from a clamped ATS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// First match wins: ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F.
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamps a raw provider score into [0, 100] and drops any fractional part, so the
/// grade band never moves up past the raw value.
pub fn clamp_score(raw: f64) -> u8 {
    raw.clamp(MIN_SCORE, MAX_SCORE).floor() as u8
}

/// Parses `raw` as a JSON object and checks that every `required` field is present.
pub fn parse_object(
    task: &str,
    raw: &str,
    required: &[&str],
) -> Result<Map<String, Value>, LlmError> {
    let text = strip_json_fences(raw);

    let value: Value = serde_json::from_str(text).map_err(|e| {
        warn!("{task}: provider reply is not valid JSON ({e}); raw reply: {raw:?}");
        LlmError::Parse(format!("{task} reply is not valid JSON"))
    })?;

    let Value::Object(object) = value else {
        warn!("{task}: provider reply is JSON but not an object; raw reply: {raw:?}");
        return Err(LlmError::Parse(format!("{task} reply is not a JSON object")));
    };

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        warn!(
            "{task}: provider reply is missing fields {missing:?}; raw reply: {raw:?}"
        );
        return Err(LlmError::Parse(format!(
            "{task} reply is missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(object)
}

/// Converts a checked object into a typed reply, mapping shape errors to `Parse`.
pub fn into_typed<T: serde::de::DeserializeOwned>(
    task: &str,
    object: Map<String, Value>,
) -> Result<T, LlmError> {
    serde_json::from_value(Value::Object(object)).map_err(|e| {
        warn!("{task}: provider reply has an unexpected shape: {e}");
        LlmError::Parse(format!("{task} reply has an unexpected shape"))
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
