// Shared prompt constants and prompt-building utilities.
// Each task defines its own instructions in enrichment::prompts.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Renders the closing instruction that names every field the reply must carry.
///
/// `fields` is `(name, description)`; the output is a bullet list so the model
/// sees exact field names and types.
pub fn reply_shape(fields: &[(&str, &str)]) -> String {
    let mut out = String::from("Return a JSON object with exactly these fields:");
    for (name, description) in fields {
        out.push_str("\n- ");
        out.push_str(name);
        out.push_str(": ");
        out.push_str(description);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_shape_lists_fields_in_order() {
        let shape = reply_shape(&[("score", "integer 0-100"), ("grade", "\"A\"-\"F\"")]);
        assert_eq!(
            shape,
            "Return a JSON object with exactly these fields:\n- score: integer 0-100\n- grade: \"A\"-\"F\""
        );
    }

    #[test]
    fn test_reply_shape_empty() {
        assert_eq!(
            reply_shape(&[]),
            "Return a JSON object with exactly these fields:"
        );
    }
}
