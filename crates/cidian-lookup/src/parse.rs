use cidian_types::WordDefinition;

use crate::LookupError;

/// Remove a surrounding markdown code fence (with optional language tag)
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // The tag may share its line with the payload
        body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim_start();
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Parse provider output into a complete `WordDefinition`.
///
/// All-or-nothing: malformed JSON, a missing or null required field, or a
/// blank headword all yield [`LookupError::InvalidResponse`].
pub fn parse_word_definition(text: &str) -> Result<WordDefinition, LookupError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(LookupError::InvalidResponse("empty response body".to_string()));
    }

    let definition: WordDefinition = serde_json::from_str(body)
        .map_err(|e| LookupError::InvalidResponse(format!("schema mismatch: {e}")))?;

    if definition.word.trim().is_empty() {
        return Err(LookupError::InvalidResponse("blank headword".to_string()));
    }

    Ok(definition)
}
