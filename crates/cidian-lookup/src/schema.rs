use serde_json::{Value, json};

/// Fields the provider must always return
pub const REQUIRED_FIELDS: [&str; 7] = [
    "word",
    "phonetic",
    "partOfSpeech",
    "definition",
    "chineseTranslation",
    "examples",
    "grammarNotes",
];

/// Response schema for a `WordDefinition`, in the provider's OpenAPI subset
pub fn word_definition_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING", "description": "Canonical English headword or phrase" },
            "phonetic": { "type": "STRING", "description": "IPA transcription" },
            "partOfSpeech": { "type": "STRING" },
            "definition": { "type": "STRING", "description": "English definition" },
            "chineseTranslation": { "type": "STRING" },
            "examples": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "en": { "type": "STRING" },
                        "cn": { "type": "STRING" }
                    },
                    "required": ["en", "cn"]
                }
            },
            "synonyms": { "type": "ARRAY", "items": { "type": "STRING" } },
            "antonyms": { "type": "ARRAY", "items": { "type": "STRING" } },
            "grammarNotes": { "type": "STRING", "description": "Usage notes in Simplified Chinese" }
        },
        "required": REQUIRED_FIELDS,
        "propertyOrdering": [
            "word", "phonetic", "partOfSpeech", "definition", "chineseTranslation",
            "examples", "synonyms", "antonyms", "grammarNotes"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_and_antonyms_are_optional() {
        let schema = word_definition_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();

        assert_eq!(required, REQUIRED_FIELDS);
        assert!(!required.contains(&"synonyms"));
        assert!(schema["properties"]["antonyms"].is_object());
    }
}
