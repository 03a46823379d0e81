use cidian_types::LookupMode;

const EN_INSTRUCTION: &str = "You are an English-Chinese dictionary for Chinese-speaking learners of English. \
Analyze the meaning and grammar of the English word or phrase given below. \
Set `word` to its canonical dictionary form, give its IPA transcription, its part of speech, \
a concise English definition, the single most fitting Simplified Chinese translation, \
two or three natural example sentences each paired with a Chinese translation, \
common synonyms and antonyms, and grammar notes covering usage, collocations and common mistakes. \
Write `grammarNotes` in Simplified Chinese. \
Reply with a single JSON object only, no commentary.";

const CN_INSTRUCTION: &str = "You are a Chinese-English dictionary for Chinese-speaking learners of English. \
The input below is Chinese. Find the most natural, contemporary English word or phrase a native \
speaker would use for it, then analyze that English term. \
Set `word` to the English term (never the Chinese input), give its IPA transcription, its part of speech, \
a concise English definition, the Simplified Chinese translation that best matches the input, \
two or three natural example sentences each paired with a Chinese translation, \
common synonyms and antonyms, and grammar notes covering usage, collocations and common mistakes. \
Write `grammarNotes` in Simplified Chinese. \
Reply with a single JSON object only, no commentary.";

/// Fixed instruction template for a lookup direction
pub fn instruction(mode: LookupMode) -> &'static str {
    match mode {
        LookupMode::En => EN_INSTRUCTION,
        LookupMode::Cn => CN_INSTRUCTION,
    }
}

/// Instruction followed by the user's query
pub fn build_prompt(query: &str, mode: LookupMode) -> String {
    format!("{}\n\nInput: {}", instruction(mode), query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_use_distinct_templates() {
        assert_ne!(instruction(LookupMode::En), instruction(LookupMode::Cn));
        assert!(instruction(LookupMode::Cn).contains("input below is Chinese"));
    }

    #[test]
    fn grammar_notes_always_requested_in_chinese() {
        for mode in [LookupMode::En, LookupMode::Cn] {
            assert!(instruction(mode).contains("Write `grammarNotes` in Simplified Chinese"));
        }
    }

    #[test]
    fn query_is_appended_verbatim() {
        let prompt = build_prompt("跑步", LookupMode::Cn);
        assert!(prompt.starts_with(instruction(LookupMode::Cn)));
        assert!(prompt.ends_with("Input: 跑步"));
    }
}
