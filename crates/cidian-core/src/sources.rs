use cidian_types::ExternalSource;

/// Dictionary sites offered as outbound links for the displayed word
pub const EXTERNAL_SOURCES: [ExternalSource; 5] = [
    ExternalSource {
        name: "Cambridge",
        url_prefix: "https://dictionary.cambridge.org/dictionary/english-chinese-simplified/",
        icon: "book",
    },
    ExternalSource {
        name: "Merriam-Webster",
        url_prefix: "https://www.merriam-webster.com/dictionary/",
        icon: "library",
    },
    ExternalSource {
        name: "Oxford Learner's",
        url_prefix: "https://www.oxfordlearnersdictionaries.com/definition/english/",
        icon: "graduation-cap",
    },
    ExternalSource {
        name: "Collins",
        url_prefix: "https://www.collinsdictionary.com/dictionary/english/",
        icon: "book-open",
    },
    ExternalSource {
        name: "Youdao",
        url_prefix: "https://dict.youdao.com/result?lang=en&word=",
        icon: "languages",
    },
];

/// Build the link for `word` on `source`
pub fn link_for(source: &ExternalSource, word: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(word.trim().as_bytes()).collect();
    // form encoding turns spaces into '+', which path-based sites read literally
    format!("{}{}", source.url_prefix, encoded.replace('+', "%20"))
}

/// `(name, url)` pairs for every known source
pub fn links_for(word: &str) -> Vec<(String, String)> {
    EXTERNAL_SOURCES
        .iter()
        .map(|source| (source.name.to_string(), link_for(source, word)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_sources_with_https_prefixes() {
        assert_eq!(EXTERNAL_SOURCES.len(), 5);
        assert!(EXTERNAL_SOURCES.iter().all(|s| s.url_prefix.starts_with("https://")));
    }

    #[test]
    fn plain_word_is_appended() {
        let link = link_for(&EXTERNAL_SOURCES[1], "run");
        assert_eq!(link, "https://www.merriam-webster.com/dictionary/run");
    }

    #[test]
    fn phrases_and_non_ascii_are_encoded() {
        let links = links_for(" look up ");
        assert_eq!(
            links[1].1,
            "https://www.merriam-webster.com/dictionary/look%20up"
        );

        let youdao = link_for(&EXTERNAL_SOURCES[4], "跑");
        assert_eq!(youdao, "https://dict.youdao.com/result?lang=en&word=%E8%B7%91");
    }
}
