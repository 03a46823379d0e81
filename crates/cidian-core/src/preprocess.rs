use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    /// Default query cleanup: trim, NFKC (folds full-width Latin typed through
    /// a Chinese IME), collapse whitespace runs and line breaks to one space.
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        let text: String = text.nfkc().collect();

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
