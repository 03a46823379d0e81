use cidian_types::{LookupMode, WordDefinition};

pub mod fixture;
pub mod gemini;
pub mod parse;
pub mod prompt;
pub mod schema;

pub use fixture::FixtureLookupClient;
pub use gemini::GeminiClient;

/// Structured word lookup against a generative-language provider
#[async_trait::async_trait]
pub trait LookupClient: Send + Sync {
    /// Analyze `query` under `mode`. Blank queries fail with
    /// [`LookupError::EmptyQuery`] without reaching the provider.
    async fn lookup(&self, query: &str, mode: LookupMode) -> Result<WordDefinition, LookupError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,
}

impl LookupError {
    /// Transport or service-level failure, as opposed to an unusable payload
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            LookupError::RequestFailed(_)
                | LookupError::RateLimitExceeded
                | LookupError::AuthenticationError
        )
    }

    /// Text shown to the user; details stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            LookupError::EmptyQuery => "Type a word or phrase first.".to_string(),
            LookupError::InvalidResponse(_) => {
                "Couldn't understand the dictionary response, try a different query.".to_string()
            }
            LookupError::RequestFailed(_) => {
                "The dictionary service could not be reached, try again.".to_string()
            }
            LookupError::RateLimitExceeded => {
                "Too many requests, wait a moment and try again.".to_string()
            }
            LookupError::AuthenticationError => {
                "The API key was rejected or is missing (set GEMINI_API_KEY).".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::RequestFailed(format!("timeout: {e}"))
        } else if e.is_decode() {
            LookupError::InvalidResponse(e.to_string())
        } else {
            LookupError::RequestFailed(e.to_string())
        }
    }
}

/// Trimmed query, or [`LookupError::EmptyQuery`]
pub fn require_query(query: &str) -> Result<&str, LookupError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(LookupError::EmptyQuery);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_are_rejected() {
        assert!(matches!(require_query(""), Err(LookupError::EmptyQuery)));
        assert!(matches!(require_query(" \t\n"), Err(LookupError::EmptyQuery)));
        assert_eq!(require_query("  run ").unwrap(), "run");
    }

    #[test]
    fn failure_families() {
        assert!(LookupError::RateLimitExceeded.is_request_failure());
        assert!(LookupError::RequestFailed("x".into()).is_request_failure());
        assert!(!LookupError::InvalidResponse("x".into()).is_request_failure());
        assert!(
            LookupError::InvalidResponse("x".into())
                .user_message()
                .contains("different query")
        );
    }
}
