use thiserror::Error;

/// Failures talking to the plain-language translation service.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("no API key configured (set BYLAW_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response had no message content")]
    EmptyResponse,

    #[error("response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl TranslateError {
    /// Everything except a missing key is worth another attempt.
    pub fn is_transient(&self) -> bool {
        !matches!(self, TranslateError::MissingApiKey)
    }
}
