use thiserror::Error;

pub type Result<T> = std::result::Result<T, VkError>;

/// VK error code for "Too many requests per second".
pub const RATE_LIMIT_ERROR_CODE: i64 = 6;

#[derive(Debug, Error)]
pub enum VkError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl VkError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, VkError::Network(_) | VkError::RateLimited(_))
    }

    pub(crate) fn from_api(code: i64, message: String) -> Self {
        if code == RATE_LIMIT_ERROR_CODE {
            VkError::RateLimited(message)
        } else {
            VkError::Api { code, message }
        }
    }
}

impl From<reqwest::Error> for VkError {
    fn from(err: reqwest::Error) -> Self {
        VkError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for VkError {
    fn from(err: serde_json::Error) -> Self {
        VkError::Parse(err.to_string())
    }
}
