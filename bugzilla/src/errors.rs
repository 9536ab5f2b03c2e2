use thiserror::Error;

/// Errors returned by a [`crate::BugzillaConnector`].
#[derive(Error, Debug)]
pub enum BugzillaError {
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bugzilla answered with status {0}")]
    UnexpectedStatus(u16),

    #[error("Bugzilla fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Invalid response from Bugzilla: {0}")]
    InvalidResponse(String),

    #[error("Invalid bug description: {0}")]
    InvalidDescription(String),

    #[error("Invalid Bugzilla URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<serde_json::Error> for BugzillaError {
    fn from(e: serde_json::Error) -> Self {
        BugzillaError::InvalidResponse(e.to_string())
    }
}
