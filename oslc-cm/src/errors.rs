use crate::config::ValidationError;
use bugzilla::BugzillaError;
use http::StatusCode;
use thiserror::Error;

/// Result type alias for change management operations
pub type Result<T, E = CmError> = std::result::Result<T, E>;

/// Errors that can occur while serving change management requests
#[derive(Error, Debug)]
pub enum CmError {
    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("Failed to parse RDF payload: {0}")]
    RdfParse(String),

    #[error("Bugzilla error: {0}")]
    Bugzilla(#[from] BugzillaError),

    #[error("Failed to render view: {0}")]
    Render(#[from] askama::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CmError {
    /// Client input errors map to 4xx, everything else is a server fault.
    pub fn status(&self) -> StatusCode {
        match self {
            CmError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CmError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CmError::NotFound(_) => StatusCode::NOT_FOUND,
            CmError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            CmError::RequestBody(_)
            | CmError::RdfParse(_)
            | CmError::Bugzilla(_)
            | CmError::Render(_)
            | CmError::Config(_)
            | CmError::Internal(_)
            | CmError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CmError::UnsupportedMediaType.status(), 415);
        assert_eq!(CmError::BadRequest("empty".into()).status(), 400);
        assert_eq!(CmError::NotFound("product".into()).status(), 404);
        assert_eq!(
            CmError::Bugzilla(BugzillaError::InvalidDescription("missing summary".into())).status(),
            500
        );
        assert_eq!(CmError::RdfParse("unexpected EOF".into()).status(), 500);
    }
}
