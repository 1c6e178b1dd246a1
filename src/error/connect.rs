//! Errors talking to the Connect web service.

/// Session, sign-in and track-list errors.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Network-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server sent something that is not the JSON we expected.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The sign-in endpoint rejected the credentials.
    #[error("sign-in failed: {0}")]
    Auth(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the cookie jar file could not be read.
    #[error("cookie jar line {line}: {reason}")]
    CookieJar { line: usize, reason: String },

    #[error("invalid header: {0}")]
    BadHeader(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("too many redirects, last location {0}")]
    TooManyRedirects(String),
}

impl ConnectError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ConnectError::Auth(_))
    }
}
