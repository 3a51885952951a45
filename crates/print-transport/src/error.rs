use thiserror::Error;

/// Failure to retrieve an image.
///
/// A timeout is reported as [`FetchError::Transport`] like any other
/// connection-level failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("fetch task failed: {0}")]
    TaskFailed(String),

    #[error("no canned response for {0}")]
    NotFound(String),
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => FetchError::Status {
                url: response.get_url().to_string(),
                status,
            },
            ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
        }
    }
}
