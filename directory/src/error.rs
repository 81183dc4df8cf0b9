use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("HTTP request to directory failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from directory: {0}")]
    InvalidResponse(String),

    #[error("directory unreachable: {0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DirectoryError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            DirectoryError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            DirectoryError::InvalidResponse(e.to_string())
        } else {
            DirectoryError::RequestFailed(e.to_string())
        }
    }
}
