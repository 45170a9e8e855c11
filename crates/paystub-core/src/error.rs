use thiserror::Error;

/// Application-wide error types for the paystub fetcher.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-2xx status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error (DNS, connect, reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// An expected element (form, frame, date text) is missing or malformed.
    ///
    /// Missing *lists* (year links, statement rows) are not errors; they
    /// extract as empty sets. A missing form or download frame is structural:
    /// the session has desynced or the portal changed its markup.
    #[error("Page structure error: {0}")]
    PageStructureError(String),

    /// Local write failed (permissions, missing directory).
    #[error("Filesystem error: {0}")]
    FilesystemError(String),
}

impl AppError {
    /// Returns true if this error originated below the page layer
    /// (the request itself failed rather than its content).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }
}
