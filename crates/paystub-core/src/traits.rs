use std::future::Future;
use std::path::PathBuf;

use crate::error::AppError;
use crate::form::FormSnapshot;

/// Issues HTTP requests within one authenticated, cookie-backed session.
///
/// Every operation shares the session's cookie jar and pacing clock, so a
/// single transport value must never drive two navigation cycles at once;
/// the server's notion of "current form state" is tied to one session.
pub trait Transport: Send + Sync + Clone {
    /// GET a page and return its body as text.
    fn get(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    /// POST a URL-encoded form snapshot and return the response body.
    fn post_form(
        &self,
        url: &str,
        form: &FormSnapshot,
    ) -> impl Future<Output = Result<String, AppError>> + Send;

    /// GET a document's raw bytes.
    fn get_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AppError>> + Send;
}

/// Persists downloaded statements, keyed by filename.
///
/// Existence of a file is the dedup signal: the navigator consults
/// [`contains`](StatementStore::contains) before issuing any request for an
/// entry, and files are never rewritten once present within a run.
pub trait StatementStore: Send + Sync + Clone {
    fn contains(&self, file_name: &str) -> bool;

    /// Write the bytes, creating/truncating the file. Returns the full path.
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError>;
}
