//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::form::FormSnapshot;
use crate::traits::{StatementStore, Transport};

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// One request observed by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    Get(String),
    PostForm {
        url: String,
        fields: Vec<(String, String)>,
    },
    GetBytes(String),
}

/// Mock transport serving queued page/byte responses.
///
/// `get` and `post_form` both pop from the same page queue, mirroring the
/// portal where every navigation request returns the next rendered view.
/// An exhausted queue is a test bug and fails loudly as an HTTP error.
#[derive(Clone, Default)]
pub struct MockTransport {
    pages: Arc<Mutex<Vec<Result<String, AppError>>>>,
    bytes: Arc<Mutex<Vec<Result<Vec<u8>, AppError>>>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Queue of successful page bodies, served in order.
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self::with_responses(pages.into_iter().map(Ok).collect())
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(responses)),
            bytes: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a page body to the queue.
    pub fn push_page(&self, body: impl Into<String>) {
        self.pages.lock().unwrap().push(Ok(body.into()));
    }

    /// Append a byte payload for the next `get_bytes` call.
    pub fn push_bytes(&self, payload: Vec<u8>) {
        self.bytes.lock().unwrap().push(Ok(payload));
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_page(&self) -> Result<String, AppError> {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            Err(AppError::HttpError("mock page queue exhausted".into()))
        } else {
            pages.remove(0)
        }
    }
}

impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<String, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::Get(url.to_string()));
        self.next_page()
    }

    async fn post_form(&self, url: &str, form: &FormSnapshot) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(RecordedRequest::PostForm {
            url: url.to_string(),
            fields: form
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        });
        self.next_page()
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::GetBytes(url.to_string()));
        let mut bytes = self.bytes.lock().unwrap();
        if bytes.is_empty() {
            Err(AppError::HttpError("mock byte queue exhausted".into()))
        } else {
            bytes.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory statement store recording write order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    /// Filenames in the order they were written this run.
    pub writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store pre-seeded with "already downloaded" files.
    pub fn with_existing(file_names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut files = store.files.lock().unwrap();
            for name in file_names {
                files.insert(name.to_string(), Vec::new());
            }
        }
        store
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn write_order(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl StatementStore for MemoryStore {
    fn contains(&self, file_name: &str) -> bool {
        self.files.lock().unwrap().contains_key(file_name)
    }

    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        self.files
            .lock()
            .unwrap()
            .insert(file_name.to_string(), bytes.to_vec());
        self.writes.lock().unwrap().push(file_name.to_string());
        Ok(PathBuf::from(file_name))
    }
}
