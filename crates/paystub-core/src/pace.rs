//! Minimum-interval pacing for portal requests.
//!
//! Wraps any [`Transport`] with a configurable minimum elapsed time between
//! consecutive requests. The portal serves one session from one backend
//! view-state, and hammering it both risks throttling and races the JSF
//! render cycle, so every request (navigation POSTs and document GETs
//! alike) waits its turn.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use paystub_core::pace::{PaceConfig, PacedTransport};
//! use paystub_core::testutil::MockTransport;
//!
//! let inner = MockTransport::with_pages(vec!["<html></html>".into()]);
//! let paced = PacedTransport::new(inner, PaceConfig::new(Duration::from_secs(1)));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::AppError;
use crate::form::FormSnapshot;
use crate::traits::Transport;

/// Configuration for the paced transport.
#[derive(Debug, Clone)]
pub struct PaceConfig {
    /// Minimum delay between consecutive requests.
    pub min_interval: Duration,
}

impl PaceConfig {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }
}

impl Default for PaceConfig {
    /// 1 second between requests.
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
        }
    }
}

/// A [`Transport`] wrapper that enforces a minimum inter-request interval.
///
/// Tracks the dispatch time of the previous request and sleeps for the
/// remainder of the interval before releasing the next. The timestamp is
/// stamped when the request is released, whether the inner call then
/// succeeds or fails. The lock is held across the sleep: all requests to
/// the portal serialize through one clock.
#[derive(Clone)]
pub struct PacedTransport<T> {
    inner: T,
    config: PaceConfig,
    last_dispatch: Arc<Mutex<Option<Instant>>>,
}

impl<T: Transport> PacedTransport<T> {
    pub fn new(inner: T, config: PaceConfig) -> Self {
        Self {
            inner,
            config,
            last_dispatch: Arc::new(Mutex::new(None)),
        }
    }

    /// Sleep out the remainder of the interval, then stamp the clock.
    async fn wait_turn(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.config.min_interval {
                let remaining = self.config.min_interval - elapsed;
                tracing::debug!(sleep_ms = %remaining.as_millis(), "pacing request");
                tokio::time::sleep(remaining).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl<T: Transport> Transport for PacedTransport<T> {
    async fn get(&self, url: &str) -> Result<String, AppError> {
        self.wait_turn().await;
        self.inner.get(url).await
    }

    async fn post_form(&self, url: &str, form: &FormSnapshot) -> Result<String, AppError> {
        self.wait_turn().await;
        self.inner.post_form(url, form).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.wait_turn().await;
        self.inner.get_bytes(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockTransport;

    #[tokio::test]
    async fn second_request_is_delayed() {
        let inner = MockTransport::with_pages(vec!["a".into(), "b".into()]);
        let paced = PacedTransport::new(inner, PaceConfig::new(Duration::from_millis(100)));

        let start = Instant::now();
        paced.get("http://example.com/one").await.unwrap();
        paced.get("http://example.com/two").await.unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100),
            "second request should have waited out the interval, elapsed: {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn one_second_interval_spaces_dispatches() {
        let inner = MockTransport::with_pages(vec!["a".into(), "b".into()]);
        let paced = PacedTransport::new(inner.clone(), PaceConfig::default());

        let start = Instant::now();
        paced.get("http://example.com/one").await.unwrap();
        // 0.2s later, the caller tries again
        tokio::time::sleep(Duration::from_millis(200)).await;
        paced.get("http://example.com/two").await.unwrap();

        assert!(
            start.elapsed() >= Duration::from_secs(1),
            "second dispatch must start no earlier than 1.0s after the first"
        );
    }

    #[tokio::test]
    async fn failures_still_stamp_the_clock() {
        let inner = MockTransport::with_responses(vec![
            Err(AppError::HttpError("500".into())),
            Ok("recovered".into()),
        ]);
        let paced = PacedTransport::new(inner, PaceConfig::new(Duration::from_millis(100)));

        let start = Instant::now();
        paced.get("http://example.com/one").await.unwrap_err();
        paced.get("http://example.com/two").await.unwrap();

        assert!(
            start.elapsed() >= Duration::from_millis(100),
            "a failed request still counts against the interval"
        );
    }

    #[tokio::test]
    async fn passes_through_bodies_and_bytes() {
        let inner = MockTransport::with_pages(vec!["<html>hi</html>".into()]);
        inner.push_bytes(vec![0x25, 0x50, 0x44, 0x46]);
        let paced = PacedTransport::new(inner, PaceConfig::new(Duration::ZERO));

        assert_eq!(paced.get("http://example.com").await.unwrap(), "<html>hi</html>");
        assert_eq!(
            paced.get_bytes("http://example.com/doc.pdf").await.unwrap(),
            vec![0x25, 0x50, 0x44, 0x46]
        );
    }
}
