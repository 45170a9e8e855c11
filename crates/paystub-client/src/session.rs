//! Authenticated, cookie-backed HTTP session for the statement portal.
//!
//! The portal trusts a request only when it arrives inside a session that
//! has loaded the landing page first: that initial GET sets a session
//! cookie marking this client as the parent frame, and child-frame
//! requests made without it are rejected or mis-rendered. [`Session`]
//! performs that handshake once at construction and then exposes the
//! plain [`Transport`] operations, paced and carrying Basic credentials
//! plus the jar's current cookies on every request.

use paystub_core::config::PortalConfig;
use paystub_core::error::AppError;
use paystub_core::form::FormSnapshot;
use paystub_core::pace::{PaceConfig, PacedTransport};
use paystub_core::traits::Transport;
use reqwest::{Client, StatusCode};

/// HTTP Basic credentials for the portal's auth gateway.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Raw reqwest-backed transport: cookie jar, fixed browser User-Agent,
/// Basic credentials on every request.
///
/// The portal renders different markup to non-browser clients, so the
/// User-Agent from [`PortalConfig`] is not optional decoration.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
    timeout_secs: u64,
}

impl HttpTransport {
    pub fn new(config: &PortalConfig, credentials: Credentials) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    fn request_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, AppError> {
        let response = builder
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, url));
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, AppError> {
        let response = self.send(self.client.get(url), url).await?;
        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }

    async fn post_form(&self, url: &str, form: &FormSnapshot) -> Result<String, AppError> {
        let response = self.send(self.client.post(url).form(form), url).await?;
        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.send(self.client.get(url), url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

fn status_error(status: StatusCode, url: &str) -> AppError {
    AppError::HttpError(format!("HTTP {} for {}", status.as_u16(), url))
}

/// An authenticated portal session: paced transport plus completed
/// handshake.
#[derive(Clone)]
pub struct Session {
    transport: PacedTransport<HttpTransport>,
}

impl Session {
    /// Build the transport and perform the priming request.
    ///
    /// The landing-page GET must precede every data request; its response
    /// body is discarded, only the cookie side effect matters.
    pub async fn connect(
        config: &PortalConfig,
        credentials: Credentials,
    ) -> Result<Self, AppError> {
        let transport = PacedTransport::new(
            HttpTransport::new(config, credentials)?,
            PaceConfig::new(config.min_interval),
        );

        tracing::info!(url = %config.landing_url, "priming session");
        transport.get(config.landing_url.as_str()).await?;

        Ok(Self { transport })
    }
}

impl Transport for Session {
    async fn get(&self, url: &str) -> Result<String, AppError> {
        self.transport.get(url).await
    }

    async fn post_form(&self, url: &str, form: &FormSnapshot) -> Result<String, AppError> {
        self.transport.post_form(url, form).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.transport.get_bytes(url).await
    }
}
