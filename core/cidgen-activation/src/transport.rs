//! Network transport for signed activation envelopes.

use crate::error::{ActivationError, ActivationResult};
use crate::request::ActivationEnvelope;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the SOAP operation name.
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// Delivers an envelope to the activation service and returns the raw reply.
#[async_trait]
pub trait ActivationTransport: Send + Sync {
    /// Sends `envelope` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Transport`] on timeout, connection failure
    /// or a non-2xx status.
    async fn send(&self, envelope: &ActivationEnvelope) -> ActivationResult<String>;
}

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub endpoint: String,
    pub soap_action: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Skip TLS certificate validation for the remote host.
    pub accept_invalid_certs: bool,
}

/// SOAP-over-HTTPS transport.
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if the HTTP client can't be built.
    pub fn new(config: HttpTransportConfig) -> ActivationResult<Self> {
        if config.accept_invalid_certs {
            warn!(
                "TLS certificate validation disabled for {}; use only in development",
                config.endpoint
            );
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ActivationError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn describe(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("request timed out after {:?}", self.config.timeout)
        } else if e.is_connect() {
            format!("connection to {} failed: {e}", self.config.endpoint)
        } else {
            format!("request failed: {e}")
        }
    }
}

#[async_trait]
impl ActivationTransport for HttpTransport {
    async fn send(&self, envelope: &ActivationEnvelope) -> ActivationResult<String> {
        debug!("POST {}", self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .header(SOAP_ACTION_HEADER, &self.config.soap_action)
            .header(USER_AGENT, &self.config.user_agent)
            .body(envelope.to_soap())
            .send()
            .await
            .map_err(|e| ActivationError::Transport(self.describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActivationError::Transport(format!(
                "activation service returned HTTP {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ActivationError::Transport(self.describe(&e)))
    }
}
