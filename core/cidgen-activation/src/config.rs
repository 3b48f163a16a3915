//! Activation client configuration.
//!
//! Everything the protocol treats as a constant (endpoint, MAC key, product
//! and fallback tables) is loaded once at startup and never mutated.

use crate::catalog::{builtin_products, DEFAULT_PRODUCT_VERSION};
use crate::error::{ActivationError, ActivationResult};
use crate::fallback::builtin_fallback;
use crate::request::DEFAULT_SIGNING_KEY;
use crate::transport::HttpTransportConfig;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// BatchActivation service endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://activation.sls.microsoft.com/BatchActivation/BatchActivation.asmx";

/// SOAPAction for the `BatchActivate` operation.
pub const DEFAULT_SOAP_ACTION: &str =
    "http://www.microsoft.com/BatchActivationService/BatchActivate";

pub const DEFAULT_USER_AGENT: &str = "Microsoft Activation Client";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Activation client settings. Every field has a default, so a config file
/// only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Remote service URL.
    pub endpoint: String,
    /// Value of the `SOAPAction` header.
    pub soap_action: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Disable TLS certificate validation (development only).
    pub accept_invalid_certs: bool,
    /// Base64 of the 64-byte request MAC key.
    pub signing_key: String,
    /// Product version used for unknown tokens.
    pub default_product: String,
    /// Product version → extended product id.
    pub products: BTreeMap<String, String>,
    /// Installation id → confirmation id answers used when the service fails.
    pub fallback: BTreeMap<String, String>,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            soap_action: DEFAULT_SOAP_ACTION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
            signing_key: BASE64.encode(DEFAULT_SIGNING_KEY),
            default_product: DEFAULT_PRODUCT_VERSION.to_string(),
            products: builtin_products(),
            fallback: builtin_fallback(),
        }
    }
}

impl ActivationConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if the document is not valid TOML
    /// or has fields of the wrong type.
    pub fn from_toml_str(text: &str) -> ActivationResult<Self> {
        toml::from_str(text).map_err(|e| ActivationError::Config(format!("invalid TOML: {e}")))
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if the file can't be read or parsed.
    pub fn load(path: &Path) -> ActivationResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ActivationError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Transport settings derived from this config.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] for a zero timeout or empty endpoint.
    pub fn transport_config(&self) -> ActivationResult<HttpTransportConfig> {
        if self.timeout_secs == 0 {
            return Err(ActivationError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ActivationError::Config("endpoint must not be empty".to_string()));
        }

        Ok(HttpTransportConfig {
            endpoint: self.endpoint.clone(),
            soap_action: self.soap_action.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout(),
            accept_invalid_certs: self.accept_invalid_certs,
        })
    }
}
