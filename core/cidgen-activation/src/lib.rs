//! BatchActivation protocol client for confirmation id issuance.
//!
//! This crate handles:
//! - Installation id normalization and validation
//! - Product version → extended product id lookup
//! - Request signing (HMAC-SHA-256 over the UTF-16LE request document)
//! - SOAP transport with a bounded timeout
//! - Response parsing and error-code mapping
//! - A static fallback table used when the service is unreachable
//!
//! # Pipeline
//!
//! ```text
//! normalize → catalog → sign → send → parse ─┬─ Ok(confirmation id)
//!                                 (failure) └─ fallback cache → Ok / original error
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cidgen_activation::{ActivationConfig, Activator};
//!
//! # async fn run() -> cidgen_activation::ActivationResult<()> {
//! let activator = Activator::from_config(&ActivationConfig::default())?;
//! let cid = activator
//!     .generate_confirmation_id("445686-086455-217341-...", "windows11")
//!     .await?;
//! println!("{cid}");
//! # Ok(())
//! # }
//! ```

mod activator;
mod catalog;
mod config;
mod error;
mod fallback;
mod identifier;
mod request;
mod response;
mod transport;

pub use activator::Activator;
pub use catalog::{builtin_products, ProductCatalog, ProductDescriptor, DEFAULT_PRODUCT_VERSION};
pub use config::{
    ActivationConfig, DEFAULT_ENDPOINT, DEFAULT_SOAP_ACTION, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
pub use error::{ActivationError, ActivationResult};
pub use fallback::{builtin_fallback, FallbackCache};
pub use identifier::{InstallationId, MIN_INSTALLATION_ID_DIGITS};
pub use request::{
    activation_request_xml, utf16le_bytes, ActivationEnvelope, SigningKey, DEFAULT_SIGNING_KEY,
    SIGNING_KEY_LEN,
};
pub use response::{
    error_message, format_confirmation_id, parse_response, unescape_xml, RemoteOutcome,
    CONFIRMATION_ID_DIGITS,
};
pub use transport::{ActivationTransport, HttpTransport, HttpTransportConfig, SOAP_ACTION_HEADER};
