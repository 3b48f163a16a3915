//! Confirmation id generation: normalize, sign, send, parse, fall back.

use crate::catalog::ProductCatalog;
use crate::config::ActivationConfig;
use crate::error::{ActivationError, ActivationResult};
use crate::fallback::FallbackCache;
use crate::identifier::InstallationId;
use crate::request::{ActivationEnvelope, SigningKey};
use crate::response::parse_response;
use crate::transport::{ActivationTransport, HttpTransport};
use tracing::{debug, info, warn};

/// Issues confirmation ids against the activation service.
///
/// All tables are immutable after construction, so one activator can be
/// shared by any number of concurrent requests.
pub struct Activator {
    catalog: ProductCatalog,
    fallback: FallbackCache,
    signing_key: SigningKey,
    transport: Box<dyn ActivationTransport>,
}

impl Activator {
    /// Assembles an activator from already-validated parts.
    pub fn new(
        catalog: ProductCatalog,
        fallback: FallbackCache,
        signing_key: SigningKey,
        transport: impl ActivationTransport + 'static,
    ) -> Self {
        Self {
            catalog,
            fallback,
            signing_key,
            transport: Box::new(transport),
        }
    }

    /// Validates `config` and builds an activator using [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if any part of the config is invalid.
    pub fn from_config(config: &ActivationConfig) -> ActivationResult<Self> {
        let transport = HttpTransport::new(config.transport_config()?)?;
        Self::from_config_with_transport(config, transport)
    }

    /// Validates `config` but sends through the given transport.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if any part of the config is invalid.
    pub fn from_config_with_transport(
        config: &ActivationConfig,
        transport: impl ActivationTransport + 'static,
    ) -> ActivationResult<Self> {
        let catalog = ProductCatalog::new(config.products.clone(), &config.default_product)?;
        let signing_key = SigningKey::from_base64(&config.signing_key)?;
        let fallback = FallbackCache::from_entries(config.fallback.clone())?;
        Ok(Self::new(catalog, fallback, signing_key, transport))
    }

    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn fallback(&self) -> &FallbackCache {
        &self.fallback
    }

    /// Builds the signed envelope for an already-normalized id.
    #[must_use]
    pub fn envelope(&self, installation_id: &InstallationId, product_version: &str) -> ActivationEnvelope {
        let product = self.catalog.resolve(product_version);
        ActivationEnvelope::build(installation_id, product, &self.signing_key)
    }

    /// Returns the confirmation id for `installation_id`.
    ///
    /// Makes a single call to the service. If the call or the reply fails
    /// and the fallback cache knows the id, the cached answer is returned.
    ///
    /// # Errors
    ///
    /// - [`ActivationError::InvalidIdentifier`] before any network traffic.
    /// - [`ActivationError::Transport`], [`ActivationError::MalformedResponse`]
    ///   or [`ActivationError::RemoteRejected`] when the service fails and
    ///   the fallback cache has no entry.
    pub async fn generate_confirmation_id(
        &self,
        installation_id: &str,
        product_version: &str,
    ) -> ActivationResult<String> {
        let installation_id = InstallationId::normalize(installation_id)?;
        let envelope = self.envelope(&installation_id, product_version);
        debug!(
            "Activation request for {} ({}, PID {})",
            installation_id.redacted(),
            product_version,
            envelope.product()
        );

        match self.request(&envelope).await {
            Ok(confirmation_id) => {
                info!("Confirmation id received for {}", installation_id.redacted());
                Ok(confirmation_id)
            }
            Err(err) => self.recover(&installation_id, err),
        }
    }

    async fn request(&self, envelope: &ActivationEnvelope) -> ActivationResult<String> {
        let body = self.transport.send(envelope).await?;
        parse_response(&body)?.into_result()
    }

    fn recover(
        &self,
        installation_id: &InstallationId,
        err: ActivationError,
    ) -> ActivationResult<String> {
        warn!("Activation failed for {}: {}", installation_id.redacted(), err);

        if !err.is_fallback_eligible() {
            return Err(err);
        }

        match self.fallback.lookup(installation_id) {
            Some(cached) => {
                info!("Using fallback confirmation id for {}", installation_id.redacted());
                Ok(cached.to_string())
            }
            None => Err(err),
        }
    }
}
