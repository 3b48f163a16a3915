//! Activation request encoding and signing.
//!
//! The service authenticates requests with an HMAC-SHA-256 over the
//! UTF-16LE bytes of the inner `ActivationRequest` document. Both the
//! digest and the document travel base64-encoded inside a SOAP envelope:
//!
//! ```text
//! BatchActivate/request
//!   Digest      = base64(hmac_sha256(key, utf16le(doc)))
//!   RequestXml  = base64(utf16le(doc))
//! ```

use crate::catalog::ProductDescriptor;
use crate::error::{ActivationError, ActivationResult};
use crate::identifier::InstallationId;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::digest::generic_array::GenericArray;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Length of the service's MAC key in bytes.
pub const SIGNING_KEY_LEN: usize = 64;

/// The publicly known BatchActivation MAC key: 32 bytes followed by zero padding.
pub const DEFAULT_SIGNING_KEY: [u8; SIGNING_KEY_LEN] = [
    254, 49, 152, 117, 251, 72, 132, 134, 156, 243, 241, 206, 153, 168, 144, 100, 171, 87, 31,
    202, 71, 4, 80, 88, 48, 36, 226, 20, 98, 135, 121, 160, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Namespace of the inner activation request document.
pub const ACTIVATION_REQUEST_NS: &str = "http://www.microsoft.com/DRM/SL/BatchActivationRequest/1.0";

/// Namespace of the `BatchActivate` SOAP operation.
pub const BATCH_ACTIVATION_SERVICE_NS: &str = "http://www.microsoft.com/BatchActivationService";

const PROTOCOL_VERSION: &str = "2.0";
const REQUEST_TYPE: &str = "1";

/// HMAC key used to sign activation requests.
///
/// Holds a keyed MAC state so signing never fails once constructed.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
}

impl SigningKey {
    /// Creates a signing key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if the MAC rejects the key.
    pub fn from_bytes(key: &[u8]) -> ActivationResult<Self> {
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|e| ActivationError::Config(format!("invalid signing key: {e}")))?;
        Ok(Self { mac })
    }

    /// Decodes a base64 key and checks it is exactly [`SIGNING_KEY_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] on bad base64 or wrong length.
    pub fn from_base64(encoded: &str) -> ActivationResult<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| ActivationError::Config(format!("invalid signing key base64: {e}")))?;
        if bytes.len() != SIGNING_KEY_LEN {
            return Err(ActivationError::Config(format!(
                "signing key must be {SIGNING_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_bytes(&bytes)
    }

    /// Returns the raw HMAC-SHA-256 tag over `data`.
    #[must_use]
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(data);
        let mut tag = [0u8; 32];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        tag
    }

    /// Returns the base64-encoded HMAC-SHA-256 tag over `data`.
    #[must_use]
    pub fn sign_base64(&self, data: &[u8]) -> String {
        BASE64.encode(self.sign(data))
    }
}

impl Default for SigningKey {
    fn default() -> Self {
        Self {
            mac: HmacSha256::new(GenericArray::from_slice(&DEFAULT_SIGNING_KEY)),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Renders the inner `ActivationRequest` document.
///
/// The exact bytes are signed, so whitespace here is part of the protocol.
#[must_use]
pub fn activation_request_xml(installation_id: &InstallationId, pid: &ProductDescriptor) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-16\"?>\n\
         <ActivationRequest xmlns=\"{ACTIVATION_REQUEST_NS}\">\n\
         \x20 <VersionNumber>{PROTOCOL_VERSION}</VersionNumber>\n\
         \x20 <RequestType>{REQUEST_TYPE}</RequestType>\n\
         \x20 <Requests>\n\
         \x20   <Request>\n\
         \x20     <PID>{pid}</PID>\n\
         \x20     <IID>{iid}</IID>\n\
         \x20   </Request>\n\
         \x20 </Requests>\n\
         </ActivationRequest>",
        pid = pid.as_str(),
        iid = installation_id.as_str(),
    )
}

/// Encodes text as UTF-16LE without a byte-order mark.
#[must_use]
pub fn utf16le_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// A signed activation request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEnvelope {
    installation_id: InstallationId,
    product: ProductDescriptor,
    digest: String,
    payload: String,
}

impl ActivationEnvelope {
    /// Builds and signs the request for `installation_id` / `product`.
    #[must_use]
    pub fn build(
        installation_id: &InstallationId,
        product: &ProductDescriptor,
        key: &SigningKey,
    ) -> Self {
        let document = utf16le_bytes(&activation_request_xml(installation_id, product));
        Self {
            installation_id: installation_id.clone(),
            product: product.clone(),
            digest: key.sign_base64(&document),
            payload: BASE64.encode(&document),
        }
    }

    #[must_use]
    pub fn installation_id(&self) -> &InstallationId {
        &self.installation_id
    }

    #[must_use]
    pub fn product(&self) -> &ProductDescriptor {
        &self.product
    }

    /// Base64 HMAC-SHA-256 digest of the encoded request document.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Base64 of the UTF-16LE request document.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Renders the outer SOAP 1.1 envelope posted to the service.
    #[must_use]
    pub fn to_soap(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\" \n\
             \x20              xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \n\
             \x20              xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\">\n\
             \x20 <soap:Body>\n\
             \x20   <BatchActivate xmlns=\"{BATCH_ACTIVATION_SERVICE_NS}\">\n\
             \x20     <request>\n\
             \x20       <Digest>{digest}</Digest>\n\
             \x20       <RequestXml>{payload}</RequestXml>\n\
             \x20     </request>\n\
             \x20   </BatchActivate>\n\
             \x20 </soap:Body>\n\
             </soap:Envelope>",
            digest = self.digest,
            payload = self.payload,
        )
    }
}
