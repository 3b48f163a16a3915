//! Shared test helpers for activation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cidgen_activation::{ActivationEnvelope, ActivationError, ActivationResult, ActivationTransport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Installation id present in the built-in fallback table.
pub const KNOWN_IID: &str = "445686086455217341503603789092033711398045546244021976753799760";

/// Fallback answer for [`KNOWN_IID`].
pub const KNOWN_CID: &str = "175663 758052 913011 026693 998296 111132 898444 598900";

/// A valid id that is not in the fallback table.
pub const UNKNOWN_IID: &str = "111111222222333333444444555555666666777777888888999";

/// Wraps an unescaped inner response document the way the service does:
/// entity-escaped inside `<ResponseXml>` in a SOAP envelope.
pub fn soap_reply(inner: &str) -> String {
    let escaped = inner
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soap:Body><BatchActivateResponse xmlns=\"http://www.microsoft.com/BatchActivationService\">\
         <BatchActivateResult><ResponseXml>{escaped}</ResponseXml></BatchActivateResult>\
         </BatchActivateResponse></soap:Body></soap:Envelope>"
    )
}

/// Inner document for a successful activation.
pub fn cid_response(cid: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-16\"?>\
         <ActivationResponse xmlns=\"http://www.microsoft.com/DRM/SL/BatchActivationResponse/1.0\">\
         <VersionNumber>2.0</VersionNumber><ResponseType>1</ResponseType>\
         <Responses><Response><PID>55041-00206-271-298329-03-1033-9600.0000-0452015</PID>\
         <CID>{cid}</CID></Response></Responses></ActivationResponse>"
    )
}

/// Inner document for a rejected activation.
pub fn error_response(code: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-16\"?>\
         <ActivationResponse xmlns=\"http://www.microsoft.com/DRM/SL/BatchActivationResponse/1.0\">\
         <VersionNumber>2.0</VersionNumber><ResponseType>1</ResponseType>\
         <Responses><Response><ErrorCode>{code}</ErrorCode></Response></Responses>\
         </ActivationResponse>"
    )
}

/// Transport that replays a fixed result and counts calls.
#[derive(Clone)]
pub struct StubTransport {
    reply: ActivationResult<String>,
    calls: Arc<AtomicUsize>,
}

impl StubTransport {
    pub fn replying(body: impl Into<String>) -> Self {
        Self {
            reply: Ok(body.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(ActivationError::Transport("connection refused".into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter; stays valid after the stub is moved into an activator.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ActivationTransport for StubTransport {
    async fn send(&self, _envelope: &ActivationEnvelope) -> ActivationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}
