//! BatchActivation response parsing.
//!
//! The SOAP reply carries the real answer as an entity-escaped XML string
//! inside `<ResponseXml>`. Fields are checked in a fixed order: an
//! `<ErrorCode>` always wins, then `<CID>`, then the "activation remaining"
//! reply (`<ResponseType>2</ResponseType>`).

use crate::error::{ActivationError, ActivationResult};
use regex::Regex;
use std::sync::LazyLock;

/// Number of digits in a confirmation id.
pub const CONFIRMATION_ID_DIGITS: usize = 48;

/// Digits per display group of a formatted confirmation id.
pub const CONFIRMATION_GROUP_LEN: usize = 6;

const RESPONSE_TYPE_ACTIVATION_REMAINING: &str = "2";

static RESPONSE_XML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<ResponseXml>(.*?)</ResponseXml>").expect("static regex"));
static ERROR_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ErrorCode>(.*?)</ErrorCode>").expect("static regex"));
static CID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<CID>(.*?)</CID>").expect("static regex"));
static RESPONSE_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ResponseType>(.*?)</ResponseType>").expect("static regex"));
static ACTIVATION_REMAINING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<ActivationRemaining>(.*?)</ActivationRemaining>").expect("static regex")
});

/// What the remote service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// A confirmation id, already in display form.
    Success { confirmation_id: String },
    /// The service declined; `code` is the reported error code, or the
    /// response type for informational replies.
    RemoteError { code: String, message: String },
}

impl RemoteOutcome {
    /// Converts the outcome into the confirmation id or a
    /// [`ActivationError::RemoteRejected`].
    pub fn into_result(self) -> ActivationResult<String> {
        match self {
            Self::Success { confirmation_id } => Ok(confirmation_id),
            Self::RemoteError { code, message } => {
                Err(ActivationError::RemoteRejected { code, message })
            }
        }
    }
}

/// Maps a service error code to its human-readable message.
#[must_use]
pub fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "0x7F" => "The Multiple Activation Key has exceeded its limit",
        "0x67" => "The product key has been blocked",
        "0x68" => "Invalid product key",
        "0x86" => "Invalid key type",
        "0x8F" => "Invalid Installation ID format or unsupported product",
        "0x90" => "Please check the Installation ID and try again",
        _ => return None,
    };
    Some(message)
}

/// Decodes the five predefined XML entities.
#[must_use]
pub fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Groups a 48-digit confirmation id as `XXXXXX XXXXXX ...`.
///
/// Anything that is not exactly 48 digits once whitespace is removed is
/// returned unchanged.
#[must_use]
pub fn format_confirmation_id(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != CONFIRMATION_ID_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }

    digits
        .as_bytes()
        .chunks(CONFIRMATION_GROUP_LEN)
        .map(|group| std::str::from_utf8(group).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses a SOAP reply into a [`RemoteOutcome`].
///
/// # Errors
///
/// Returns [`ActivationError::MalformedResponse`] if the reply has no
/// `<ResponseXml>` wrapper or matches none of the known answer shapes.
pub fn parse_response(soap: &str) -> ActivationResult<RemoteOutcome> {
    let inner = capture(&RESPONSE_XML, soap).ok_or_else(|| {
        ActivationError::MalformedResponse("missing ResponseXml element".to_string())
    })?;
    let inner = unescape_xml(inner);

    if let Some(code) = capture(&ERROR_CODE, &inner) {
        let message = error_message(code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Remote activation error ({code})"));
        return Ok(RemoteOutcome::RemoteError {
            code: code.to_string(),
            message,
        });
    }

    if let Some(cid) = capture(&CID, &inner) {
        return Ok(RemoteOutcome::Success {
            confirmation_id: format_confirmation_id(cid),
        });
    }

    if capture(&RESPONSE_TYPE, &inner) == Some(RESPONSE_TYPE_ACTIVATION_REMAINING) {
        if let Some(remaining) = capture(&ACTIVATION_REMAINING, &inner) {
            return Ok(RemoteOutcome::RemoteError {
                code: RESPONSE_TYPE_ACTIVATION_REMAINING.to_string(),
                message: format!("Activation remaining: {remaining}"),
            });
        }
    }

    Err(ActivationError::MalformedResponse(
        "unrecognized response format".to_string(),
    ))
}
