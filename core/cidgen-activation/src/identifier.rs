//! Installation id normalization.
//!
//! Callers paste installation ids in whatever grouping the activation
//! wizard displayed (`123456-789012-...` or space separated). The protocol
//! wants the bare digit string.

use crate::error::{ActivationError, ActivationResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Minimum number of digits in a normalized installation id.
pub const MIN_INSTALLATION_ID_DIGITS: usize = 45;

/// A normalized installation id: ASCII digits only, at least
/// [`MIN_INSTALLATION_ID_DIGITS`] long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstallationId(String);

impl InstallationId {
    /// Strips hyphens and whitespace from `raw` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::InvalidIdentifier`] if the cleaned string
    /// is shorter than 45 characters or contains a non-digit.
    pub fn normalize(raw: &str) -> ActivationResult<Self> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();

        let len = cleaned.chars().count();
        if len < MIN_INSTALLATION_ID_DIGITS {
            return Err(ActivationError::InvalidIdentifier(format!(
                "got {len} digits, need at least {MIN_INSTALLATION_ID_DIGITS}"
            )));
        }

        if let Some(bad) = cleaned.chars().find(|c| !c.is_ascii_digit()) {
            return Err(ActivationError::InvalidIdentifier(format!(
                "unexpected character {bad:?}, only digits are allowed"
            )));
        }

        Ok(Self(cleaned))
    }

    /// Returns the digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short form safe for logs (length and leading digits).
    #[must_use]
    pub fn redacted(&self) -> String {
        format!("{}…({} digits)", &self.0[..6], self.0.len())
    }
}

impl AsRef<str> for InstallationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstallationId {
    type Err = ActivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}
