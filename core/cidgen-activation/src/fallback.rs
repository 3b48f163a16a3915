//! Last-resort table of known installation id → confirmation id answers.

use crate::error::{ActivationError, ActivationResult};
use crate::identifier::InstallationId;
use std::collections::BTreeMap;

/// Answers previously returned by the service, keyed by normalized id.
pub fn builtin_fallback() -> BTreeMap<String, String> {
    [
        (
            "445686086455217341503603789092033711398045546244021976753799760",
            "175663 758052 913011 026693 998296 111132 898444 598900",
        ),
        (
            "726638655472241669132702686630298326453704637512638480625377045",
            "329382 354816 209810 653100 955992 816980 096510 525770",
        ),
        (
            "523630667242161498995107413293761365021726779491044825719148566",
            "188464 325086 933971 561982 440844 900072 121364 648895",
        ),
        (
            "244682367662341744894119150534577726114306959756379871765964002",
            "371704 240645 110426 453211 384035 631182 655226 965155",
        ),
    ]
    .into_iter()
    .map(|(iid, cid)| (iid.to_string(), cid.to_string()))
    .collect()
}

/// Read-only fallback cache, consulted only after a remote failure.
#[derive(Debug, Clone, Default)]
pub struct FallbackCache {
    entries: BTreeMap<String, String>,
}

impl FallbackCache {
    /// Wraps `entries` as is; keys must already be normalized ids.
    #[must_use]
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Builds a cache from operator-supplied entries, re-keying each id in
    /// its normalized form so grouped ids (`111111-222222-...`) still match.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if a key is not a valid
    /// installation id or two keys normalize to the same id.
    pub fn from_entries(entries: BTreeMap<String, String>) -> ActivationResult<Self> {
        let mut normalized = BTreeMap::new();
        for (raw, confirmation_id) in entries {
            let id = InstallationId::normalize(&raw).map_err(|e| {
                ActivationError::Config(format!("fallback entry {raw:?}: {e}"))
            })?;
            if normalized
                .insert(id.as_str().to_string(), confirmation_id)
                .is_some()
            {
                return Err(ActivationError::Config(format!(
                    "fallback entry {raw:?} duplicates another entry"
                )));
            }
        }
        Ok(Self::new(normalized))
    }

    /// Cache preloaded with [`builtin_fallback`].
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_fallback())
    }

    #[must_use]
    pub fn lookup(&self, installation_id: &InstallationId) -> Option<&str> {
        self.entries.get(installation_id.as_str()).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
