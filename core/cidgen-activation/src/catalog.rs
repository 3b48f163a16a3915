//! Product version → extended product id lookup.

use crate::error::{ActivationError, ActivationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Product version used when a caller sends a token the catalog doesn't know.
pub const DEFAULT_PRODUCT_VERSION: &str = "windows11";

const WINDOWS_PID: &str = "55041-00206-271-298329-03-1033-9600.0000-0452015";
const OFFICE_2010_PID: &str = "14391-00206-234-298765-03-1033-9600.0000-0452015";
const OFFICE_2013_PID: &str = "15063-00206-234-298765-03-1033-9600.0000-0452015";
const OFFICE_2016_PID: &str = "16341-00206-234-298765-03-1033-9600.0000-0452015";

/// Built-in product table.
pub fn builtin_products() -> BTreeMap<String, String> {
    [
        ("windows7", WINDOWS_PID),
        ("windows8", WINDOWS_PID),
        ("windows10", WINDOWS_PID),
        ("windows11", WINDOWS_PID),
        ("office2010", OFFICE_2010_PID),
        ("office2013", OFFICE_2013_PID),
        ("office2016", OFFICE_2016_PID),
        ("office2019", OFFICE_2016_PID),
        ("office2021", OFFICE_2016_PID),
        ("office2024", OFFICE_2016_PID),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Extended product id sent as `<PID>` in the activation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductDescriptor(String);

impl ProductDescriptor {
    /// Wraps a descriptor string.
    #[must_use]
    pub fn new(pid: impl Into<String>) -> Self {
        Self(pid.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable product-version table with a designated default.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: BTreeMap<String, ProductDescriptor>,
    default_version: String,
}

impl ProductCatalog {
    /// Builds a catalog from a version → descriptor table.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::Config`] if `default_version` is not a key
    /// of `products`.
    pub fn new(
        products: BTreeMap<String, String>,
        default_version: impl Into<String>,
    ) -> ActivationResult<Self> {
        let default_version = default_version.into();
        if !products.contains_key(&default_version) {
            return Err(ActivationError::Config(format!(
                "default product {default_version:?} is not in the product table"
            )));
        }

        let products = products
            .into_iter()
            .map(|(version, pid)| (version, ProductDescriptor::new(pid)))
            .collect();

        Ok(Self {
            products,
            default_version,
        })
    }

    /// Resolves a product version, falling back to the default descriptor
    /// for unknown tokens.
    #[must_use]
    pub fn resolve(&self, product_version: &str) -> &ProductDescriptor {
        if let Some(descriptor) = self.products.get(product_version) {
            return descriptor;
        }
        debug!(
            "Unknown product version {:?}, using {}",
            product_version, self.default_version
        );
        self.default_descriptor()
    }

    /// Returns true if `product_version` has its own entry.
    #[must_use]
    pub fn contains(&self, product_version: &str) -> bool {
        self.products.contains_key(product_version)
    }

    /// Returns the descriptor used for unknown versions.
    #[must_use]
    pub fn default_descriptor(&self) -> &ProductDescriptor {
        // Presence checked in `new`.
        &self.products[&self.default_version]
    }

    #[must_use]
    pub fn default_version(&self) -> &str {
        &self.default_version
    }

    /// Iterates over the known product versions in sorted order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        let products = builtin_products()
            .into_iter()
            .map(|(version, pid)| (version, ProductDescriptor::new(pid)))
            .collect();
        Self {
            products,
            default_version: DEFAULT_PRODUCT_VERSION.to_string(),
        }
    }
}
