//! Synthetic product (NDC-like) and batch identifiers.
//!
//! Product identifiers are three zero-padded digit groups (`DDDDD-DDDD-DD`).
//! Batch identifiers reuse the last four characters of the product identifier
//! followed by a freshly drawn four-digit suffix.

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::errors::DispenserError;

/// Number of entries in the selectable catalog.
pub const DEFAULT_CATALOG_SIZE: usize = 10;

static PRODUCT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-\d{4}-\d{2}$").expect("static pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductIdentifier(String);

impl ProductIdentifier {
    /// Accepts an operator-supplied identifier in `5-4-2` digit form.
    pub fn parse(input: &str) -> Result<Self, DispenserError> {
        let trimmed = input.trim();
        if PRODUCT_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DispenserError::InvalidIdentifier {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four characters, the batch prefix.
    pub fn suffix(&self) -> &str {
        let start = self.0.len().saturating_sub(4);
        &self.0[start..]
    }
}

impl fmt::Display for ProductIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchIdentifier(String);

impl BatchIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws product and batch identifiers from a random source.
#[derive(Debug)]
pub struct IdentifierGenerator<R> {
    rng: R,
}

impl<R: Rng> IdentifierGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self) -> ProductIdentifier {
        let labeler = self.rng.random_range(0..99_999u32);
        let product = self.rng.random_range(0..9_999u32);
        let package = self.rng.random_range(0..99u32);
        ProductIdentifier(format!("{labeler:05}-{product:04}-{package:02}"))
    }

    pub fn derive_batch(&mut self, product: &ProductIdentifier) -> BatchIdentifier {
        let suffix = self.rng.random_range(0..10_000u32);
        BatchIdentifier(format!("{}{suffix:04}", product.suffix()))
    }
}

/// The fixed list of identifiers offered for selection.
///
/// Entries are not guaranteed to be distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    entries: Vec<ProductIdentifier>,
}

impl ProductCatalog {
    pub fn generate<R: Rng>(generator: &mut IdentifierGenerator<R>, size: usize) -> Self {
        let entries = (0..size).map(|_| generator.generate()).collect();
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Result<&ProductIdentifier, DispenserError> {
        self.entries
            .get(index)
            .ok_or(DispenserError::CatalogIndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Resolves either a zero-based index or a literal identifier.
    pub fn resolve(&self, selector: &str) -> Result<ProductIdentifier, DispenserError> {
        match selector.trim().parse::<usize>() {
            Ok(index) => self.get(index).cloned(),
            Err(_) => ProductIdentifier::parse(selector),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductIdentifier> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
