use thiserror::Error;

/// Errors surfaced at the edges of the dispenser (CLI input and configuration).
///
/// Workflow commands themselves never fail: a command whose precondition does
/// not hold is ignored.
#[derive(Debug, Error)]
pub enum DispenserError {
    #[error("Invalid product identifier '{input}': expected five, four and two digits separated by '-'")]
    InvalidIdentifier { input: String },
    #[error("Catalog index {index} out of range (catalog has {len} entries)")]
    CatalogIndexOutOfRange { index: usize, len: usize },
    #[error("Invalid configuration: {reason}")]
    ConfigInvalid { reason: String },
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
