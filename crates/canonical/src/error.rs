use thiserror::Error;

/// Errors from validating a [`CanonicalizeConfig`](crate::CanonicalizeConfig).
///
/// Normalization itself never fails; malformed posts degrade to "no signal".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    /// Rejected configuration, e.g. reserved version 0.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
