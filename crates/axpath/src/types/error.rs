/*! Error types for axpath operations. */

use crate::a11y::Property;

/// Errors from fallible setup: provider construction, snapshot I/O.
///
/// Query data and tree timing never produce these. Those outcomes are encoded
/// as statuses, `NotFound`, or degraded-empty values.
#[derive(Debug, thiserror::Error)]
pub enum AxpathError {
  #[error("Accessibility provider unavailable: {0}")]
  ProviderUnavailable(String),

  #[error("Invalid snapshot: {0}")]
  InvalidSnapshot(String),

  #[error("Snapshot I/O failed: {0}")]
  Io(#[from] std::io::Error),

  #[error("Snapshot JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Result type for axpath operations.
pub type AxpathResult<T> = Result<T, AxpathError>;

/// A single failed read against the accessibility provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
  /// The element is momentarily unreachable (tree mutating, app busy).
  /// Worth retrying until a deadline.
  #[error("Element temporarily unavailable: {0}")]
  Unavailable(String),

  /// The element left the tree. Retrying cannot succeed.
  #[error("Element is no longer in the tree")]
  Gone,
}

impl ProviderError {
  /// Whether a retry loop should try again after this failure.
  pub const fn is_transient(&self) -> bool {
    matches!(self, Self::Unavailable(_))
  }
}

/// Why a query string was rejected by the translator.
///
/// Every variant maps to a 400-equivalent status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
  #[error("Query is empty")]
  Empty,

  #[error("Unexpected {found:?} at offset {offset}")]
  Unexpected { offset: usize, found: char },

  #[error("Unexpected end of query, expected {expected}")]
  UnexpectedEnd { expected: &'static str },

  #[error("Too many leading slashes")]
  BadAxis,

  #[error("Only a single location step is supported")]
  MultipleSteps,

  #[error("Axis specifiers and functions are not supported")]
  Unsupported,

  #[error("Unknown tag '{0}'")]
  UnknownTag(String),

  #[error("Unknown attribute '@{0}'")]
  UnknownAttribute(String),

  #[error("Attribute '@{0}' cannot be used in a query")]
  NotMatchable(Property),

  #[error("Value '{value}' is not valid for '@{property}'")]
  BadValue { property: Property, value: String },
}
