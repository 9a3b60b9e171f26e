/*! HTTP-style status codes reported by the locate and attribute paths. */

use serde::{Serialize, Serializer};

/// Outcome of a query, in the vocabulary a display layer already understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Status {
  /// Query matched a node.
  #[display("200 OK")]
  Ok,
  /// Query string was rejected by the translator.
  #[display("400 Bad Request")]
  BadRequest,
  /// Query was well-formed but nothing matched.
  #[display("404 Not Found")]
  NotFound,
}

impl Status {
  /// Numeric code.
  pub const fn code(self) -> u16 {
    match self {
      Self::Ok => 200,
      Self::BadRequest => 400,
      Self::NotFound => 404,
    }
  }

  pub const fn is_ok(self) -> bool {
    matches!(self, Self::Ok)
  }
}

impl Serialize for Status {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(self.code())
  }
}
