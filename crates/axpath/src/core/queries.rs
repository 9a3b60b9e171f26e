/*!
Query entry points.

Each call translates first and only takes the session lock for a valid
query, so a malformed query never reaches the provider.
*/

use super::Inspector;
use crate::classify::classify;
use crate::extract::{extract, AttributeMap};
use crate::locate::{locate, Match, MatchResult};
use crate::platform::Provider;
use crate::query::{translate, Query};
use crate::serialize::{serialize, SerializedDocument};
use crate::types::{QueryError, Status};
use serde::Serialize;

/// Outcome of [`Inspector::locate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located<N> {
  /// The query did not translate. Nothing was read from the provider.
  BadRequest(QueryError),
  NotFound,
  Found(Match<N>),
}

impl<N> Located<N> {
  pub const fn status(&self) -> Status {
    match self {
      Self::BadRequest(_) => Status::BadRequest,
      Self::NotFound => Status::NotFound,
      Self::Found(_) => Status::Ok,
    }
  }

  pub fn found(self) -> Option<Match<N>> {
    match self {
      Self::Found(m) => Some(m),
      Self::BadRequest(_) | Self::NotFound => None,
    }
  }

  pub const fn error(&self) -> Option<&QueryError> {
    match self {
      Self::BadRequest(e) => Some(e),
      Self::NotFound | Self::Found(_) => None,
    }
  }
}

impl<N> From<MatchResult<N>> for Located<N> {
  fn from(result: MatchResult<N>) -> Self {
    match result {
      MatchResult::NotFound => Self::NotFound,
      MatchResult::Found(m) => Self::Found(m),
    }
  }
}

/// Outcome of [`Inspector::attributes`]. `attributes` is empty unless `status` is 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributesResponse {
  pub status: Status,
  pub attributes: AttributeMap,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl<P: Provider> Inspector<P> {
  fn translated(query: &str) -> Result<Query, QueryError> {
    translate(query).inspect_err(|e| log::debug!("[inspector] rejected {query:?}: {e}"))
  }

  /// Find the first node matching `query`, searching from the root.
  pub fn locate(&self, query: &str) -> Located<P::Node> {
    let query = match Self::translated(query) {
      Ok(q) => q,
      Err(e) => return Located::BadRequest(e),
    };
    self.with_provider(|provider| locate_in(provider, &query))
  }

  /// Locate `query` and run `then` on the match while still holding the lock,
  /// so the match cannot go stale in between. `Err` carries the 400 or 404.
  fn at_match<R>(&self, query: &str, then: impl FnOnce(&P, &P::Node) -> R) -> Result<R, Located<P::Node>> {
    let query = Self::translated(query).map_err(Located::BadRequest)?;
    self.with_provider(|provider| match locate_in(provider, &query) {
      Located::Found(m) => Ok(then(provider, &m.node)),
      other => Err(other),
    })
  }

  /// Find the first node matching `query`, searching from `start`.
  pub fn locate_from(&self, start: &P::Node, query: &str) -> Located<P::Node> {
    let query = match Self::translated(query) {
      Ok(q) => q,
      Err(e) => return Located::BadRequest(e),
    };
    self.with_provider(|provider| locate(provider, start, &query.predicate, query.scope).into())
  }

  /// Locate `query` and read the match's attributes under one lock.
  pub fn attributes(&self, query: &str) -> AttributesResponse {
    let deadline = self.deadline;
    match self.at_match(query, |provider, node| extract(provider, Some(node), deadline)) {
      Ok(attributes) => AttributesResponse {
        status: Status::Ok,
        attributes,
        error: None,
      },
      Err(missed) => AttributesResponse {
        status: missed.status(),
        attributes: AttributeMap::default(),
        error: missed.error().map(ToString::to_string),
      },
    }
  }

  /// Attributes of `node` with the configured deadline.
  pub fn extract(&self, node: Option<&P::Node>) -> AttributeMap {
    self.with_provider(|provider| extract(provider, node, self.deadline))
  }

  /// Tag of `node` with the configured deadline.
  pub fn classify(&self, node: &P::Node) -> String {
    self.with_provider(|provider| classify(provider, node, self.deadline))
  }

  /// Serialize the subtree at `start`, or the whole tree when `None`.
  ///
  /// Without a root, the result is the empty container.
  pub fn serialize(&self, start: Option<&P::Node>) -> SerializedDocument {
    let options = self.serialize_options();
    self.with_provider(|provider| match start {
      Some(node) => serialize(provider, Some(node), &options),
      None => serialize(provider, provider.root().as_ref(), &options),
    })
  }

  /// Locate `query` and serialize the subtree at the match under one lock.
  ///
  /// `Err` is the 400 or 404 outcome of the search.
  pub fn serialize_query(&self, query: &str) -> Result<SerializedDocument, Located<P::Node>> {
    let options = self.serialize_options();
    self.at_match(query, |provider, node| serialize(provider, Some(node), &options))
  }
}

fn locate_in<P: Provider>(provider: &P, query: &Query) -> Located<P::Node> {
  let Some(root) = provider.root() else {
    log::warn!("[inspector] provider has no root");
    return Located::NotFound;
  };
  locate(provider, &root, &query.predicate, query.scope).into()
}
