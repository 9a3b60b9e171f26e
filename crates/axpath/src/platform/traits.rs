/*!
Provider abstraction.

This trait is the contract between the core and an accessibility backend.
Core code only uses this trait, never backend types directly. Backends are
assumed to be single-session and not safe for parallel use; `Inspector`
serializes access to them.
*/

use crate::a11y::{Property, PropertyValue};
use crate::query::{Predicate, Scope};
use crate::types::ProviderError;
use std::fmt::Debug;

/// An accessibility tree the core can query.
///
/// Node handles are opaque and may go stale at any moment: the inspected
/// application mutates its tree concurrently. Every method must tolerate a
/// stale handle by returning an error rather than panicking.
pub trait Provider {
  /// Handle to one element. Clone is cheap.
  type Node: Clone + Send + Debug;

  /// Root of the tree (the desktop). `None` if the backend has no tree.
  fn root(&self) -> Option<Self::Node>;

  /// Read one raw property. Unsupported properties read as `PropertyValue::Empty`.
  fn read_property(&self, node: &Self::Node, property: Property) -> Result<PropertyValue, ProviderError>;

  /// Raw control-type identifier (see `ControlType::from_id`).
  fn control_type(&self, node: &Self::Node) -> Result<i32, ProviderError>;

  /// Runtime identifier: unique within the current tree session, not persistent.
  fn runtime_id(&self, node: &Self::Node) -> Result<Vec<i32>, ProviderError>;

  /// Children in native sibling order, unfiltered. Empty if none.
  fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, ProviderError>;

  /// First node under `start` within `scope` that satisfies `predicate`.
  ///
  /// `Descendants` searches depth first in document order and excludes `start`
  /// itself. `Ok(None)` means nothing matched.
  fn find_first(
    &self,
    start: &Self::Node,
    scope: Scope,
    predicate: &Predicate,
  ) -> Result<Option<Self::Node>, ProviderError>;
}
