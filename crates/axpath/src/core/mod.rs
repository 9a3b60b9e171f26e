/*!
Inspector: one provider session plus the query pipeline around it.

# Module Structure

- `mod.rs` - Inspector struct, builder, provider access
- `queries.rs` - locate / attributes / serialize entry points and their responses

# Example

```
use axpath::{Inspector, Status};
use axpath::a11y::ControlType;
use axpath::platform::{MemoryNode, MemoryTree};

let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Pane).name("Desktop"));
tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Button).name("OK"));

let inspector = Inspector::new(tree);
assert_eq!(inspector.locate("/Button[@Name='OK']").status(), Status::Ok);
assert_eq!(inspector.locate("//Calendar").status(), Status::NotFound);
assert_eq!(inspector.locate("not a valid xpath(((").status(), Status::BadRequest);
```
*/

mod queries;

pub use queries::{AttributesResponse, Located};

use crate::extract::DEFAULT_DEADLINE;
use crate::platform::{MemoryTree, Provider};
use crate::serialize::{SerializeOptions, DEFAULT_CONTAINER_TAG};
use crate::types::{AxpathError, AxpathResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Query engine over a single provider session.
///
/// Every operation holds the session lock for its whole duration, so
/// concurrent callers are served one at a time. Clone is cheap (Arc bump).
pub struct Inspector<P: Provider> {
  provider: Arc<Mutex<P>>,
  deadline: Duration,
  container_tag: Arc<str>,
}

impl<P: Provider> Clone for Inspector<P> {
  fn clone(&self) -> Self {
    Self {
      provider: Arc::clone(&self.provider),
      deadline: self.deadline,
      container_tag: Arc::clone(&self.container_tag),
    }
  }
}

impl<P: Provider> std::fmt::Debug for Inspector<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Inspector")
      .field("deadline", &self.deadline)
      .field("container_tag", &self.container_tag)
      .finish_non_exhaustive()
  }
}

/// Builder for configuring an Inspector.
///
/// # Example
///
/// ```
/// # use axpath::Inspector;
/// # use axpath::platform::{MemoryNode, MemoryTree};
/// # use axpath::a11y::ControlType;
/// # let tree = MemoryTree::new(MemoryNode::new(ControlType::Pane));
/// let inspector = Inspector::builder(tree)
///     .deadline_ms(250)
///     .container_tag("Snapshot")
///     .build();
/// assert_eq!(inspector.serialize(None).to_xml(), "<Snapshot/>");
/// ```
#[derive(Debug)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct InspectorBuilder<P> {
  provider: P,
  deadline: Duration,
  container_tag: String,
}

impl<P: Provider> InspectorBuilder<P> {
  /// Retry budget for attribute, tag and child reads. Default: 5s.
  pub const fn deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  /// Same as [`deadline`](Self::deadline), in milliseconds.
  pub const fn deadline_ms(self, ms: u64) -> Self {
    self.deadline(Duration::from_millis(ms))
  }

  /// Tag of the synthetic root around serialized output. Default: `Desktop`.
  pub fn container_tag(mut self, tag: impl Into<String>) -> Self {
    self.container_tag = tag.into();
    self
  }

  pub fn build(self) -> Inspector<P> {
    log::debug!(
      "[inspector] deadline {:?}, container <{}>",
      self.deadline,
      self.container_tag
    );
    Inspector {
      provider: Arc::new(Mutex::new(self.provider)),
      deadline: self.deadline,
      container_tag: self.container_tag.into(),
    }
  }
}

impl<P: Provider> Inspector<P> {
  /// Inspector with the default deadline and container tag.
  ///
  /// For custom configuration, use [`Inspector::builder()`].
  pub fn new(provider: P) -> Self {
    Self::builder(provider).build()
  }

  pub fn builder(provider: P) -> InspectorBuilder<P> {
    InspectorBuilder {
      provider,
      deadline: DEFAULT_DEADLINE,
      container_tag: DEFAULT_CONTAINER_TAG.to_owned(),
    }
  }

  pub const fn deadline(&self) -> Duration {
    self.deadline
  }

  pub fn container_tag(&self) -> &str {
    &self.container_tag
  }

  pub(crate) fn serialize_options(&self) -> SerializeOptions {
    SerializeOptions {
      deadline: self.deadline,
      container_tag: self.container_tag.to_string(),
    }
  }

  /// Run `f` with the provider locked.
  #[inline]
  pub fn with_provider<R>(&self, f: impl FnOnce(&P) -> R) -> R {
    f(&self.provider.lock())
  }

  /// Run `f` with the provider locked for mutation.
  #[inline]
  pub fn with_provider_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
    f(&mut self.provider.lock())
  }

  /// Root of the tree, if the provider has one.
  pub fn root(&self) -> Option<P::Node> {
    self.with_provider(P::root)
  }

  /// Copy the whole tree into a `MemoryTree`.
  pub fn snapshot(&self) -> AxpathResult<MemoryTree> {
    self.with_provider(|provider| {
      let root = provider
        .root()
        .ok_or_else(|| AxpathError::ProviderUnavailable("provider has no root".into()))?;
      MemoryTree::capture(provider, &root, self.deadline)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::ControlType;
  use crate::platform::MemoryNode;

  fn tree() -> MemoryTree {
    let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Pane).name("Desktop"));
    tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Button).name("OK"));
    tree
  }

  #[test]
  fn builder_defaults() {
    let inspector = Inspector::new(tree());
    assert_eq!(inspector.deadline(), DEFAULT_DEADLINE);
    assert_eq!(inspector.container_tag(), "Desktop");
  }

  #[test]
  fn builder_overrides() {
    let inspector = Inspector::builder(tree())
      .deadline(Duration::from_millis(10))
      .container_tag("Root")
      .build();
    assert_eq!(inspector.deadline(), Duration::from_millis(10));
    assert_eq!(inspector.container_tag(), "Root");
  }

  #[test]
  fn clones_share_the_session() {
    let inspector = Inspector::new(tree());
    let other = inspector.clone();
    let root = inspector.root().unwrap();
    other.with_provider_mut(|t| t.remove(root));
    assert_eq!(inspector.root(), None);
  }

  #[test]
  fn snapshot_copies_the_tree() {
    let inspector = Inspector::new(tree());
    let copy = inspector.snapshot().unwrap();
    assert_eq!(copy.to_json().unwrap(), inspector.with_provider(|t| t.to_json().unwrap()));
  }

  #[test]
  fn snapshot_without_root_fails() {
    let inspector = Inspector::new(tree());
    let root = inspector.root().unwrap();
    inspector.with_provider_mut(|t| t.remove(root));
    assert!(matches!(inspector.snapshot(), Err(AxpathError::ProviderUnavailable(_))));
  }
}
