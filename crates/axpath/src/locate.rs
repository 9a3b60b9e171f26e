/*!
Tree location: find the first node satisfying a predicate.

Traversal belongs to the provider (`Provider::find_first`); this module only
decides the outcome and gathers the identity of a match.
*/

use crate::a11y::Property;
use crate::platform::Provider;
use crate::query::{Predicate, Scope};
use crate::types::{BoundingBox, Status};
use uuid::Uuid;

/// A located node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<N> {
  pub node: N,
  /// `AutomationId`, or a fresh UUID v4 when the node has none.
  pub id: String,
  pub bounds: BoundingBox,
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<N> {
  NotFound,
  Found(Match<N>),
}

impl<N> MatchResult<N> {
  pub const fn status(&self) -> Status {
    match self {
      Self::NotFound => Status::NotFound,
      Self::Found(_) => Status::Ok,
    }
  }

  pub fn found(self) -> Option<Match<N>> {
    match self {
      Self::Found(m) => Some(m),
      Self::NotFound => None,
    }
  }

  pub const fn as_found(&self) -> Option<&Match<N>> {
    match self {
      Self::Found(m) => Some(m),
      Self::NotFound => None,
    }
  }
}

/// Search under `start` and describe the first match.
///
/// A provider failure during the search counts as not found. On a match the
/// `AutomationId` and bounds are read once each, without retry.
pub fn locate<P: Provider>(
  provider: &P,
  start: &P::Node,
  predicate: &Predicate,
  scope: Scope,
) -> MatchResult<P::Node> {
  let node = match provider.find_first(start, scope, predicate) {
    Ok(Some(node)) => node,
    Ok(None) => return MatchResult::NotFound,
    Err(e) => {
      log::warn!("[locate] search for {predicate} failed: {e}");
      return MatchResult::NotFound;
    }
  };

  let id = provider
    .read_property(&node, Property::AutomationId)
    .ok()
    .and_then(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_owned))
    .unwrap_or_else(|| Uuid::new_v4().to_string());

  let bounds = provider
    .read_property(&node, Property::BoundingRectangle)
    .ok()
    .and_then(|v| v.as_rect().copied())
    .unwrap_or_default();

  MatchResult::Found(Match { node, id, bounds })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::ControlType;
  use crate::platform::{Fault, MemoryNode, MemoryTree};

  fn tree() -> MemoryTree {
    let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Pane));
    let window = tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Window));
    tree.add_child(
      window,
      MemoryNode::new(ControlType::Button)
        .name("OK")
        .automation_id("ok")
        .bounds(BoundingBox::new(5, 10, 60, 30)),
    );
    tree.add_child(window, MemoryNode::new(ControlType::Button).name("Cancel"));
    tree
  }

  fn button(name: &str) -> Predicate {
    Predicate::any()
      .with_control_type(ControlType::Button)
      .with(Property::Name, name)
  }

  #[test]
  fn found_carries_id_and_bounds() {
    let tree = tree();
    let result = locate(&tree, &tree.root_id(), &button("OK"), Scope::Descendants);
    assert_eq!(result.status(), Status::Ok);
    let found = result.found().unwrap();
    assert_eq!(found.id, "ok");
    assert_eq!(found.bounds, BoundingBox::new(5, 10, 60, 30));
  }

  #[test]
  fn missing_automation_id_gets_a_uuid() {
    let tree = tree();
    let found = locate(&tree, &tree.root_id(), &button("Cancel"), Scope::Descendants)
      .found()
      .unwrap();
    let parsed = Uuid::parse_str(&found.id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(found.bounds, BoundingBox::default());
  }

  #[test]
  fn uuids_are_fresh_per_call() {
    let tree = tree();
    let a = locate(&tree, &tree.root_id(), &button("Cancel"), Scope::Descendants).found().unwrap();
    let b = locate(&tree, &tree.root_id(), &button("Cancel"), Scope::Descendants).found().unwrap();
    assert_eq!(a.node, b.node);
    assert_ne!(a.id, b.id);
  }

  #[test]
  fn children_scope_does_not_descend() {
    let tree = tree();
    let result = locate(&tree, &tree.root_id(), &button("OK"), Scope::Children);
    assert_eq!(result, MatchResult::NotFound);
    assert_eq!(result.status(), Status::NotFound);
  }

  #[test]
  fn provider_error_is_not_found() {
    let tree = tree();
    tree.fail_reads(tree.root_id(), Fault::Always);
    assert_eq!(
      locate(&tree, &tree.root_id(), &button("OK"), Scope::Descendants),
      MatchResult::NotFound
    );
  }

  #[test]
  fn unreadable_identity_degrades() {
    let tree = tree();
    let ok = locate(&tree, &tree.root_id(), &button("OK"), Scope::Descendants)
      .found()
      .unwrap()
      .node;
    tree.fail_reads(ok, Fault::Always);
    let again = locate(&tree, &tree.root_id(), &button("OK"), Scope::Descendants)
      .found()
      .unwrap();
    assert_eq!(again.node, ok);
    assert_ne!(again.id, "ok");
    assert_eq!(again.bounds, BoundingBox::default());
  }
}
