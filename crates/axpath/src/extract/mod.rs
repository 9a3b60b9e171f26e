/*!
Attribute extraction.

Reads every source property of a node in one attempt and renders the
attribute vocabulary from it. A transient failure on any read throws the
whole attempt away and starts over, so a returned map is never a mix of two
tree states. Gives up with an empty map when the node is gone or the
deadline passes.

```
use axpath::extract::{extract, DEFAULT_DEADLINE};
use axpath::platform::{MemoryNode, MemoryTree, Provider};
use axpath::a11y::ControlType;

let tree = MemoryTree::new(MemoryNode::new(ControlType::Button).name("Save & Exit"));
let attrs = extract(&tree, tree.root().as_ref(), DEFAULT_DEADLINE);
assert_eq!(attrs.get("name"), Some("Save &amp; Exit"));
assert_eq!(attrs.get("IsEnabled"), Some(""));
```
*/

mod attributes;
mod escape;
mod map;

pub use escape::escape;
pub(crate) use escape::is_xml_char;
pub use map::AttributeMap;

use crate::a11y::{Property, PropertyValue};
use crate::platform::Provider;
use crate::retry;
use crate::types::ProviderError;
use attributes::{sources, ATTRIBUTES};
use std::time::Duration;

/// How long extraction, classification and serialization keep retrying.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Names of every attribute `extract` produces, in output order.
pub fn attribute_names() -> impl Iterator<Item = &'static str> {
  ATTRIBUTES.iter().map(|entry| entry.name)
}

/// Read and render all attributes of `node`.
///
/// `None` yields an empty map, as does a node that is gone or stays
/// unreadable past `deadline`. Never fails.
pub fn extract<P: Provider>(provider: &P, node: Option<&P::Node>, deadline: Duration) -> AttributeMap {
  let Some(node) = node else {
    return AttributeMap::default();
  };
  let sources = sources();
  match retry::until_deadline(deadline, || read_all(provider, node, &sources)) {
    Some(values) => render(&values),
    None => {
      log::warn!("[extract] no attributes for {node:?}");
      AttributeMap::default()
    }
  }
}

fn read_all<P: Provider>(
  provider: &P,
  node: &P::Node,
  sources: &[Property],
) -> Result<Vec<(Property, PropertyValue)>, ProviderError> {
  sources
    .iter()
    .map(|&p| provider.read_property(node, p).map(|v| (p, v)))
    .collect()
}

fn render(values: &[(Property, PropertyValue)]) -> AttributeMap {
  let mut map = AttributeMap::default();
  for entry in &ATTRIBUTES {
    let text = values
      .iter()
      .find(|(p, _)| *p == entry.source)
      .map(|(_, v)| (entry.render)(v))
      .unwrap_or_default();
    map.insert(entry.name, escape(&text));
  }
  map
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::{ControlType, Orientation};
  use crate::platform::{Fault, MemoryNode, MemoryTree};
  use crate::types::BoundingBox;
  use std::time::Instant;

  fn button() -> MemoryTree {
    MemoryTree::new(
      MemoryNode::new(ControlType::Button)
        .name("OK")
        .automation_id("okButton")
        .with(Property::IsEnabled, true)
        .with(Property::IsOffscreen, false)
        .with(Property::ProcessId, 4242_i64)
        .with(Property::Orientation, Orientation::Horizontal)
        .bounds(BoundingBox::new(10, 20, 110, 50)),
    )
  }

  #[test]
  fn renders_full_vocabulary_in_order() {
    let tree = button();
    let attrs = extract(&tree, tree.root().as_ref(), DEFAULT_DEADLINE);
    let names: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
    assert_eq!(names, attribute_names().collect::<Vec<_>>());
    assert_eq!(names.len(), 27);
  }

  #[test]
  fn renders_typed_values() {
    let tree = button();
    let attrs = extract(&tree, tree.root().as_ref(), DEFAULT_DEADLINE);
    assert_eq!(attrs.get("Name"), Some("OK"));
    assert_eq!(attrs.get("AutomationId"), Some("okButton"));
    assert_eq!(attrs.get("IsEnabled"), Some("true"));
    assert_eq!(attrs.get("IsOffscreen"), Some("false"));
    assert_eq!(attrs.get("ProcessId"), Some("4242"));
    assert_eq!(attrs.get("Orientation"), Some("Horizontal"));
    assert_eq!(attrs.get("Top"), Some("10"));
    assert_eq!(attrs.get("Left"), Some("20"));
    assert_eq!(attrs.get("Right"), Some("110"));
    assert_eq!(attrs.get("Bottom"), Some("50"));
    assert_eq!(attrs.get("HelpText"), Some(""));
  }

  #[test]
  fn escapes_values() {
    let tree = MemoryTree::new(MemoryNode::new(ControlType::Text).name("a<b & \"c\"\n'd'"));
    let attrs = extract(&tree, tree.root().as_ref(), DEFAULT_DEADLINE);
    assert_eq!(attrs.get("Name"), Some("a&lt;b &amp; &quot;c&quot;&#10;&apos;d&apos;"));
  }

  #[test]
  fn absent_node_gives_empty_map() {
    let tree = button();
    assert!(extract(&tree, None, DEFAULT_DEADLINE).is_empty());
  }

  #[test]
  fn is_idempotent_on_an_unchanged_tree() {
    let tree = button();
    let root = tree.root();
    assert_eq!(
      extract(&tree, root.as_ref(), DEFAULT_DEADLINE),
      extract(&tree, root.as_ref(), DEFAULT_DEADLINE)
    );
  }

  mod failures {
    use super::*;

    #[test]
    fn transient_failures_are_retried() {
      let tree = button();
      let root = tree.root_id();
      tree.fail_reads(root, Fault::Times(3));
      let attrs = extract(&tree, Some(&root), DEFAULT_DEADLINE);
      assert_eq!(attrs.get("Name"), Some("OK"));
    }

    #[test]
    fn persistent_failure_gives_empty_map_after_deadline() {
      let tree = button();
      let root = tree.root_id();
      tree.fail_reads(root, Fault::Always);
      let started = Instant::now();
      let attrs = extract(&tree, Some(&root), Duration::from_millis(50));
      assert!(attrs.is_empty());
      assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn gone_node_gives_up_immediately() {
      let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Pane));
      let child = tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Button));
      tree.remove(child);
      let before = tree.calls();
      assert!(extract(&tree, Some(&child), DEFAULT_DEADLINE).is_empty());
      assert_eq!(tree.calls(), before + 1);
    }
  }
}
