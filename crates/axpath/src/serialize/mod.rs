/*!
Tree serialization.

Renders a subtree as XML: one element per node, tagged by control type,
carrying the node's runtime id and its non-empty attributes, children in
native order. The fragment is wrapped in a container element and parsed back
before it is returned; anything that does not parse is replaced by an error
document, so callers always receive well-formed XML.

```
use axpath::serialize::{serialize, SerializeOptions};
use axpath::platform::{MemoryNode, MemoryTree, Provider};
use axpath::a11y::ControlType;

let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Window).name("App"));
tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Button).name("OK"));

let doc = serialize(&tree, tree.root().as_ref(), &SerializeOptions::default());
let xml = doc.to_xml();
assert!(xml.starts_with(r#"<Desktop><Window id="[42,0]""#));
assert!(xml.contains(r#"<Button id="[42,1]""#));
```
*/

mod xml;

pub use xml::XmlElement;

use crate::classify::classify;
use crate::extract::{escape, extract, DEFAULT_DEADLINE};
use crate::platform::Provider;
use crate::retry;
use std::fmt;
use std::time::Duration;
use xml::{is_valid_name, validate};

/// Container tag used when none is configured.
pub const DEFAULT_CONTAINER_TAG: &str = "Desktop";

/// Tag of the element that replaces a document that failed to parse.
pub const ERROR_TAG: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
  /// Retry budget for each read.
  pub deadline: Duration,
  /// Tag of the synthetic root wrapped around the output.
  pub container_tag: String,
}

impl Default for SerializeOptions {
  fn default() -> Self {
    Self {
      deadline: DEFAULT_DEADLINE,
      container_tag: DEFAULT_CONTAINER_TAG.to_owned(),
    }
  }
}

/// A serialized subtree under its container element.
#[derive(Debug, PartialEq, Eq)]
pub struct SerializedDocument {
  root: XmlElement,
}

impl SerializedDocument {
  /// The container element.
  pub const fn root(&self) -> &XmlElement {
    &self.root
  }

  /// Render as a string. Same tree, same bytes.
  pub fn to_xml(&self) -> String {
    self.root.to_xml()
  }

  /// Whether this is the fallback error document.
  pub fn is_error(&self) -> bool {
    matches!(self.root.children.as_slice(), [only] if only.name == ERROR_TAG)
  }

  /// Escaped message of the fallback error document.
  pub fn error_message(&self) -> Option<&str> {
    match self.root.children.as_slice() {
      [only] if only.name == ERROR_TAG => only.attribute("message"),
      _ => None,
    }
  }

  fn error(container_tag: &str, message: &str) -> Self {
    let escaped = escape(message).into_owned();
    let mut error = XmlElement::new(ERROR_TAG);
    error.attributes.push(("message".to_owned(), escaped.clone()));
    error.text = Some(escaped);

    let mut root = XmlElement::new(container_tag);
    root.children.push(error);
    Self { root }
  }
}

impl fmt::Display for SerializedDocument {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_xml())
  }
}

/// Serialize the subtree rooted at `node`.
///
/// `None` gives the empty container. Never fails: unreadable values degrade
/// to empty, a node whose tag cannot be read is left out with its subtree,
/// and a document that does not parse comes back as the error document.
pub fn serialize<P: Provider>(provider: &P, node: Option<&P::Node>, options: &SerializeOptions) -> SerializedDocument {
  let container_tag = if is_valid_name(&options.container_tag) {
    options.container_tag.as_str()
  } else {
    log::warn!(
      "[serialize] invalid container tag '{}', using {DEFAULT_CONTAINER_TAG}",
      options.container_tag
    );
    DEFAULT_CONTAINER_TAG
  };

  let mut root = XmlElement::new(container_tag);
  if let Some(element) = node.and_then(|node| build(provider, node, options.deadline)) {
    root.children.push(element);
  }
  checked(SerializedDocument { root }, container_tag)
}

/// `document` if it parses back, else the error document.
fn checked(document: SerializedDocument, container_tag: &str) -> SerializedDocument {
  match validate(&document.to_xml()) {
    Ok(()) => document,
    Err(e) => {
      log::warn!("[serialize] discarding malformed document: {e}");
      SerializedDocument::error(container_tag, &e.to_string())
    }
  }
}

/// Element for one node, without children. `None` when the node has no
/// readable tag: it is gone, or its control type stayed unreadable.
fn describe<P: Provider>(provider: &P, node: &P::Node, deadline: Duration) -> Option<XmlElement> {
  let tag = classify(provider, node, deadline);
  if tag.is_empty() {
    log::debug!("[serialize] skipping untagged node {node:?} and its subtree");
    return None;
  }
  let mut element = XmlElement::new(tag);

  if let Some(id) = retry::until_deadline(deadline, || provider.runtime_id(node))
    .and_then(|id| serde_json::to_string(&id).ok())
  {
    element.attributes.push(("id".to_owned(), id));
  }

  element.attributes.extend(
    extract(provider, Some(node), deadline)
      .into_iter()
      .filter(|(name, value)| !name.is_empty() && !value.is_empty()),
  );
  Some(element)
}

/// Depth-first walk into a flat preorder list, then fold children into their
/// parents from the back. Neither pass recurses. Untagged nodes are left out
/// with their subtrees; `None` when that is `start` itself.
fn build<P: Provider>(provider: &P, start: &P::Node, deadline: Duration) -> Option<XmlElement> {
  let mut flat: Vec<(XmlElement, Option<usize>)> = Vec::new();
  let mut stack: Vec<(P::Node, Option<usize>)> = vec![(start.clone(), None)];

  while let Some((node, parent)) = stack.pop() {
    let Some(element) = describe(provider, &node, deadline) else {
      continue;
    };
    let index = flat.len();
    flat.push((element, parent));
    let children = retry::until_deadline(deadline, || provider.children(&node)).unwrap_or_default();
    stack.extend(children.into_iter().rev().map(|child| (child, Some(index))));
  }

  // Parents precede their children, so every parent is still in `flat` when
  // its last child is popped. Children arrive last-first.
  while flat.len() > 1 {
    let Some((mut element, parent)) = flat.pop() else {
      break;
    };
    element.children.reverse();
    if let Some((parent, _)) = parent.and_then(|p| flat.get_mut(p)) {
      parent.children.push(element);
    }
  }
  flat.pop().map(|(mut element, _)| {
    element.children.reverse();
    element
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::{ControlType, Property};
  use crate::platform::{Fault, MemoryNode, MemoryNodeId, MemoryTree};
  use crate::types::BoundingBox;
  use proptest::prelude::*;

  fn options() -> SerializeOptions {
    SerializeOptions {
      deadline: Duration::from_millis(50),
      ..SerializeOptions::default()
    }
  }

  /// Window > [Button "OK", Pane > [Text "hi"]]
  fn two_levels() -> MemoryTree {
    let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Window).name("App"));
    let root = tree.root_id();
    tree.add_child(root, MemoryNode::new(ControlType::Button).name("OK"));
    let pane = tree.add_child(root, MemoryNode::new(ControlType::Pane));
    tree.add_child(pane, MemoryNode::new(ControlType::Text).name("hi"));
    tree
  }

  #[test]
  fn two_level_shape() {
    let tree = two_levels();
    let doc = serialize(&tree, tree.root().as_ref(), &options());
    assert_eq!(
      doc.to_xml(),
      concat!(
        r#"<Desktop>"#,
        r#"<Window id="[42,0]" Name="App">"#,
        r#"<Button id="[42,1]" Name="OK"/>"#,
        r#"<Pane id="[42,2]"><Text id="[42,3]" Name="hi"/></Pane>"#,
        r#"</Window>"#,
        r#"</Desktop>"#,
      )
    );
    assert!(!doc.is_error());
  }

  #[test]
  fn typed_attributes_render_in_vocabulary_order() {
    let tree = MemoryTree::new(
      MemoryNode::new(ControlType::Button)
        .name("OK")
        .automation_id("ok")
        .with(Property::IsEnabled, false)
        .bounds(BoundingBox::new(1, 2, 3, 4))
        .runtime_id([7, 8, 9]),
    );
    let doc = serialize(&tree, tree.root().as_ref(), &options());
    assert_eq!(
      doc.to_xml(),
      r#"<Desktop><Button id="[7,8,9]" AutomationId="ok" IsEnabled="false" Name="OK" Top="1" Left="2" Right="3" Bottom="4"/></Desktop>"#
    );
  }

  #[test]
  fn absent_node_gives_empty_container() {
    let tree = two_levels();
    assert_eq!(serialize(&tree, None, &options()).to_xml(), "<Desktop/>");
  }

  #[test]
  fn custom_container_tag() {
    let tree = two_levels();
    let opts = SerializeOptions {
      container_tag: "Snapshot".into(),
      ..options()
    };
    let xml = serialize(&tree, None, &opts).to_xml();
    assert_eq!(xml, "<Snapshot/>");

    let bad = SerializeOptions {
      container_tag: "not a tag".into(),
      ..options()
    };
    assert_eq!(serialize(&tree, None, &bad).to_xml(), "<Desktop/>");
  }

  #[test]
  fn is_idempotent_on_an_unchanged_tree() {
    let tree = two_levels();
    let root = tree.root();
    assert_eq!(
      serialize(&tree, root.as_ref(), &options()).to_xml(),
      serialize(&tree, root.as_ref(), &options()).to_xml()
    );
  }

  #[test]
  fn unknown_control_type_uses_placeholder() {
    let tree = MemoryTree::new(MemoryNode::with_raw_control_type(1));
    let xml = serialize(&tree, tree.root().as_ref(), &options()).to_xml();
    assert_eq!(xml, r#"<Desktop><Unknown id="[42,0]"/></Desktop>"#);
  }

  #[test]
  fn unreadable_start_node_gives_empty_container() {
    let tree = two_levels();
    tree.fail_reads(tree.root_id(), Fault::Always);
    let doc = serialize(&tree, tree.root().as_ref(), &options());
    assert!(!doc.is_error());
    assert_eq!(doc.to_xml(), "<Desktop/>");
  }

  #[test]
  fn unreadable_child_is_left_out_and_the_rest_kept() {
    let tree = two_levels();
    tree.fail_reads(pane(&tree), Fault::Always);
    let doc = serialize(&tree, tree.root().as_ref(), &options());
    assert!(!doc.is_error());
    assert_eq!(
      doc.to_xml(),
      r#"<Desktop><Window id="[42,0]" Name="App"><Button id="[42,1]" Name="OK"/></Window></Desktop>"#
    );
  }

  #[test]
  fn child_gone_after_listing_is_left_out() {
    use crate::a11y::PropertyValue;
    use crate::query::{Predicate, Scope};
    use crate::types::ProviderError;

    /// Reports a child id the tree no longer holds, as a live tree does when
    /// a node disappears between listing and reading.
    struct Stale(MemoryTree, MemoryNodeId);

    impl Provider for Stale {
      type Node = MemoryNodeId;
      fn root(&self) -> Option<MemoryNodeId> {
        self.0.root()
      }
      fn read_property(&self, node: &MemoryNodeId, property: Property) -> Result<PropertyValue, ProviderError> {
        self.0.read_property(node, property)
      }
      fn control_type(&self, node: &MemoryNodeId) -> Result<i32, ProviderError> {
        self.0.control_type(node)
      }
      fn runtime_id(&self, node: &MemoryNodeId) -> Result<Vec<i32>, ProviderError> {
        self.0.runtime_id(node)
      }
      fn children(&self, node: &MemoryNodeId) -> Result<Vec<MemoryNodeId>, ProviderError> {
        let mut children = self.0.children(node)?;
        if *node == self.0.root_id() {
          children.insert(0, self.1);
        }
        Ok(children)
      }
      fn find_first(&self, start: &MemoryNodeId, scope: Scope, predicate: &Predicate) -> Result<Option<MemoryNodeId>, ProviderError> {
        self.0.find_first(start, scope, predicate)
      }
    }

    let mut tree = two_levels();
    let gone = tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Edit).name("gone"));
    tree.remove(gone);
    let stale = Stale(tree, gone);
    let doc = serialize(&stale, stale.root().as_ref(), &options());
    let clean = two_levels();
    assert_eq!(doc, serialize(&clean, clean.root().as_ref(), &options()));
  }

  #[test]
  fn malformed_document_becomes_error_document() {
    let mut root = XmlElement::new("Desktop");
    root.children.push(XmlElement::new("1Button"));
    let doc = checked(SerializedDocument { root }, "Desktop");
    assert!(doc.is_error());
    let xml = doc.to_xml();
    assert!(xml.starts_with(r#"<Desktop><Error message=""#));
    assert_eq!(validate(&xml), Ok(()));
    assert_eq!(doc.error_message(), doc.root().children[0].text.as_deref());
  }

  #[test]
  fn control_characters_in_values_keep_the_document() {
    let tree = MemoryTree::new(MemoryNode::new(ControlType::Text).name("bell\u{7}esc\u{1b}"));
    let doc = serialize(&tree, tree.root().as_ref(), &options());
    assert!(!doc.is_error());
    let xml = doc.to_xml();
    assert_eq!(validate(&xml), Ok(()));
    assert!(xml.contains("Name=\"bell\u{FFFD}esc\u{FFFD}\""), "{xml}");
  }

  fn pane(tree: &MemoryTree) -> MemoryNodeId {
    tree.children(&tree.root_id()).unwrap()[1]
  }

  #[test]
  fn transient_failures_inside_the_tree_recover() {
    let tree = two_levels();
    tree.fail_reads(pane(&tree), Fault::Times(2));
    let recovered = serialize(&tree, tree.root().as_ref(), &options());
    let untouched = two_levels();
    let clean = serialize(&untouched, untouched.root().as_ref(), &options());
    assert_eq!(recovered.to_xml(), clean.to_xml());
  }

  #[test]
  fn removed_subtree_is_not_serialized() {
    let mut tree = two_levels();
    let pane_id = pane(&tree);
    tree.remove(pane_id);
    let xml = serialize(&tree, tree.root().as_ref(), &options()).to_xml();
    assert!(!xml.contains("Pane"));
    assert!(xml.contains("<Button"));
  }

  #[test]
  fn deep_tree_does_not_overflow() {
    let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Pane));
    let mut parent = tree.root_id();
    for _ in 0..2_000 {
      parent = tree.add_child(parent, MemoryNode::new(ControlType::Group));
    }
    let doc = serialize(&tree, tree.root().as_ref(), &options());
    assert!(!doc.is_error());
    assert_eq!(doc.to_xml().matches("<Group").count(), 2_000);
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_always_parses(names in prop::collection::vec(any::<String>(), 1..6), raw_type in any::<i32>()) {
      let mut tree = MemoryTree::new(MemoryNode::with_raw_control_type(raw_type));
      let root = tree.root_id();
      for name in &names {
        tree.add_child(root, MemoryNode::new(ControlType::Button).name(name).with(Property::HelpText, name.as_str()));
      }
      let xml = serialize(&tree, tree.root().as_ref(), &options()).to_xml();
      prop_assert_eq!(validate(&xml), Ok(()));
    }

    #[test]
    fn escaped_names_survive_a_parse(name in "[a-zA-Z0-9 &<>\"'\n\r]{1,24}") {
      let tree = MemoryTree::new(MemoryNode::new(ControlType::Text).name(&name));
      let xml = serialize(&tree, tree.root().as_ref(), &options()).to_xml();

      let mut reader = quick_xml::Reader::from_str(&xml);
      let mut found = None;
      loop {
        match reader.read_event().unwrap() {
          quick_xml::events::Event::Empty(e) if e.name().as_ref() == b"Text" => {
            let attr = e.try_get_attribute("Name").unwrap().unwrap();
            found = Some(attr.unescape_value().unwrap().into_owned());
          }
          quick_xml::events::Event::Eof => break,
          _ => {}
        }
      }
      prop_assert_eq!(found, Some(name));
    }
  }
}
