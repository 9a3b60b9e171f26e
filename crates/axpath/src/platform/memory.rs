/*!
In-memory accessibility tree.

An arena of nodes addressed by `MemoryNodeId`. Supports the mutations a live
tree goes through (nodes disappearing, reads failing for a while) so the
retry and fallback paths can be driven deterministically, and round-trips
through a JSON snapshot format:

```json
{
  "controlType": "Window",
  "runtimeId": [42, 1],
  "properties": { "Name": "Calculator", "BoundingRectangle": { "top": 0, "left": 0, "right": 320, "bottom": 480 } },
  "children": []
}
```

`controlType` is either a tag or a raw numeric identifier.
*/

use super::Provider;
use crate::a11y::{ControlType, Property, PropertyValue};
use crate::query::{Predicate, Scope};
use crate::retry;
use crate::types::{AxpathError, AxpathResult, BoundingBox, ProviderError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Handle to a node in a `MemoryTree`. Stays valid (but `Gone`) after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("#{_0}")]
pub struct MemoryNodeId(usize);

/// Injected read failure, reported as `ProviderError::Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  /// Fail the next `n` reads, then recover.
  Times(u32),
  /// Fail every read.
  Always,
}

/// Contents of one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryNode {
  control_type: i32,
  runtime_id: Vec<i32>,
  properties: HashMap<Property, PropertyValue>,
}

impl MemoryNode {
  pub fn new(control_type: ControlType) -> Self {
    Self::with_raw_control_type(control_type.id())
  }

  /// A node whose control-type identifier need not be a known one.
  pub fn with_raw_control_type(id: i32) -> Self {
    Self {
      control_type: id,
      ..Self::default()
    }
  }

  /// Set a property. Setting `PropertyValue::Empty` clears it.
  #[must_use]
  pub fn with(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
    let value = value.into();
    if value.is_empty() {
      self.properties.remove(&property);
    } else {
      self.properties.insert(property, value);
    }
    self
  }

  #[must_use]
  pub fn name(self, name: &str) -> Self {
    self.with(Property::Name, name)
  }

  #[must_use]
  pub fn automation_id(self, id: &str) -> Self {
    self.with(Property::AutomationId, id)
  }

  #[must_use]
  pub fn bounds(self, bounds: BoundingBox) -> Self {
    self.with(Property::BoundingRectangle, bounds)
  }

  /// Explicit runtime identifier. Nodes without one get `[42, index]`.
  #[must_use]
  pub fn runtime_id(mut self, id: impl Into<Vec<i32>>) -> Self {
    self.runtime_id = id.into();
    self
  }

  pub fn property(&self, property: Property) -> PropertyValue {
    self.properties.get(&property).cloned().unwrap_or_default()
  }

  pub const fn control_type(&self) -> i32 {
    self.control_type
  }
}

#[derive(Debug)]
struct Slot {
  node: MemoryNode,
  parent: Option<MemoryNodeId>,
  children: Vec<MemoryNodeId>,
  attached: bool,
  fault: Mutex<Option<Fault>>,
}

/// Arena-backed `Provider`.
#[derive(Debug)]
pub struct MemoryTree {
  slots: Vec<Slot>,
  /// Provider calls served, including failed ones.
  calls: AtomicUsize,
}

impl MemoryTree {
  /// A tree with just a root.
  pub fn new(root: MemoryNode) -> Self {
    let mut tree = Self {
      slots: Vec::new(),
      calls: AtomicUsize::new(0),
    };
    tree.push(root, None, true);
    tree
  }

  pub const fn root_id(&self) -> MemoryNodeId {
    MemoryNodeId(0)
  }

  fn push(&mut self, mut node: MemoryNode, parent: Option<MemoryNodeId>, attached: bool) -> MemoryNodeId {
    let id = MemoryNodeId(self.slots.len());
    if node.runtime_id.is_empty() {
      node.runtime_id = vec![42, i32::try_from(id.0).unwrap_or(i32::MAX)];
    }
    self.slots.push(Slot {
      node,
      parent,
      children: Vec::new(),
      attached,
      fault: Mutex::new(None),
    });
    id
  }

  /// Append `node` as the last child of `parent`.
  ///
  /// Adding under a removed or unknown parent yields a node that is already gone.
  pub fn add_child(&mut self, parent: MemoryNodeId, node: MemoryNode) -> MemoryNodeId {
    let attached = self.slots.get(parent.0).is_some_and(|s| s.attached);
    let id = self.push(node, Some(parent), attached);
    if let Some(p) = self.slots.get_mut(parent.0) {
      p.children.push(id);
    }
    id
  }

  /// Detach `id` and its subtree. Later reads through any of their handles
  /// fail with `ProviderError::Gone`. Removing the root empties the tree.
  pub fn remove(&mut self, id: MemoryNodeId) -> bool {
    let Some(parent) = self.slots.get(id.0).filter(|s| s.attached).map(|s| s.parent) else {
      return false;
    };
    if let Some(p) = parent.and_then(|p| self.slots.get_mut(p.0)) {
      p.children.retain(|&c| c != id);
    }
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
      if let Some(slot) = self.slots.get_mut(current.0) {
        slot.attached = false;
        stack.extend(slot.children.iter().copied());
      }
    }
    true
  }

  /// Make reads on `id` fail with `ProviderError::Unavailable`.
  pub fn fail_reads(&self, id: MemoryNodeId, fault: Fault) {
    if let Some(slot) = self.slots.get(id.0) {
      *slot.fault.lock() = Some(fault);
    }
  }

  pub fn clear_fault(&self, id: MemoryNodeId) {
    if let Some(slot) = self.slots.get(id.0) {
      *slot.fault.lock() = None;
    }
  }

  pub fn node(&self, id: MemoryNodeId) -> Option<&MemoryNode> {
    self.slots.get(id.0).filter(|s| s.attached).map(|s| &s.node)
  }

  /// Number of nodes currently in the tree.
  pub fn node_count(&self) -> usize {
    self.slots.iter().filter(|s| s.attached).count()
  }

  /// Provider calls served so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::Relaxed)
  }

  /// Every provider call goes through here: counts it, rejects removed
  /// nodes, and applies any injected fault.
  fn slot(&self, id: MemoryNodeId) -> Result<&Slot, ProviderError> {
    self.calls.fetch_add(1, Ordering::Relaxed);
    let slot = self
      .slots
      .get(id.0)
      .filter(|s| s.attached)
      .ok_or(ProviderError::Gone)?;

    let mut fault = slot.fault.lock();
    match *fault {
      Some(Fault::Always) => return Err(ProviderError::Unavailable(format!("injected fault on {id}"))),
      Some(Fault::Times(n)) if n > 0 => {
        *fault = if n == 1 { None } else { Some(Fault::Times(n - 1)) };
        return Err(ProviderError::Unavailable(format!("injected fault on {id}")));
      }
      Some(Fault::Times(_)) | None => {}
    }
    Ok(slot)
  }

  fn is_match(&self, id: MemoryNodeId, predicate: &Predicate) -> bool {
    self
      .slots
      .get(id.0)
      .is_some_and(|s| predicate.matches(s.node.control_type, |p| s.node.property(p)))
  }
}

impl Provider for MemoryTree {
  type Node = MemoryNodeId;

  fn root(&self) -> Option<MemoryNodeId> {
    self.slots.first().filter(|s| s.attached).map(|_| self.root_id())
  }

  fn read_property(&self, node: &MemoryNodeId, property: Property) -> Result<PropertyValue, ProviderError> {
    Ok(self.slot(*node)?.node.property(property))
  }

  fn control_type(&self, node: &MemoryNodeId) -> Result<i32, ProviderError> {
    Ok(self.slot(*node)?.node.control_type)
  }

  fn runtime_id(&self, node: &MemoryNodeId) -> Result<Vec<i32>, ProviderError> {
    Ok(self.slot(*node)?.node.runtime_id.clone())
  }

  fn children(&self, node: &MemoryNodeId) -> Result<Vec<MemoryNodeId>, ProviderError> {
    Ok(self.slot(*node)?.children.clone())
  }

  fn find_first(
    &self,
    start: &MemoryNodeId,
    scope: Scope,
    predicate: &Predicate,
  ) -> Result<Option<MemoryNodeId>, ProviderError> {
    let start = self.slot(*start)?;
    match scope {
      Scope::Children => Ok(
        start
          .children
          .iter()
          .copied()
          .find(|&c| self.is_match(c, predicate)),
      ),
      Scope::Descendants => {
        let mut stack: Vec<MemoryNodeId> = start.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
          if self.is_match(id, predicate) {
            return Ok(Some(id));
          }
          if let Some(slot) = self.slots.get(id.0) {
            stack.extend(slot.children.iter().rev().copied());
          }
        }
        Ok(None)
      }
    }
  }
}

// ============================================================================
// Snapshots
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ControlTypeRef {
  Id(i32),
  Tag(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotNode {
  control_type: ControlTypeRef,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  runtime_id: Vec<i32>,
  #[serde(default, skip_serializing_if = "Map::is_empty")]
  properties: Map<String, JsonValue>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  children: Vec<SnapshotNode>,
}

impl SnapshotNode {
  fn into_node(self) -> AxpathResult<(MemoryNode, Vec<SnapshotNode>)> {
    let control_type = match self.control_type {
      ControlTypeRef::Id(id) => id,
      ControlTypeRef::Tag(tag) => ControlType::from_tag(&tag)
        .map(ControlType::id)
        .ok_or_else(|| AxpathError::InvalidSnapshot(format!("unknown control type '{tag}'")))?,
    };

    let mut node = MemoryNode::with_raw_control_type(control_type).runtime_id(self.runtime_id);
    for (name, raw) in &self.properties {
      let property = Property::from_name(name)
        .ok_or_else(|| AxpathError::InvalidSnapshot(format!("unknown property '{name}'")))?;
      let value = PropertyValue::from_json(property, raw)
        .ok_or_else(|| AxpathError::InvalidSnapshot(format!("bad value for '{name}': {raw}")))?;
      node = node.with(property, value);
    }
    Ok((node, self.children))
  }

  fn from_node(node: &MemoryNode, children: Vec<Self>) -> Self {
    let control_type = match ControlType::from_id(node.control_type) {
      Some(ct) => ControlTypeRef::Tag(ct.tag().to_owned()),
      None => ControlTypeRef::Id(node.control_type),
    };
    let properties = Property::ALL
      .into_iter()
      .filter_map(|p| node.properties.get(&p).map(|v| (p.name().to_owned(), v.to_json())))
      .collect();
    Self {
      control_type,
      runtime_id: node.runtime_id.clone(),
      properties,
      children,
    }
  }
}

/// Deepest tree a JSON snapshot holds. Each level nests two JSON containers
/// and `serde_json` stops reading at 128.
pub const MAX_SNAPSHOT_DEPTH: usize = 60;

impl MemoryTree {
  /// Parse a JSON snapshot.
  pub fn from_json(json: &str) -> AxpathResult<Self> {
    let snapshot: SnapshotNode = serde_json::from_str(json)?;
    let (root, children) = snapshot.into_node()?;
    let mut tree = Self::new(root);

    let mut stack: Vec<(SnapshotNode, MemoryNodeId)> =
      children.into_iter().rev().map(|c| (c, tree.root_id())).collect();
    while let Some((snapshot, parent)) = stack.pop() {
      let (node, children) = snapshot.into_node()?;
      let id = tree.add_child(parent, node);
      stack.extend(children.into_iter().rev().map(|c| (c, id)));
    }
    Ok(tree)
  }

  /// Load a JSON snapshot from disk.
  pub fn load(path: impl AsRef<Path>) -> AxpathResult<Self> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json(&json)
  }

  /// Encode the attached tree as a pretty-printed JSON snapshot.
  ///
  /// Trees nested deeper than [`MAX_SNAPSHOT_DEPTH`] are refused: they would
  /// not read back.
  pub fn to_json(&self) -> AxpathResult<String> {
    let root = self
      .root()
      .ok_or_else(|| AxpathError::InvalidSnapshot("tree has no root".into()))?;
    let depth = self.depth_below(root);
    if depth > MAX_SNAPSHOT_DEPTH {
      return Err(AxpathError::InvalidSnapshot(format!(
        "tree is {depth} levels deep, snapshots hold at most {MAX_SNAPSHOT_DEPTH}"
      )));
    }
    Ok(serde_json::to_string_pretty(&self.snapshot(root))?)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> AxpathResult<()> {
    std::fs::write(path, self.to_json()?)?;
    Ok(())
  }

  /// Edges on the longest path from `id` down to a leaf.
  fn depth_below(&self, id: MemoryNodeId) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(id, 0)];
    while let Some((id, depth)) = stack.pop() {
      deepest = deepest.max(depth);
      if let Some(slot) = self.slots.get(id.0) {
        stack.extend(slot.children.iter().map(|&c| (c, depth + 1)));
      }
    }
    deepest
  }

  /// Recurses; callers bound the depth first.
  fn snapshot(&self, id: MemoryNodeId) -> SnapshotNode {
    let Some(slot) = self.slots.get(id.0) else {
      return SnapshotNode::from_node(&MemoryNode::default(), Vec::new());
    };
    let children = slot.children.iter().map(|&c| self.snapshot(c)).collect();
    SnapshotNode::from_node(&slot.node, children)
  }
}

impl MemoryTree {
  /// Copy the subtree under `start` out of a live provider.
  ///
  /// Each node is read whole, retrying transient failures up to `deadline`.
  /// Nodes that stay unreadable are skipped along with their subtrees.
  pub fn capture<P: Provider>(provider: &P, start: &P::Node, deadline: Duration) -> AxpathResult<Self> {
    let read = |node: &P::Node| {
      retry::until_deadline(deadline, || {
        let mut copy = MemoryNode::with_raw_control_type(provider.control_type(node)?)
          .runtime_id(provider.runtime_id(node)?);
        for property in Property::ALL {
          copy = copy.with(property, provider.read_property(node, property)?);
        }
        Ok((copy, provider.children(node)?))
      })
    };

    let (root, children) =
      read(start).ok_or_else(|| AxpathError::ProviderUnavailable("capture start node is unreadable".into()))?;
    let mut tree = Self::new(root);

    let mut stack: Vec<(P::Node, MemoryNodeId)> =
      children.into_iter().rev().map(|c| (c, tree.root_id())).collect();
    while let Some((node, parent)) = stack.pop() {
      let Some((copy, children)) = read(&node) else {
        log::debug!("[capture] skipping unreadable node {node:?}");
        continue;
      };
      let id = tree.add_child(parent, copy);
      stack.extend(children.into_iter().rev().map(|c| (c, id)));
    }

    log::info!("[capture] copied {} node(s)", tree.node_count());
    Ok(tree)
  }
}
