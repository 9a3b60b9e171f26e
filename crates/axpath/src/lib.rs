/*!
axpath - XPath-style queries over a live accessibility tree

```
use axpath::{Inspector, Status};
use axpath::a11y::ControlType;
use axpath::platform::{MemoryNode, MemoryTree};

// Any `Provider` works; `MemoryTree` is the in-memory one.
let mut tree = MemoryTree::new(MemoryNode::new(ControlType::Pane).name("Desktop"));
tree.add_child(tree.root_id(), MemoryNode::new(ControlType::Button).name("OK").automation_id("ok"));
let inspector = Inspector::new(tree);

// Locate: 200 with id and bounds, 404, or 400 for a malformed query.
let found = inspector.locate("/Button[@Name='OK']").found().unwrap();
assert_eq!(found.id, "ok");

// Attributes of the first match, XML-escaped, in a fixed order.
let response = inspector.attributes("//Button");
assert_eq!(response.status, Status::Ok);
assert_eq!(response.attributes.get("name"), Some("OK"));

// The whole tree as well-formed XML.
let xml = inspector.serialize(None).to_xml();
assert!(xml.starts_with("<Desktop><Pane"));
```

Reads against a live tree can fail transiently while the inspected
application redraws. Extraction, classification and serialization retry
until a deadline and degrade to empty values; they never return errors.
*/

mod core;
mod retry;

pub mod a11y;
pub mod classify;
pub mod extract;
pub mod locate;
pub mod platform;
pub mod query;
pub mod serialize;

mod types;
pub use types::*;

pub use crate::core::{AttributesResponse, Inspector, InspectorBuilder, Located};
pub use crate::extract::{AttributeMap, DEFAULT_DEADLINE};
pub use crate::locate::{Match, MatchResult};
pub use crate::platform::{MemoryTree, Provider};
pub use crate::query::{translate, Query, Scope};
pub use crate::serialize::SerializedDocument;
