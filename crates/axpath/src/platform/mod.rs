/*!
Accessibility backends.

`MemoryTree` is available everywhere and backs tests, snapshots and the
WebSocket server on hosts without UI Automation. `UiaProvider` wraps the
Windows UI Automation client.
*/

mod memory;
mod traits;

#[cfg(target_os = "windows")]
mod uia;

pub use memory::{Fault, MemoryNode, MemoryNodeId, MemoryTree, MAX_SNAPSHOT_DEPTH};
pub use traits::Provider;

#[cfg(target_os = "windows")]
pub use uia::{UiaElement, UiaProvider};
