/*! Geometry types for screen coordinates. */

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Bounding rectangle in screen coordinates. `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoundingBox {
  pub top: i32,
  pub left: i32,
  pub right: i32,
  pub bottom: i32,
}

impl BoundingBox {
  pub const fn new(top: i32, left: i32, right: i32, bottom: i32) -> Self {
    Self {
      top,
      left,
      right,
      bottom,
    }
  }
}
