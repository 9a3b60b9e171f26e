/*! Tag classification: a node's control type as its XML tag. */

use crate::a11y::ControlType;
use crate::platform::Provider;
use crate::retry;
use std::time::Duration;

/// Tag for `node`, e.g. `"Button"`.
///
/// Identifiers missing from the control-type table render as
/// [`UNKNOWN_TAG`](crate::a11y::UNKNOWN_TAG). Returns `""` when the node is
/// gone or its control type stays unreadable past `deadline`.
pub fn classify<P: Provider>(provider: &P, node: &P::Node, deadline: Duration) -> String {
  retry::until_deadline(deadline, || provider.control_type(node)).map_or_else(
    || {
      log::warn!("[classify] control type unreadable for {node:?}");
      String::new()
    },
    |id| ControlType::tag_for_id(id).to_owned(),
  )
}
