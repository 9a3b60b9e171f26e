/*!
Attribute vocabulary.

One row per output attribute: its name, the provider property it comes from,
and how that property's value renders. Output order is row order.
*/

use crate::a11y::{Property, PropertyValue};
use crate::types::BoundingBox;

type Render = fn(&PropertyValue) -> String;

pub(crate) struct AttributeRow {
  pub(crate) name: &'static str,
  pub(crate) source: Property,
  pub(crate) render: Render,
}

const fn row(name: &'static str, source: Property, render: Render) -> AttributeRow {
  AttributeRow { name, source, render }
}

fn text(value: &PropertyValue) -> String {
  value.to_text()
}

fn edge(value: &PropertyValue, pick: fn(&BoundingBox) -> i32) -> String {
  value.as_rect().map(|r| pick(r).to_string()).unwrap_or_default()
}

fn top(value: &PropertyValue) -> String {
  edge(value, |r| r.top)
}

fn left(value: &PropertyValue) -> String {
  edge(value, |r| r.left)
}

fn right(value: &PropertyValue) -> String {
  edge(value, |r| r.right)
}

fn bottom(value: &PropertyValue) -> String {
  edge(value, |r| r.bottom)
}

pub(crate) const ATTRIBUTES: [AttributeRow; 27] = [
  row("AcceleratorKey", Property::AcceleratorKey, text),
  row("AccessKey", Property::AccessKey, text),
  row("AriaProperties", Property::AriaProperties, text),
  row("AriaRole", Property::AriaRole, text),
  row("AutomationId", Property::AutomationId, text),
  row("ClassName", Property::ClassName, text),
  row("FrameworkId", Property::FrameworkId, text),
  row("HelpText", Property::HelpText, text),
  row("IsContentElement", Property::IsContentElement, text),
  row("IsControlElement", Property::IsControlElement, text),
  row("IsEnabled", Property::IsEnabled, text),
  row("IsKeyboardFocusable", Property::IsKeyboardFocusable, text),
  row("IsOffscreen", Property::IsOffscreen, text),
  row("IsPassword", Property::IsPassword, text),
  row("IsRequiredForForm", Property::IsRequiredForForm, text),
  row("HasKeyboardFocus", Property::HasKeyboardFocus, text),
  row("ItemStatus", Property::ItemStatus, text),
  row("ItemType", Property::ItemType, text),
  row("LocalizedControlType", Property::LocalizedControlType, text),
  row("Name", Property::Name, text),
  row("NativeWindowHandle", Property::NativeWindowHandle, text),
  row("Orientation", Property::Orientation, text),
  row("ProcessId", Property::ProcessId, text),
  row("Top", Property::BoundingRectangle, top),
  row("Left", Property::BoundingRectangle, left),
  row("Right", Property::BoundingRectangle, right),
  row("Bottom", Property::BoundingRectangle, bottom),
];

/// Distinct source properties, in first-use order.
pub(crate) fn sources() -> Vec<Property> {
  let mut out: Vec<Property> = Vec::with_capacity(ATTRIBUTES.len());
  for entry in &ATTRIBUTES {
    if !out.contains(&entry.source) {
      out.push(entry.source);
    }
  }
  out
}
