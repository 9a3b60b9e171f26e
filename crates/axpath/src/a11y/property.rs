/*!
Raw provider properties and their values.

A `Property` is what the platform can be asked for (`Name`, `IsEnabled`,
`BoundingRectangle`). What callers see is the attribute vocabulary built on
top of these in `extract::attributes`; `Top`/`Left`/`Right`/`Bottom` for
instance all come from `BoundingRectangle`.
*/

#![allow(missing_docs)]

use crate::types::BoundingBox;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ts_rs::TS;

/// Shape of a property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
  String,
  Bool,
  Int,
  Orientation,
  Rect,
}

/// Layout direction reported by scroll bars, sliders, toolbars and the like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Orientation {
  #[default]
  None,
  Horizontal,
  Vertical,
}

impl Orientation {
  pub const fn from_raw(raw: i32) -> Self {
    match raw {
      1 => Self::Horizontal,
      2 => Self::Vertical,
      _ => Self::None,
    }
  }

  pub const fn raw(self) -> i32 {
    match self {
      Self::None => 0,
      Self::Horizontal => 1,
      Self::Vertical => 2,
    }
  }

  pub const fn name(self) -> &'static str {
    match self {
      Self::None => "None",
      Self::Horizontal => "Horizontal",
      Self::Vertical => "Vertical",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    [Self::None, Self::Horizontal, Self::Vertical]
      .into_iter()
      .find(|o| o.name() == name)
  }
}

/// A property the accessibility provider can read off a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Property {
  AcceleratorKey,
  AccessKey,
  AriaProperties,
  AriaRole,
  AutomationId,
  BoundingRectangle,
  ClassName,
  FrameworkId,
  HasKeyboardFocus,
  HelpText,
  IsContentElement,
  IsControlElement,
  IsEnabled,
  IsKeyboardFocusable,
  IsOffscreen,
  IsPassword,
  IsRequiredForForm,
  ItemStatus,
  ItemType,
  LocalizedControlType,
  Name,
  NativeWindowHandle,
  Orientation,
  ProcessId,
}

impl Property {
  pub const ALL: [Self; 24] = [
    Self::AcceleratorKey,
    Self::AccessKey,
    Self::AriaProperties,
    Self::AriaRole,
    Self::AutomationId,
    Self::BoundingRectangle,
    Self::ClassName,
    Self::FrameworkId,
    Self::HasKeyboardFocus,
    Self::HelpText,
    Self::IsContentElement,
    Self::IsControlElement,
    Self::IsEnabled,
    Self::IsKeyboardFocusable,
    Self::IsOffscreen,
    Self::IsPassword,
    Self::IsRequiredForForm,
    Self::ItemStatus,
    Self::ItemType,
    Self::LocalizedControlType,
    Self::Name,
    Self::NativeWindowHandle,
    Self::Orientation,
    Self::ProcessId,
  ];

  pub const fn name(self) -> &'static str {
    match self {
      Self::AcceleratorKey => "AcceleratorKey",
      Self::AccessKey => "AccessKey",
      Self::AriaProperties => "AriaProperties",
      Self::AriaRole => "AriaRole",
      Self::AutomationId => "AutomationId",
      Self::BoundingRectangle => "BoundingRectangle",
      Self::ClassName => "ClassName",
      Self::FrameworkId => "FrameworkId",
      Self::HasKeyboardFocus => "HasKeyboardFocus",
      Self::HelpText => "HelpText",
      Self::IsContentElement => "IsContentElement",
      Self::IsControlElement => "IsControlElement",
      Self::IsEnabled => "IsEnabled",
      Self::IsKeyboardFocusable => "IsKeyboardFocusable",
      Self::IsOffscreen => "IsOffscreen",
      Self::IsPassword => "IsPassword",
      Self::IsRequiredForForm => "IsRequiredForForm",
      Self::ItemStatus => "ItemStatus",
      Self::ItemType => "ItemType",
      Self::LocalizedControlType => "LocalizedControlType",
      Self::Name => "Name",
      Self::NativeWindowHandle => "NativeWindowHandle",
      Self::Orientation => "Orientation",
      Self::ProcessId => "ProcessId",
    }
  }

  /// Resolve a property name, ignoring ASCII case (`@name` == `@Name`).
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|p| p.name().eq_ignore_ascii_case(name))
  }

  pub const fn kind(self) -> ValueKind {
    match self {
      Self::HasKeyboardFocus
      | Self::IsContentElement
      | Self::IsControlElement
      | Self::IsEnabled
      | Self::IsKeyboardFocusable
      | Self::IsOffscreen
      | Self::IsPassword
      | Self::IsRequiredForForm => ValueKind::Bool,
      Self::NativeWindowHandle | Self::ProcessId => ValueKind::Int,
      Self::Orientation => ValueKind::Orientation,
      Self::BoundingRectangle => ValueKind::Rect,
      Self::AcceleratorKey
      | Self::AccessKey
      | Self::AriaProperties
      | Self::AriaRole
      | Self::AutomationId
      | Self::ClassName
      | Self::FrameworkId
      | Self::HelpText
      | Self::ItemStatus
      | Self::ItemType
      | Self::LocalizedControlType
      | Self::Name => ValueKind::String,
    }
  }

  /// Can this property appear in an `[@Attr='value']` constraint?
  pub const fn is_matchable(self) -> bool {
    !matches!(self.kind(), ValueKind::Rect)
  }

  /// Parse query text into a typed value for this property.
  ///
  /// Returns `None` when the text does not fit the property's kind.
  pub fn parse_value(self, text: &str) -> Option<PropertyValue> {
    match self.kind() {
      ValueKind::String => Some(PropertyValue::String(text.to_owned())),
      ValueKind::Bool => match text {
        "true" => Some(PropertyValue::Bool(true)),
        "false" => Some(PropertyValue::Bool(false)),
        _ => None,
      },
      ValueKind::Int => text.parse::<i32>().ok().map(|n| PropertyValue::Int(n.into())),
      ValueKind::Orientation => Orientation::from_name(text).map(PropertyValue::Orientation),
      ValueKind::Rect => None,
    }
  }
}

/// Value of one property on one node, as read from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyValue {
  String(String),
  Bool(bool),
  Int(i64),
  Orientation(Orientation),
  Rect(BoundingBox),
  /// The node does not support the property.
  #[default]
  Empty,
}

impl PropertyValue {
  /// Render as unescaped text: booleans as `true`/`false`, orientation by name.
  ///
  /// Rectangles have no single-string form and render empty; the attribute
  /// table splits them into edges instead.
  pub fn to_text(&self) -> String {
    match self {
      Self::String(s) => s.clone(),
      Self::Bool(b) => b.to_string(),
      Self::Int(n) => n.to_string(),
      Self::Orientation(o) => o.name().to_owned(),
      Self::Rect(_) | Self::Empty => String::new(),
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      Self::Bool(_) | Self::Int(_) | Self::Orientation(_) | Self::Rect(_) | Self::Empty => None,
    }
  }

  pub const fn as_rect(&self) -> Option<&BoundingBox> {
    match self {
      Self::Rect(r) => Some(r),
      Self::String(_) | Self::Bool(_) | Self::Int(_) | Self::Orientation(_) | Self::Empty => None,
    }
  }

  pub const fn is_empty(&self) -> bool {
    matches!(self, Self::Empty)
  }

  /// Decode a snapshot JSON value for `property`. `None` on a kind mismatch.
  pub fn from_json(property: Property, value: &JsonValue) -> Option<Self> {
    if value.is_null() {
      return Some(Self::Empty);
    }
    match property.kind() {
      ValueKind::String => value.as_str().map(|s| Self::String(s.to_owned())),
      ValueKind::Bool => value.as_bool().map(Self::Bool),
      ValueKind::Int => value.as_i64().map(Self::Int),
      ValueKind::Orientation => value
        .as_str()
        .and_then(Orientation::from_name)
        .map(Self::Orientation),
      ValueKind::Rect => serde_json::from_value(value.clone()).ok().map(Self::Rect),
    }
  }

  /// Encode for a snapshot.
  pub fn to_json(&self) -> JsonValue {
    match self {
      Self::String(s) => JsonValue::from(s.as_str()),
      Self::Bool(b) => JsonValue::from(*b),
      Self::Int(n) => JsonValue::from(*n),
      Self::Orientation(o) => JsonValue::from(o.name()),
      Self::Rect(r) => serde_json::to_value(r).unwrap_or(JsonValue::Null),
      Self::Empty => JsonValue::Null,
    }
  }
}

impl From<&str> for PropertyValue {
  fn from(s: &str) -> Self {
    Self::String(s.to_owned())
  }
}

impl From<String> for PropertyValue {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl From<bool> for PropertyValue {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<i64> for PropertyValue {
  fn from(n: i64) -> Self {
    Self::Int(n)
  }
}

impl From<i32> for PropertyValue {
  fn from(n: i32) -> Self {
    Self::Int(i64::from(n))
  }
}

impl From<Orientation> for PropertyValue {
  fn from(o: Orientation) -> Self {
    Self::Orientation(o)
  }
}

impl From<BoundingBox> for PropertyValue {
  fn from(r: BoundingBox) -> Self {
    Self::Rect(r)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_resolve_case_insensitively() {
    assert_eq!(Property::from_name("Name"), Some(Property::Name));
    assert_eq!(Property::from_name("name"), Some(Property::Name));
    assert_eq!(Property::from_name("AUTOMATIONID"), Some(Property::AutomationId));
    assert_eq!(Property::from_name("Nme"), None);
    assert_eq!(Property::from_name(""), None);
  }

  #[test]
  fn every_name_roundtrips() {
    for p in Property::ALL {
      assert_eq!(Property::from_name(p.name()), Some(p));
      assert_eq!(p.to_string(), p.name());
    }
  }

  #[test]
  fn bounding_rectangle_is_not_matchable() {
    assert!(!Property::BoundingRectangle.is_matchable());
    assert!(Property::Name.is_matchable());
    assert!(Property::IsEnabled.is_matchable());
  }

  mod parse_value {
    use super::*;

    #[test]
    fn strings_are_taken_verbatim() {
      assert_eq!(
        Property::Name.parse_value(" OK "),
        Some(PropertyValue::String(" OK ".into()))
      );
    }

    #[test]
    fn booleans_must_be_lowercase_literals() {
      assert_eq!(Property::IsEnabled.parse_value("true"), Some(PropertyValue::Bool(true)));
      assert_eq!(Property::IsEnabled.parse_value("false"), Some(PropertyValue::Bool(false)));
      assert_eq!(Property::IsEnabled.parse_value("True"), None);
      assert_eq!(Property::IsEnabled.parse_value("1"), None);
    }

    #[test]
    fn integers_must_parse() {
      assert_eq!(Property::ProcessId.parse_value("1234"), Some(PropertyValue::Int(1234)));
      assert_eq!(Property::ProcessId.parse_value("-5"), Some(PropertyValue::Int(-5)));
      assert_eq!(Property::ProcessId.parse_value("12ab"), None);
    }

    #[test]
    fn integers_are_32_bit() {
      assert_eq!(
        Property::NativeWindowHandle.parse_value("-2147483648"),
        Some(PropertyValue::Int(-2_147_483_648))
      );
      assert_eq!(Property::ProcessId.parse_value("2147483648"), None);
      assert_eq!(Property::NativeWindowHandle.parse_value("4294967297"), None);
    }

    #[test]
    fn orientation_by_name() {
      assert_eq!(
        Property::Orientation.parse_value("Vertical"),
        Some(PropertyValue::Orientation(Orientation::Vertical))
      );
      assert_eq!(Property::Orientation.parse_value("2"), None);
    }

    #[test]
    fn rect_never_parses() {
      assert_eq!(Property::BoundingRectangle.parse_value("0,0,1,1"), None);
    }
  }

  #[test]
  fn to_text_normalizes_booleans() {
    assert_eq!(PropertyValue::Bool(true).to_text(), "true");
    assert_eq!(PropertyValue::Bool(false).to_text(), "false");
    assert_eq!(PropertyValue::Int(-7).to_text(), "-7");
    assert_eq!(PropertyValue::Orientation(Orientation::Horizontal).to_text(), "Horizontal");
    assert_eq!(PropertyValue::Empty.to_text(), "");
  }

  #[test]
  fn json_decoding_checks_kind() {
    let name = PropertyValue::from_json(Property::Name, &serde_json::json!("OK"));
    assert_eq!(name, Some(PropertyValue::from("OK")));
    assert_eq!(PropertyValue::from_json(Property::Name, &serde_json::json!(3)), None);
    assert_eq!(
      PropertyValue::from_json(Property::IsEnabled, &serde_json::json!(null)),
      Some(PropertyValue::Empty)
    );
    let rect = serde_json::json!({"top": 1, "left": 2, "right": 3, "bottom": 4});
    assert_eq!(
      PropertyValue::from_json(Property::BoundingRectangle, &rect),
      Some(PropertyValue::Rect(BoundingBox::new(1, 2, 3, 4)))
    );
  }

  #[test]
  fn json_encoding_roundtrips() {
    let values = [
      (Property::Name, PropertyValue::from("a\"b")),
      (Property::IsPassword, PropertyValue::from(true)),
      (Property::ProcessId, PropertyValue::from(42i64)),
      (Property::Orientation, PropertyValue::from(Orientation::Vertical)),
      (Property::BoundingRectangle, PropertyValue::from(BoundingBox::new(0, 0, 10, 10))),
    ];
    for (property, value) in values {
      assert_eq!(PropertyValue::from_json(property, &value.to_json()), Some(value));
    }
  }

  #[test]
  fn orientation_raw_values() {
    assert_eq!(Orientation::from_raw(0), Orientation::None);
    assert_eq!(Orientation::from_raw(1), Orientation::Horizontal);
    assert_eq!(Orientation::from_raw(2), Orientation::Vertical);
    assert_eq!(Orientation::from_raw(9), Orientation::None);
    assert_eq!(Orientation::Vertical.raw(), 2);
  }
}
