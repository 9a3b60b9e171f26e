/*! Mapping between `Property` and UI Automation property identifiers. */

use crate::a11y::Property;

/// UI Automation property identifier for `property`.
pub(super) const fn property_id(property: Property) -> i32 {
  match property {
    Property::BoundingRectangle => 30001,
    Property::ProcessId => 30002,
    Property::LocalizedControlType => 30004,
    Property::Name => 30005,
    Property::AcceleratorKey => 30006,
    Property::AccessKey => 30007,
    Property::HasKeyboardFocus => 30008,
    Property::IsKeyboardFocusable => 30009,
    Property::IsEnabled => 30010,
    Property::AutomationId => 30011,
    Property::ClassName => 30012,
    Property::HelpText => 30013,
    Property::IsControlElement => 30016,
    Property::IsContentElement => 30017,
    Property::IsPassword => 30019,
    Property::NativeWindowHandle => 30020,
    Property::ItemType => 30021,
    Property::IsOffscreen => 30022,
    Property::Orientation => 30023,
    Property::FrameworkId => 30024,
    Property::IsRequiredForForm => 30025,
    Property::ItemStatus => 30026,
    Property::AriaRole => 30101,
    Property::AriaProperties => 30102,
  }
}

pub(super) const CONTROL_TYPE_PROPERTY_ID: i32 = 30003;

/// `UIA_E_ELEMENTNOTAVAILABLE`
pub(super) const ELEMENT_NOT_AVAILABLE: i32 = i32::from_ne_bytes(0x8004_0201_u32.to_ne_bytes());

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn identifiers_are_distinct() {
    let ids: HashSet<i32> = Property::ALL.into_iter().map(property_id).collect();
    assert_eq!(ids.len(), Property::ALL.len());
    assert!(!ids.contains(&CONTROL_TYPE_PROPERTY_ID));
  }

  #[test]
  fn element_not_available_is_the_hresult_bit_pattern() {
    assert_eq!(format!("{ELEMENT_NOT_AVAILABLE:X}"), "80040201");
  }
}
