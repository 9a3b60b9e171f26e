/*! UI Automation provider.

All unsafe COM calls for the crate live in this module.
The client is created in the multithreaded apartment, so the wrapped
interfaces may be used from any worker thread.
*/

#![allow(unsafe_code)]

mod mapping;

use super::Provider;
use crate::a11y::{Orientation, Property, PropertyValue};
use crate::query::{Predicate, Scope};
use crate::types::{AxpathError, AxpathResult, BoundingBox, ProviderError};
use mapping::{property_id, CONTROL_TYPE_PROPERTY_ID, ELEMENT_NOT_AVAILABLE};
use std::fmt;
use windows::core::{Interface, BSTR, VARIANT};
use windows::Win32::System::Com::{CoCreateInstance, CoInitializeEx, CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED};
use windows::Win32::System::Ole::{SafeArrayDestroy, SafeArrayGetElement, SafeArrayGetLBound, SafeArrayGetUBound};
use windows::Win32::UI::Accessibility::{
  CUIAutomation, IUIAutomation, IUIAutomationCondition, IUIAutomationElement, IUIAutomationTreeWalker,
  TreeScope_Children, TreeScope_Descendants, UIA_PROPERTY_ID,
};

/// Handle to a UI Automation element. Clone is cheap (reference counted).
#[derive(Clone)]
pub struct UiaElement(IUIAutomationElement);

// SAFETY: elements are obtained from an MTA client and UIA proxies are free-threaded.
unsafe impl Send for UiaElement {}

impl fmt::Debug for UiaElement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "UiaElement({:p})", self.0.as_raw())
  }
}

/// `Provider` over the live desktop via `IUIAutomation`.
pub struct UiaProvider {
  automation: IUIAutomation,
  walker: IUIAutomationTreeWalker,
}

// SAFETY: see `UiaElement`.
unsafe impl Send for UiaProvider {}

impl UiaProvider {
  /// Initialize COM for this thread and create the automation client.
  pub fn new() -> AxpathResult<Self> {
    unsafe {
      if let Err(e) = CoInitializeEx(None, COINIT_MULTITHREADED).ok() {
        // Already initialized in another apartment: the client still works.
        log::warn!("[uia] CoInitializeEx: {e}");
      }
      let automation: IUIAutomation =
        CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER).map_err(setup_error)?;
      let walker = automation.RawViewWalker().map_err(setup_error)?;
      log::info!("[uia] automation client ready");
      Ok(Self { automation, walker })
    }
  }

  fn condition(&self, predicate: &Predicate) -> windows::core::Result<IUIAutomationCondition> {
    let mut parts = Vec::new();
    if let Some(ct) = predicate.control_type() {
      parts.push((CONTROL_TYPE_PROPERTY_ID, VARIANT::from(ct.id())));
    }
    for c in predicate.constraints() {
      let Some(value) = to_variant(&c.value) else {
        log::debug!("[uia] {} = {} cannot match a UIA value", c.property, c.value.to_text());
        return unsafe { self.automation.CreateFalseCondition() };
      };
      parts.push((property_id(c.property), value));
    }

    let mut combined: Option<IUIAutomationCondition> = None;
    for (id, value) in parts {
      let next = unsafe { self.automation.CreatePropertyCondition(UIA_PROPERTY_ID(id), &value)? };
      combined = Some(match combined {
        Some(prev) => unsafe { self.automation.CreateAndCondition(&prev, &next)? },
        None => next,
      });
    }
    match combined {
      Some(c) => Ok(c),
      None => unsafe { self.automation.CreateTrueCondition() },
    }
  }
}

fn setup_error(e: windows::core::Error) -> AxpathError {
  AxpathError::ProviderUnavailable(e.to_string())
}

/// COM failures on reads are all transient, `UIA_E_ELEMENTNOTAVAILABLE` included.
fn read_error(e: &windows::core::Error) -> ProviderError {
  if e.code().0 == ELEMENT_NOT_AVAILABLE {
    ProviderError::Unavailable("element not available".into())
  } else {
    ProviderError::Unavailable(e.to_string())
  }
}

/// A null out-pointer with a success code means "no such element".
fn is_null_result(e: &windows::core::Error) -> bool {
  e.code().is_ok()
}

/// `None` for integers outside UIA's 32-bit range.
fn to_variant(value: &PropertyValue) -> Option<VARIANT> {
  Some(match value {
    PropertyValue::String(s) => VARIANT::from(BSTR::from(s.as_str())),
    PropertyValue::Bool(b) => VARIANT::from(*b),
    PropertyValue::Int(n) => VARIANT::from(i32::try_from(*n).ok()?),
    PropertyValue::Orientation(o) => VARIANT::from(o.raw()),
    PropertyValue::Rect(_) | PropertyValue::Empty => VARIANT::default(),
  })
}

fn read(element: &IUIAutomationElement, property: Property) -> windows::core::Result<PropertyValue> {
  unsafe {
    Ok(match property {
      Property::AcceleratorKey => element.CurrentAcceleratorKey()?.to_string().into(),
      Property::AccessKey => element.CurrentAccessKey()?.to_string().into(),
      Property::AriaProperties => element.CurrentAriaProperties()?.to_string().into(),
      Property::AriaRole => element.CurrentAriaRole()?.to_string().into(),
      Property::AutomationId => element.CurrentAutomationId()?.to_string().into(),
      Property::ClassName => element.CurrentClassName()?.to_string().into(),
      Property::FrameworkId => element.CurrentFrameworkId()?.to_string().into(),
      Property::HelpText => element.CurrentHelpText()?.to_string().into(),
      Property::ItemStatus => element.CurrentItemStatus()?.to_string().into(),
      Property::ItemType => element.CurrentItemType()?.to_string().into(),
      Property::LocalizedControlType => element.CurrentLocalizedControlType()?.to_string().into(),
      Property::Name => element.CurrentName()?.to_string().into(),
      Property::HasKeyboardFocus => element.CurrentHasKeyboardFocus()?.as_bool().into(),
      Property::IsContentElement => element.CurrentIsContentElement()?.as_bool().into(),
      Property::IsControlElement => element.CurrentIsControlElement()?.as_bool().into(),
      Property::IsEnabled => element.CurrentIsEnabled()?.as_bool().into(),
      Property::IsKeyboardFocusable => element.CurrentIsKeyboardFocusable()?.as_bool().into(),
      Property::IsOffscreen => element.CurrentIsOffscreen()?.as_bool().into(),
      Property::IsPassword => element.CurrentIsPassword()?.as_bool().into(),
      Property::IsRequiredForForm => element.CurrentIsRequiredForForm()?.as_bool().into(),
      Property::NativeWindowHandle => PropertyValue::Int(element.CurrentNativeWindowHandle()?.0 as isize as i64),
      Property::ProcessId => element.CurrentProcessId()?.into(),
      Property::Orientation => Orientation::from_raw(element.CurrentOrientation()?.0).into(),
      Property::BoundingRectangle => {
        let r = element.CurrentBoundingRectangle()?;
        BoundingBox::new(r.top, r.left, r.right, r.bottom).into()
      }
    })
  }
}

fn runtime_id(element: &IUIAutomationElement) -> windows::core::Result<Vec<i32>> {
  unsafe {
    let array = element.GetRuntimeId()?;
    if array.is_null() {
      return Ok(Vec::new());
    }
    let copy = (|| {
      let lower = SafeArrayGetLBound(array, 1)?;
      let upper = SafeArrayGetUBound(array, 1)?;
      let mut ids = Vec::new();
      for index in lower..=upper {
        let mut value: i32 = 0;
        SafeArrayGetElement(array, &index, (&raw mut value).cast())?;
        ids.push(value);
      }
      Ok(ids)
    })();
    if let Err(e) = SafeArrayDestroy(array) {
      log::debug!("[uia] SafeArrayDestroy: {e}");
    }
    copy
  }
}

impl Provider for UiaProvider {
  type Node = UiaElement;

  fn root(&self) -> Option<UiaElement> {
    match unsafe { self.automation.GetRootElement() } {
      Ok(root) => Some(UiaElement(root)),
      Err(e) => {
        log::warn!("[uia] no root element: {e}");
        None
      }
    }
  }

  fn read_property(&self, node: &UiaElement, property: Property) -> Result<PropertyValue, ProviderError> {
    read(&node.0, property).map_err(|e| read_error(&e))
  }

  fn control_type(&self, node: &UiaElement) -> Result<i32, ProviderError> {
    unsafe { node.0.CurrentControlType() }
      .map(|ct| ct.0)
      .map_err(|e| read_error(&e))
  }

  fn runtime_id(&self, node: &UiaElement) -> Result<Vec<i32>, ProviderError> {
    runtime_id(&node.0).map_err(|e| read_error(&e))
  }

  fn children(&self, node: &UiaElement) -> Result<Vec<UiaElement>, ProviderError> {
    let mut children = Vec::new();
    let mut next = unsafe { self.walker.GetFirstChildElement(&node.0) };
    loop {
      match next {
        Ok(child) => {
          next = unsafe { self.walker.GetNextSiblingElement(&child) };
          children.push(UiaElement(child));
        }
        Err(e) if is_null_result(&e) => return Ok(children),
        Err(e) => return Err(read_error(&e)),
      }
    }
  }

  fn find_first(
    &self,
    start: &UiaElement,
    scope: Scope,
    predicate: &Predicate,
  ) -> Result<Option<UiaElement>, ProviderError> {
    let condition = self.condition(predicate).map_err(|e| read_error(&e))?;
    let scope = match scope {
      Scope::Children => TreeScope_Children,
      Scope::Descendants => TreeScope_Descendants,
    };
    match unsafe { start.0.FindFirst(scope, &condition) } {
      Ok(found) => Ok(Some(UiaElement(found))),
      Err(e) if is_null_result(&e) => Ok(None),
      Err(e) => Err(read_error(&e)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn integers_convert_only_within_32_bits() {
    assert!(to_variant(&PropertyValue::Int(1234)).is_some());
    assert!(to_variant(&PropertyValue::Int(i64::from(i32::MIN))).is_some());
    assert!(to_variant(&PropertyValue::Int(4_294_967_297)).is_none());
  }
}
