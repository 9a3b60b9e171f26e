/*!
Accessibility vocabulary: control types and the properties a provider exposes.
*/

mod control_type;
mod property;

pub use control_type::{ControlType, UNKNOWN_TAG};
pub use property::{Orientation, Property, PropertyValue, ValueKind};
