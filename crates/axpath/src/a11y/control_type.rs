/*!
Control types.

A control type describes what an element *is* (button, edit field, list item).
Numeric identifiers follow Windows UI Automation (`UIA_ButtonControlTypeId` =
50000 and so on). The variant name doubles as the element's XML tag, so the
variant names below are part of the query language and must not be renamed.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Placeholder tag for control-type identifiers missing from the table.
///
/// Not a queryable tag: `//Unknown` is rejected by the translator.
pub const UNKNOWN_TAG: &str = "Unknown";

/// Platform control type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ControlType {
  Button,
  Calendar,
  CheckBox,
  ComboBox,
  Edit,
  Hyperlink,
  Image,
  ListItem,
  List,
  Menu,
  MenuBar,
  MenuItem,
  ProgressBar,
  RadioButton,
  ScrollBar,
  Slider,
  Spinner,
  StatusBar,
  Tab,
  TabItem,
  Text,
  ToolBar,
  ToolTip,
  Tree,
  TreeItem,
  Custom,
  Group,
  Thumb,
  DataGrid,
  DataItem,
  Document,
  SplitButton,
  Window,
  Pane,
  Header,
  HeaderItem,
  Table,
  TitleBar,
  Separator,
  SemanticZoom,
  AppBar,
}

impl ControlType {
  /// Every control type, in identifier order.
  pub const ALL: [Self; 41] = [
    Self::Button,
    Self::Calendar,
    Self::CheckBox,
    Self::ComboBox,
    Self::Edit,
    Self::Hyperlink,
    Self::Image,
    Self::ListItem,
    Self::List,
    Self::Menu,
    Self::MenuBar,
    Self::MenuItem,
    Self::ProgressBar,
    Self::RadioButton,
    Self::ScrollBar,
    Self::Slider,
    Self::Spinner,
    Self::StatusBar,
    Self::Tab,
    Self::TabItem,
    Self::Text,
    Self::ToolBar,
    Self::ToolTip,
    Self::Tree,
    Self::TreeItem,
    Self::Custom,
    Self::Group,
    Self::Thumb,
    Self::DataGrid,
    Self::DataItem,
    Self::Document,
    Self::SplitButton,
    Self::Window,
    Self::Pane,
    Self::Header,
    Self::HeaderItem,
    Self::Table,
    Self::TitleBar,
    Self::Separator,
    Self::SemanticZoom,
    Self::AppBar,
  ];

  /// Lowest platform identifier (`Button`). Identifiers are contiguous.
  const FIRST_ID: i32 = 50_000;

  /// Platform identifier.
  #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
  pub const fn id(self) -> i32 {
    Self::FIRST_ID + self as i32
  }

  /// Look up a platform identifier. `None` for identifiers outside the table.
  pub fn from_id(id: i32) -> Option<Self> {
    let index = usize::try_from(id.checked_sub(Self::FIRST_ID)?).ok()?;
    Self::ALL.get(index).copied()
  }

  /// XML tag name.
  pub const fn tag(self) -> &'static str {
    match self {
      Self::Button => "Button",
      Self::Calendar => "Calendar",
      Self::CheckBox => "CheckBox",
      Self::ComboBox => "ComboBox",
      Self::Edit => "Edit",
      Self::Hyperlink => "Hyperlink",
      Self::Image => "Image",
      Self::ListItem => "ListItem",
      Self::List => "List",
      Self::Menu => "Menu",
      Self::MenuBar => "MenuBar",
      Self::MenuItem => "MenuItem",
      Self::ProgressBar => "ProgressBar",
      Self::RadioButton => "RadioButton",
      Self::ScrollBar => "ScrollBar",
      Self::Slider => "Slider",
      Self::Spinner => "Spinner",
      Self::StatusBar => "StatusBar",
      Self::Tab => "Tab",
      Self::TabItem => "TabItem",
      Self::Text => "Text",
      Self::ToolBar => "ToolBar",
      Self::ToolTip => "ToolTip",
      Self::Tree => "Tree",
      Self::TreeItem => "TreeItem",
      Self::Custom => "Custom",
      Self::Group => "Group",
      Self::Thumb => "Thumb",
      Self::DataGrid => "DataGrid",
      Self::DataItem => "DataItem",
      Self::Document => "Document",
      Self::SplitButton => "SplitButton",
      Self::Window => "Window",
      Self::Pane => "Pane",
      Self::Header => "Header",
      Self::HeaderItem => "HeaderItem",
      Self::Table => "Table",
      Self::TitleBar => "TitleBar",
      Self::Separator => "Separator",
      Self::SemanticZoom => "SemanticZoom",
      Self::AppBar => "AppBar",
    }
  }

  /// Look up a tag name. Case-sensitive, like XML element names.
  pub fn from_tag(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|ct| ct.tag() == tag)
  }

  /// Tag for a raw identifier, with the placeholder for unknown identifiers.
  pub fn tag_for_id(id: i32) -> &'static str {
    Self::from_id(id).map_or(UNKNOWN_TAG, Self::tag)
  }
}
