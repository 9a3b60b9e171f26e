/*! Ordered attribute map. */

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Attribute name to escaped value, in vocabulary order.
///
/// Lookups ignore ASCII case. Built fresh for each extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
  entries: Vec<(String, String)>,
}

impl AttributeMap {
  /// Append an entry. A repeated name replaces the earlier value in place.
  pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((name, value)),
    }
  }

  /// Escaped value for `name`, ignoring ASCII case.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl IntoIterator for AttributeMap {
  type Item = (String, String);
  type IntoIter = std::vec::IntoIter<(String, String)>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_iter()
  }
}

/// Serializes as a JSON object, keys in insertion order.
impl Serialize for AttributeMap {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (name, value) in &self.entries {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}
