/*!
Query translation: a restricted XPath subset into a structural predicate.

```
use axpath::query::{translate, Scope};
use axpath::a11y::ControlType;

let query = translate("//Button[@Name='OK']").unwrap();
assert_eq!(query.scope, Scope::Descendants);
assert_eq!(query.predicate.control_type(), Some(ControlType::Button));

assert!(translate("not a valid xpath(((").is_err());
```

Supported forms: `/tag`, `//tag`, `tag`, `*`, and any number of
`[@Attr='value']` blocks, with `and` allowed inside a block. Attribute names
resolve case-insensitively, values compare case-sensitively.
*/

mod lexer;
mod parser;

use crate::a11y::{ControlType, Property, PropertyValue};
use crate::types::QueryError;
use serde::Serialize;
use std::fmt;

/// Which part of the tree a search considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ts_rs::TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Scope {
  /// Immediate children of the start node.
  Children,
  /// Every descendant of the start node, depth first. Excludes the start node.
  Descendants,
}

impl Scope {
  /// Scope from the raw query text: a leading `//` means descendants.
  ///
  /// Purely syntactic; says nothing about whether the query is valid.
  pub fn of(query: &str) -> Self {
    if query.trim_start().starts_with("//") {
      Self::Descendants
    } else {
      Self::Children
    }
  }
}

/// One `@Attr='value'` equality test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
  pub property: Property,
  pub value: PropertyValue,
}

impl Constraint {
  /// Whether `actual`, read off a node, satisfies this constraint.
  ///
  /// An unsupported property reads as empty, which matches `''`.
  pub fn accepts(&self, actual: &PropertyValue) -> bool {
    match (&self.value, actual) {
      (PropertyValue::String(expected), PropertyValue::Empty) => expected.is_empty(),
      (expected, actual) => expected == actual,
    }
  }
}

/// Structural match criteria: an optional control type plus equality
/// constraints, all of which must hold.
///
/// Only [`translate`] and the builder methods construct one, so an invalid
/// query can never reach the locator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
  control_type: Option<ControlType>,
  constraints: Vec<Constraint>,
}

impl Predicate {
  /// Matches every node (`*`).
  pub fn any() -> Self {
    Self::default()
  }

  /// Require a control type.
  #[must_use]
  pub fn with_control_type(mut self, control_type: ControlType) -> Self {
    self.control_type = Some(control_type);
    self
  }

  /// Add an equality constraint.
  #[must_use]
  pub fn with(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
    self.constraints.push(Constraint {
      property,
      value: value.into(),
    });
    self
  }

  pub const fn control_type(&self) -> Option<ControlType> {
    self.control_type
  }

  pub fn constraints(&self) -> &[Constraint] {
    &self.constraints
  }

  /// Evaluate against one node, given its raw control-type identifier and a
  /// way to read its properties. Reads stop at the first failing constraint.
  pub fn matches(&self, control_type_id: i32, mut read: impl FnMut(Property) -> PropertyValue) -> bool {
    if let Some(ct) = self.control_type {
      if ct.id() != control_type_id {
        return false;
      }
    }
    self
      .constraints
      .iter()
      .all(|c| c.accepts(&read(c.property)))
  }
}

fn write_literal(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
  if text.contains('\'') {
    write!(f, "\"{text}\"")
  } else {
    write!(f, "'{text}'")
  }
}

impl fmt::Display for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.control_type {
      Some(ct) => f.write_str(ct.tag())?,
      None => f.write_str("*")?,
    }
    for c in &self.constraints {
      write!(f, "[@{}=", c.property)?;
      write_literal(f, &c.value.to_text())?;
      f.write_str("]")?;
    }
    Ok(())
  }
}

/// A translated query: where to look and what to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  pub scope: Scope,
  pub predicate: Predicate,
}

impl fmt::Display for Query {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.scope {
      Scope::Children => f.write_str("/")?,
      Scope::Descendants => f.write_str("//")?,
    }
    write!(f, "{}", self.predicate)
  }
}

/// Translate a query string.
///
/// Never panics; malformed input is an ordinary `Err` that callers map to a
/// 400-equivalent status. Pure: no provider access.
pub fn translate(query: &str) -> Result<Query, QueryError> {
  let toks = lexer::tokenize(query.trim())?;
  parser::Parser::new(toks).parse()
}
