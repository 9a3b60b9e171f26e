/*! Minimal XML element tree, rendering, and well-formedness checks. */

use crate::extract::is_xml_char;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// One element. Attribute values and text are stored escaped, ready to write.
///
/// Dropping and comparing walk the tree with an explicit stack, like rendering.
#[derive(Debug, Default)]
pub struct XmlElement {
  pub name: String,
  pub attributes: Vec<(String, String)>,
  pub children: Vec<XmlElement>,
  pub text: Option<String>,
}

impl XmlElement {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      attributes: Vec::new(),
      children: Vec::new(),
      text: None,
    }
  }

  /// Escaped value of the first attribute called `name`.
  pub fn attribute(&self, name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|(k, _)| k == name)
      .map(|(_, v)| v.as_str())
  }

  /// Append the element to `out`. Childless, textless elements self-close.
  ///
  /// Walks with an explicit stack so depth is bounded by memory only.
  pub fn write_to(&self, out: &mut String) {
    enum Step<'a> {
      Open(&'a XmlElement),
      Close(&'a str),
    }

    let mut stack = vec![Step::Open(self)];
    while let Some(step) = stack.pop() {
      match step {
        Step::Open(el) => {
          out.push('<');
          out.push_str(&el.name);
          for (key, value) in &el.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
          }
          if el.children.is_empty() && el.text.is_none() {
            out.push_str("/>");
            continue;
          }
          out.push('>');
          if let Some(text) = &el.text {
            out.push_str(text);
          }
          stack.push(Step::Close(&el.name));
          stack.extend(el.children.iter().rev().map(Step::Open));
        }
        Step::Close(name) => {
          out.push_str("</");
          out.push_str(name);
          out.push('>');
        }
      }
    }
  }

  pub fn to_xml(&self) -> String {
    let mut out = String::new();
    self.write_to(&mut out);
    out
  }
}

impl Drop for XmlElement {
  fn drop(&mut self) {
    let mut stack = std::mem::take(&mut self.children);
    while let Some(mut el) = stack.pop() {
      stack.append(&mut el.children);
    }
  }
}

impl PartialEq for XmlElement {
  fn eq(&self, other: &Self) -> bool {
    let mut stack = vec![(self, other)];
    while let Some((a, b)) = stack.pop() {
      if a.name != b.name
        || a.attributes != b.attributes
        || a.text != b.text
        || a.children.len() != b.children.len()
      {
        return false;
      }
      stack.extend(a.children.iter().zip(&b.children));
    }
    true
  }
}

impl Eq for XmlElement {}

impl fmt::Display for XmlElement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_xml())
  }
}

/// Why a rendered document failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum XmlError {
  #[error("XML parse error {0}")]
  Parse(String),

  #[error("Invalid XML name '{0}'")]
  BadName(String),

  #[error("Character {0:?} is not allowed in XML")]
  BadChar(char),

  #[error("Unclosed element at end of document")]
  Unclosed,

  #[error("Expected exactly one root element, found {0}")]
  RootCount(usize),
}

/// XML `Name` production, restricted to the characters tags and attribute
/// names can actually contain here.
pub(crate) fn is_valid_name(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|c| c.is_alphabetic() || matches!(c, '_' | ':'))
    && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

fn check_element(e: &BytesStart<'_>) -> Result<(), XmlError> {
  let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
  if !is_valid_name(&name) {
    return Err(XmlError::BadName(name));
  }
  for attr in e.attributes() {
    let attr = attr.map_err(|err| XmlError::Parse(format!("in attributes of <{name}>: {err}")))?;
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    if !is_valid_name(&key) {
      return Err(XmlError::BadName(key));
    }
    let value = attr
      .unescape_value()
      .map_err(|err| XmlError::Parse(format!("in attribute {key}: {err}")))?;
    check_chars(&value)?;
  }
  Ok(())
}

fn check_chars(text: &str) -> Result<(), XmlError> {
  text.chars().find(|&c| !is_xml_char(c)).map_or(Ok(()), |c| Err(XmlError::BadChar(c)))
}

/// Parse `xml` fully and check it is one well-formed element tree.
pub(crate) fn validate(xml: &str) -> Result<(), XmlError> {
  let mut reader = Reader::from_str(xml);
  let mut depth: usize = 0;
  let mut roots: usize = 0;

  loop {
    match reader.read_event() {
      Ok(Event::Start(ref e)) => {
        check_element(e)?;
        if depth == 0 {
          roots += 1;
        }
        depth += 1;
      }
      Ok(Event::Empty(ref e)) => {
        check_element(e)?;
        if depth == 0 {
          roots += 1;
        }
      }
      Ok(Event::End(_)) => depth = depth.saturating_sub(1),
      Ok(Event::Text(ref e)) => {
        let text = e
          .unescape()
          .map_err(|err| XmlError::Parse(format!("in text: {err}")))?;
        check_chars(&text)?;
      }
      Ok(Event::Eof) => break,
      Ok(_) => {}
      Err(e) => {
        return Err(XmlError::Parse(format!(
          "at position {}: {e}",
          reader.error_position()
        )))
      }
    }
  }

  if depth != 0 {
    return Err(XmlError::Unclosed);
  }
  if roots != 1 {
    return Err(XmlError::RootCount(roots));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn element(name: &str, children: Vec<XmlElement>) -> XmlElement {
    let mut el = XmlElement::new(name);
    el.children = children;
    el
  }

  #[test]
  fn renders_nested_and_self_closing() {
    let mut leaf = XmlElement::new("Button");
    leaf.attributes.push(("Name".into(), "a&amp;b".into()));
    let tree = element("Desktop", vec![element("Window", vec![leaf]), XmlElement::new("Pane")]);
    assert_eq!(
      tree.to_xml(),
      r#"<Desktop><Window><Button Name="a&amp;b"/></Window><Pane/></Desktop>"#
    );
  }

  #[test]
  fn text_prevents_self_closing() {
    let mut error = XmlElement::new("Error");
    error.text = Some(String::new());
    assert_eq!(error.to_xml(), "<Error></Error>");
  }

  #[test]
  fn deep_trees_render_without_recursion() {
    let mut tree = XmlElement::new("Pane");
    for _ in 0..50_000 {
      tree = element("Pane", vec![tree]);
    }
    let xml = tree.to_xml();
    assert!(xml.starts_with("<Pane><Pane>"));
    assert_eq!(validate(&xml), Ok(()));

    let mut same = XmlElement::new("Pane");
    for _ in 0..50_000 {
      same = element("Pane", vec![same]);
    }
    assert_eq!(tree, same);
    same.children[0].children[0].name = "Group".into();
    assert_ne!(tree, same);
  }

  #[test]
  fn equality_compares_structure() {
    let a = element("Desktop", vec![XmlElement::new("Button"), XmlElement::new("Pane")]);
    let b = element("Desktop", vec![XmlElement::new("Button")]);
    let c = element("Desktop", vec![XmlElement::new("Pane"), XmlElement::new("Button")]);
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, element("Desktop", vec![XmlElement::new("Button"), XmlElement::new("Pane")]));
  }

  mod validate {
    use super::*;

    #[test]
    fn accepts_well_formed() {
      assert_eq!(validate(r#"<Desktop><Button Name="x"/></Desktop>"#), Ok(()));
    }

    #[test]
    fn rejects_bad_names() {
      assert!(validate("<Desktop>< id=\"1\"/></Desktop>").is_err());
      assert!(validate("<Desktop><1Button/></Desktop>").is_err());
      assert!(validate(r#"<Desktop><Button bad!="x"/></Desktop>"#).is_err());
    }

    #[test]
    fn rejects_raw_reserved_characters_in_values() {
      assert!(validate(r#"<Desktop><Button Name="a&b"/></Desktop>"#).is_err());
      assert!(validate(r#"<Desktop><Button Name="a"b"/></Desktop>"#).is_err());
    }

    #[test]
    fn rejects_characters_outside_xml() {
      assert_eq!(
        validate("<Desktop><Button Name=\"bell\u{7}\"/></Desktop>"),
        Err(XmlError::BadChar('\u{7}'))
      );
      assert_eq!(
        validate("<Desktop><Error>esc\u{1b}</Error></Desktop>"),
        Err(XmlError::BadChar('\u{1b}'))
      );
      assert_eq!(validate("<Desktop><Button Name=\"tab\tok\"/></Desktop>"), Ok(()));
    }

    #[test]
    fn rejects_structure_errors() {
      assert!(validate("<Desktop><Button></Desktop>").is_err());
      assert!(validate("<Desktop>").is_err());
      assert_eq!(validate("<A/><B/>"), Err(XmlError::RootCount(2)));
      assert_eq!(validate(""), Err(XmlError::RootCount(0)));
    }
  }

  #[test]
  fn name_rules() {
    assert!(is_valid_name("Button"));
    assert!(is_valid_name("_x-1.y"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("1x"));
    assert!(!is_valid_name("a b"));
    assert!(!is_valid_name("-a"));
  }
}
