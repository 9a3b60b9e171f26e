/*! XML attribute-value escaping. */

use std::borrow::Cow;

/// Whether `c` may appear in an XML 1.0 document at all, escaped or not.
pub(crate) const fn is_xml_char(c: char) -> bool {
  matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Escape text for use inside a double- or single-quoted XML attribute.
///
/// Covers the five predefined entities plus newline and carriage return,
/// which attribute-value normalization would otherwise fold into spaces.
/// Characters XML cannot carry at all (most C0 controls, U+FFFE, U+FFFF)
/// become U+FFFD.
pub fn escape(text: &str) -> Cow<'_, str> {
  if text.chars().all(is_xml_char) {
    return escape_valid(text);
  }
  let replaced: String = text
    .chars()
    .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
    .collect();
  Cow::Owned(escape_valid(&replaced).into_owned())
}

fn escape_valid(text: &str) -> Cow<'_, str> {
  let escaped = quick_xml::escape::escape(text);
  if !escaped.contains(['\n', '\r']) {
    return escaped;
  }
  Cow::Owned(escaped.replace('\n', "&#10;").replace('\r', "&#13;"))
}
