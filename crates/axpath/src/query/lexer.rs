/*! Tokenizer for the query language. */

use crate::types::QueryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Tok {
  Slash,
  LBrack,
  RBrack,
  LParen,
  At,
  Eq,
  Star,
  DColon,
  Name(String),
  Str(String),
  Num(String),
  /// Anything the grammar has no use for. Kept so the parser can report it.
  Other(char),
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Spanned {
  pub(super) tok: Tok,
  pub(super) offset: usize,
}

impl Spanned {
  /// First character of the token as written, for error messages.
  pub(super) fn first_char(&self) -> char {
    match &self.tok {
      Tok::Slash => '/',
      Tok::LBrack => '[',
      Tok::RBrack => ']',
      Tok::LParen => '(',
      Tok::At => '@',
      Tok::Eq => '=',
      Tok::Star => '*',
      Tok::DColon => ':',
      Tok::Str(_) => '\'',
      Tok::Name(s) | Tok::Num(s) => s.chars().next().unwrap_or('?'),
      Tok::Other(c) => *c,
    }
  }

  pub(super) fn unexpected(&self) -> QueryError {
    QueryError::Unexpected {
      offset: self.offset,
      found: self.first_char(),
    }
  }
}

fn is_name_start(c: char) -> bool {
  c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Split a query into tokens. Whitespace outside quotes is dropped.
///
/// Only unterminated quotes fail here; every other oddity becomes a
/// `Tok::Other` for the parser to reject with its offset.
pub(super) fn tokenize(input: &str) -> Result<Vec<Spanned>, QueryError> {
  let mut toks = Vec::new();
  let mut chars = input.char_indices().peekable();

  while let Some((offset, c)) = chars.next() {
    let tok = match c {
      c if c.is_whitespace() => continue,
      '/' => Tok::Slash,
      '[' => Tok::LBrack,
      ']' => Tok::RBrack,
      '(' => Tok::LParen,
      '@' => Tok::At,
      '=' => Tok::Eq,
      '*' => Tok::Star,
      ':' if chars.peek().is_some_and(|&(_, next)| next == ':') => {
        chars.next();
        Tok::DColon
      }
      q @ ('\'' | '"') => {
        let mut value = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == q {
            closed = true;
            break;
          }
          value.push(c);
        }
        if !closed {
          return Err(QueryError::UnexpectedEnd {
            expected: "closing quote",
          });
        }
        Tok::Str(value)
      }
      c if c.is_ascii_digit() => {
        let mut digits = String::from(c);
        while let Some(&(_, next)) = chars.peek() {
          if !next.is_ascii_digit() {
            break;
          }
          digits.push(next);
          chars.next();
        }
        Tok::Num(digits)
      }
      c if is_name_start(c) => {
        let mut name = String::from(c);
        while let Some(&(_, next)) = chars.peek() {
          if !is_name_char(next) {
            break;
          }
          name.push(next);
          chars.next();
        }
        Tok::Name(name)
      }
      other => Tok::Other(other),
    };
    toks.push(Spanned { tok, offset });
  }

  Ok(toks)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(input: &str) -> Vec<Tok> {
    tokenize(input)
      .unwrap()
      .into_iter()
      .map(|s| s.tok)
      .collect()
  }

  #[test]
  fn simple_step() {
    assert_eq!(
      kinds("//Button[@Name='OK']"),
      vec![
        Tok::Slash,
        Tok::Slash,
        Tok::Name("Button".into()),
        Tok::LBrack,
        Tok::At,
        Tok::Name("Name".into()),
        Tok::Eq,
        Tok::Str("OK".into()),
        Tok::RBrack,
      ]
    );
  }

  #[test]
  fn quotes_keep_whitespace_and_other_quote() {
    assert_eq!(kinds("\" it's \""), vec![Tok::Str(" it's ".into())]);
    assert_eq!(kinds("'say \"hi\"'"), vec![Tok::Str("say \"hi\"".into())]);
  }

  #[test]
  fn unterminated_quote_fails() {
    assert_eq!(
      tokenize("[@Name='OK]"),
      Err(QueryError::UnexpectedEnd {
        expected: "closing quote"
      })
    );
  }

  #[test]
  fn offsets_are_byte_offsets() {
    let toks = tokenize("  /é").unwrap();
    assert_eq!(toks[0].offset, 2);
    assert_eq!(toks[1].offset, 3);
  }

  #[test]
  fn axis_and_numbers() {
    assert_eq!(
      kinds("child::x 42"),
      vec![
        Tok::Name("child".into()),
        Tok::DColon,
        Tok::Name("x".into()),
        Tok::Num("42".into()),
      ]
    );
  }

  #[test]
  fn unknown_characters_are_kept() {
    assert_eq!(kinds("a|b"), vec![
      Tok::Name("a".into()),
      Tok::Other('|'),
      Tok::Name("b".into()),
    ]);
  }
}
