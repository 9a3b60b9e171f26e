/*!
Recursive-descent parser for the supported query subset.

```text
query      := slashes? step
slashes    := "/" | "//"            (no whitespace between the two)
step       := ("*" | TAG) predicate*
predicate  := "[" constraint ("and" constraint)* "]"
constraint := "@" NAME "=" (STRING | NUMBER)
```
*/

use super::lexer::{Spanned, Tok};
use super::{Constraint, Predicate, Query, Scope};
use crate::a11y::{ControlType, Property};
use crate::types::QueryError;

pub(super) struct Parser {
  toks: Vec<Spanned>,
  pos: usize,
}

impl Parser {
  pub(super) const fn new(toks: Vec<Spanned>) -> Self {
    Self { toks, pos: 0 }
  }

  fn peek(&self) -> Option<&Spanned> {
    self.toks.get(self.pos)
  }

  fn peek_tok(&self) -> Option<&Tok> {
    self.peek().map(|s| &s.tok)
  }

  fn advance(&mut self) -> Option<Spanned> {
    let tok = self.toks.get(self.pos).cloned();
    if tok.is_some() {
      self.pos += 1;
    }
    tok
  }

  fn eat(&mut self, tok: &Tok) -> bool {
    if self.peek_tok() == Some(tok) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn expect(&mut self, tok: &Tok, expected: &'static str) -> Result<(), QueryError> {
    match self.advance() {
      Some(s) if &s.tok == tok => Ok(()),
      Some(s) => Err(s.unexpected()),
      None => Err(QueryError::UnexpectedEnd { expected }),
    }
  }

  pub(super) fn parse(mut self) -> Result<Query, QueryError> {
    if self.toks.is_empty() {
      return Err(QueryError::Empty);
    }

    let scope = self.parse_slashes()?;
    let control_type = self.parse_node_test()?;

    let mut constraints = Vec::new();
    while self.eat(&Tok::LBrack) {
      self.parse_bracket(&mut constraints)?;
    }

    if let Some(rest) = self.peek() {
      return Err(match rest.tok {
        Tok::Slash => QueryError::MultipleSteps,
        _ => rest.unexpected(),
      });
    }

    Ok(Query {
      scope,
      predicate: Predicate {
        control_type,
        constraints,
      },
    })
  }

  /// Leading slashes must be adjacent: `/ /x` is not `//x`.
  fn parse_slashes(&mut self) -> Result<Scope, QueryError> {
    let mut count = 0;
    let mut adjacent_at = None;
    while let Some(slash) = self.peek().filter(|s| s.tok == Tok::Slash) {
      if adjacent_at.is_some_and(|at| at != slash.offset) {
        return Err(slash.unexpected());
      }
      adjacent_at = Some(slash.offset + 1);
      self.pos += 1;
      count += 1;
    }
    match count {
      0 | 1 => Ok(Scope::Children),
      2 => Ok(Scope::Descendants),
      _ => Err(QueryError::BadAxis),
    }
  }

  /// `*` yields no constraint; a tag yields its control type.
  fn parse_node_test(&mut self) -> Result<Option<ControlType>, QueryError> {
    let Some(token) = self.advance() else {
      return Err(QueryError::UnexpectedEnd {
        expected: "a tag name",
      });
    };
    match token.tok {
      Tok::Star => Ok(None),
      Tok::Name(ref name) => {
        if matches!(self.peek_tok(), Some(Tok::DColon | Tok::LParen)) {
          return Err(QueryError::Unsupported);
        }
        ControlType::from_tag(name)
          .map(Some)
          .ok_or_else(|| QueryError::UnknownTag(name.clone()))
      }
      Tok::At | Tok::DColon => Err(QueryError::Unsupported),
      Tok::Slash
      | Tok::LBrack
      | Tok::RBrack
      | Tok::LParen
      | Tok::Eq
      | Tok::Str(_)
      | Tok::Num(_)
      | Tok::Other(_) => Err(token.unexpected()),
    }
  }

  /// Contents of one `[...]` block; the opening bracket is already consumed.
  fn parse_bracket(&mut self, out: &mut Vec<Constraint>) -> Result<(), QueryError> {
    out.push(self.parse_constraint()?);
    loop {
      match self.advance() {
        Some(Spanned { tok: Tok::RBrack, .. }) => return Ok(()),
        Some(Spanned {
          tok: Tok::Name(ref word),
          ..
        }) if word == "and" => out.push(self.parse_constraint()?),
        Some(other) => return Err(other.unexpected()),
        None => return Err(QueryError::UnexpectedEnd { expected: "']'" }),
      }
    }
  }

  fn parse_constraint(&mut self) -> Result<Constraint, QueryError> {
    self.expect(&Tok::At, "'@'")?;

    let property = match self.advance() {
      Some(Spanned {
        tok: Tok::Name(name),
        ..
      }) => {
        if self.peek_tok() == Some(&Tok::LParen) {
          return Err(QueryError::Unsupported);
        }
        Property::from_name(&name).ok_or(QueryError::UnknownAttribute(name))?
      }
      Some(other) => return Err(other.unexpected()),
      None => {
        return Err(QueryError::UnexpectedEnd {
          expected: "an attribute name",
        })
      }
    };
    if !property.is_matchable() {
      return Err(QueryError::NotMatchable(property));
    }

    self.expect(&Tok::Eq, "'='")?;

    let text = match self.advance() {
      Some(Spanned {
        tok: Tok::Str(text) | Tok::Num(text),
        ..
      }) => text,
      Some(other) => return Err(other.unexpected()),
      None => {
        return Err(QueryError::UnexpectedEnd {
          expected: "a quoted value",
        })
      }
    };

    let value = property
      .parse_value(&text)
      .ok_or(QueryError::BadValue {
        property,
        value: text,
      })?;

    Ok(Constraint { property, value })
  }
}
