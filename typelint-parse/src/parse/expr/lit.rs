use super::pat::is_valid_pattern_identifier;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::class_or_object::ObjMember;
use crate::ast::class_or_object::ObjMemberType;
use crate::ast::expr::lit::LitArrElem;
use crate::ast::expr::lit::LitArrExpr;
use crate::ast::expr::lit::LitBigIntExpr;
use crate::ast::expr::lit::LitBoolExpr;
use crate::ast::expr::lit::LitNullExpr;
use crate::ast::expr::lit::LitNumExpr;
use crate::ast::expr::lit::LitObjExpr;
use crate::ast::expr::lit::LitRegexExpr;
use crate::ast::expr::lit::LitStrExpr;
use crate::ast::expr::lit::LitTemplateExpr;
use crate::ast::expr::lit::LitTemplatePart;
use crate::ast::expr::IdExpr;
use crate::ast::node::Node;
use crate::char::is_line_terminator;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::loc::Loc;
use crate::num::JsNumber;
use crate::token::TT;

fn hex_value(raw: &str) -> Option<char> {
  u32::from_str_radix(raw, 16).ok().and_then(char::from_u32)
}

/// Decodes escape sequences in the body of a string or template. Returns None on a malformed
/// escape.
pub fn decode_literal(raw: &str) -> Option<String> {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.char_indices().peekable();
  while let Some((_, c)) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    let (i, escaped) = chars.next()?;
    match escaped {
      'b' => out.push('\x08'),
      'f' => out.push('\x0c'),
      'n' => out.push('\n'),
      'r' => out.push('\r'),
      't' => out.push('\t'),
      'v' => out.push('\x0b'),
      '0' if !chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) => out.push('\0'),
      'x' => {
        let digits = raw.get(i + 1..i + 3)?;
        out.push(hex_value(digits)?);
        chars.nth(1);
      }
      'u' => {
        let rest = &raw[i + 1..];
        if let Some(braced) = rest.strip_prefix('{') {
          let end = braced.find('}')?;
          out.push(hex_value(&braced[..end])?);
          // `{`, the digits, and `}`.
          for _ in 0..end + 2 {
            chars.next();
          }
        } else {
          out.push(hex_value(rest.get(..4)?)?);
          for _ in 0..4 {
            chars.next();
          }
        }
      }
      // Line continuation.
      '\r' => {
        if chars.peek().is_some_and(|(_, c)| *c == '\n') {
          chars.next();
        }
      }
      c if is_line_terminator(c) => {}
      c => out.push(c),
    };
  }
  Some(out)
}

impl<'a> Parser<'a> {
  pub fn lit_arr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitArrExpr>> {
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::<LitArrElem>::new();
      loop {
        if p.consume_if(TT::Comma).is_match() {
          elements.push(LitArrElem::Empty);
          continue;
        };
        if p.peek().typ == TT::BracketClose {
          break;
        };
        let rest = p.consume_if(TT::DotDotDot).is_match();
        let value = p.expr(ctx, [TT::Comma, TT::BracketClose])?;
        elements.push(if rest {
          LitArrElem::Rest(value)
        } else {
          LitArrElem::Single(value)
        });
        if p.peek().typ == TT::BracketClose {
          break;
        };
        p.require(TT::Comma)?;
      }
      p.require(TT::BracketClose)?;
      Ok(LitArrExpr { elements })
    })
  }

  pub fn lit_bigint(&mut self) -> SyntaxResult<Node<LitBigIntExpr>> {
    self.with_loc(|p| {
      p.require(TT::LiteralBigInt)?;
      Ok(LitBigIntExpr {})
    })
  }

  pub fn lit_bool(&mut self) -> SyntaxResult<Node<LitBoolExpr>> {
    self.with_loc(|p| {
      if p.consume_if(TT::LiteralTrue).is_match() {
        Ok(LitBoolExpr { value: true })
      } else {
        p.require(TT::LiteralFalse)?;
        Ok(LitBoolExpr { value: false })
      }
    })
  }

  pub fn lit_null(&mut self) -> SyntaxResult<Node<LitNullExpr>> {
    self.with_loc(|p| {
      p.require(TT::LiteralNull)?;
      Ok(LitNullExpr {})
    })
  }

  pub fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    self.with_loc(|p| {
      let value = p.lit_num_val()?;
      Ok(LitNumExpr { value })
    })
  }

  pub fn lit_num_val(&mut self) -> SyntaxResult<JsNumber> {
    let t = self.require(TT::LiteralNumber)?;
    JsNumber::from_literal(self.str(t.loc))
      .ok_or_else(|| t.loc.error(SyntaxErrorType::MalformedLiteralNumber, None))
  }

  pub fn lit_obj(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitObjExpr>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let members = p.list_with_loc(TT::Comma, TT::BraceClose, |p| {
        if p.consume_if(TT::DotDotDot).is_match() {
          let val = p.expr(ctx, [TT::Comma, TT::BraceClose])?;
          return Ok(ObjMember {
            typ: ObjMemberType::Rest { val },
          });
        };
        let (key, val) = p.class_or_obj_member(ctx, false)?;
        let typ = match (key, val) {
          // No value, so it's a shorthand and the key must be a valid identifier.
          (ClassOrObjKey::Direct(key), ClassOrObjVal::Prop(None)) => {
            if !is_valid_pattern_identifier(key.stx.tt, ctx.rules) {
              return Err(key.error(SyntaxErrorType::ExpectedSyntax("identifier")));
            }
            ObjMemberType::Shorthand {
              id: key.map_stx(|k| IdExpr { name: k.key }),
            }
          }
          (ClassOrObjKey::Computed(key), ClassOrObjVal::Prop(None)) => {
            return Err(key.error(SyntaxErrorType::ExpectedSyntax("object literal value")));
          }
          (key, val) => ObjMemberType::Valued { key, val },
        };
        Ok(ObjMember { typ })
      })?;
      Ok(LitObjExpr { members })
    })
  }

  pub fn lit_regex(&mut self) -> SyntaxResult<Node<LitRegexExpr>> {
    self.with_loc(|p| {
      p.require_with_mode(TT::LiteralRegex, LexMode::SlashIsRegex)?;
      Ok(LitRegexExpr {})
    })
  }

  pub fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    self.with_loc(|p| {
      let value = p.lit_str_val()?;
      Ok(LitStrExpr { value })
    })
  }

  /// Parses a string literal and returns its decoded value.
  pub fn lit_str_val(&mut self) -> SyntaxResult<String> {
    let t = self.peek();
    if t.typ == TT::Invalid && self.str(t.loc).starts_with(['"', '\'']) {
      return Err(t.error(SyntaxErrorType::LineTerminatorInString));
    }
    let t = self.require(TT::LiteralString)?;
    let raw = self.str(t.loc);
    decode_literal(&raw[1..raw.len() - 1])
      .ok_or_else(|| t.error(SyntaxErrorType::InvalidCharacterEscape))
  }

  pub fn lit_template(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitTemplateExpr>> {
    self.with_loc(|p| {
      let parts = p.lit_template_parts(ctx)?;
      Ok(LitTemplateExpr { parts })
    })
  }

  fn template_part(&mut self, loc: Loc, is_end: bool) -> SyntaxResult<LitTemplatePart> {
    let raw = self.str(loc);
    let start = usize::from(raw.starts_with('`'));
    let end = raw.len() - if is_end { 1 } else { 2 };
    let value = raw
      .get(start..end)
      .and_then(decode_literal)
      .ok_or_else(|| loc.error(SyntaxErrorType::InvalidCharacterEscape, None))?;
    Ok(LitTemplatePart::String(value))
  }

  // The next token must be LiteralTemplatePartString{,End}.
  pub fn lit_template_parts(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<LitTemplatePart>> {
    let t = self.consume();
    let mut is_end = match t.typ {
      TT::LiteralTemplatePartString => false,
      TT::LiteralTemplatePartStringEnd => true,
      _ => return Err(t.error(SyntaxErrorType::UnexpectedEnd)),
    };
    let mut parts = vec![self.template_part(t.loc, is_end)?];
    while !is_end {
      let substitution = self.expr(ctx, [TT::BraceClose])?;
      self.require(TT::BraceClose)?;
      parts.push(LitTemplatePart::Substitution(substitution));
      let string = self.consume_with_mode(LexMode::TemplateStrContinue);
      is_end = match string.typ {
        TT::LiteralTemplatePartString => false,
        TT::LiteralTemplatePartStringEnd => true,
        _ => return Err(string.error(SyntaxErrorType::UnexpectedEnd)),
      };
      parts.push(self.template_part(string.loc, is_end)?);
    }
    Ok(parts)
  }
}

#[cfg(test)]
mod tests {
  use super::decode_literal;

  #[test]
  fn decodes_escapes() {
    assert_eq!(decode_literal("a\\nb").as_deref(), Some("a\nb"));
    assert_eq!(decode_literal("\\x41\\u0042\\u{43}").as_deref(), Some("ABC"));
    assert_eq!(decode_literal("it\\'s").as_deref(), Some("it's"));
    assert_eq!(decode_literal("a\\\nb").as_deref(), Some("ab"));
    assert_eq!(decode_literal("\\u{zz}"), None);
  }
}
