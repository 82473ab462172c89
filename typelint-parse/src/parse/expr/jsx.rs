use crate::ast::expr::jsx::JsxAttr;
use crate::ast::expr::jsx::JsxAttrVal;
use crate::ast::expr::jsx::JsxElem;
use crate::ast::expr::jsx::JsxElemChild;
use crate::ast::expr::jsx::JsxElemName;
use crate::ast::expr::jsx::JsxExprContainer;
use crate::ast::expr::jsx::JsxMemberExpr;
use crate::ast::expr::jsx::JsxName;
use crate::ast::expr::jsx::JsxSpreadAttr;
use crate::ast::expr::jsx::JsxText;
use crate::ast::expr::IdExpr;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::lex::KEYWORDS_MAPPING;
use crate::parse::ParseCtx;
use crate::parse::Parser;
use crate::token::Token;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// JSX names may be any identifier, including keywords.
  fn jsx_name_token(&mut self) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(LexMode::JsxTag);
    if t.typ != TT::Identifier && !KEYWORDS_MAPPING.contains_key(&t.typ) {
      return Err(t.error(SyntaxErrorType::ExpectedSyntax("JSX name")));
    }
    Ok(t)
  }

  pub fn jsx_name(&mut self) -> SyntaxResult<Node<JsxName>> {
    self.with_loc(|p| {
      let start = p.jsx_name_token()?;
      Ok(
        if p
          .maybe_consume_with_mode(TT::Colon, LexMode::JsxTag)
          .is_match()
        {
          let name = p.jsx_name_token()?;
          JsxName {
            namespace: Some(p.string(start.loc)),
            name: p.string(name.loc),
          }
        } else {
          JsxName {
            namespace: None,
            name: p.string(start.loc),
          }
        },
      )
    })
  }

  /// Parses a JSX element name like `div`, `ab-cd`, `MyComponent`, `a.b.c`, or `ns:div`. Returns
  /// None for a fragment.
  pub fn jsx_elem_name(&mut self) -> SyntaxResult<Option<JsxElemName>> {
    if self.peek_with_mode(LexMode::JsxTag).typ == TT::ChevronRight {
      return Ok(None);
    }
    let start = self.jsx_name_token()?;
    let base_name = self.string(start.loc);

    if self
      .maybe_consume_with_mode(TT::Colon, LexMode::JsxTag)
      .is_match()
    {
      let name = self.jsx_name_token()?;
      return Ok(Some(JsxElemName::Name(Node::new(start.loc + name.loc, JsxName {
        namespace: Some(base_name),
        name: self.string(name.loc),
      }))));
    }

    let mut loc = start.loc;
    let mut path = Vec::<String>::new();
    if !base_name.contains('-') {
      while self
        .maybe_consume_with_mode(TT::Dot, LexMode::JsxTag)
        .is_match()
      {
        let part = self.jsx_name_token()?;
        loc += part.loc;
        path.push(self.string(part.loc));
      }
    }
    if !path.is_empty() {
      return Ok(Some(JsxElemName::Member(Node::new(loc, JsxMemberExpr {
        base: Node::new(start.loc, IdExpr { name: base_name }),
        path,
      }))));
    }

    // Lowercase names are built-in elements; anything else refers to a binding in scope.
    let is_component = base_name
      .chars()
      .next()
      .is_some_and(|c| !c.is_ascii_lowercase())
      && !base_name.contains('-');
    Ok(Some(if is_component {
      JsxElemName::Id(Node::new(loc, IdExpr { name: base_name }))
    } else {
      JsxElemName::Name(Node::new(loc, JsxName {
        namespace: None,
        name: base_name,
      }))
    }))
  }

  fn jsx_expr_container(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<JsxExprContainer>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let value = if p.peek().typ == TT::BraceClose {
        None
      } else {
        Some(p.expr(ctx, [TT::BraceClose])?)
      };
      p.require(TT::BraceClose)?;
      Ok(JsxExprContainer { value })
    })
  }

  /// Parses a JSX attribute value (comes after the equals sign).
  pub fn jsx_attr_val(&mut self, ctx: ParseCtx) -> SyntaxResult<JsxAttrVal> {
    let next = self.peek_with_mode(LexMode::JsxTag);
    Ok(match next.typ {
      TT::ChevronLeft => JsxAttrVal::Element(self.jsx_elem(ctx)?),
      TT::BraceOpen => JsxAttrVal::Expression(self.jsx_expr_container(ctx)?),
      // JSX strings have no escapes.
      TT::LiteralString => {
        let t = self.consume_with_mode(LexMode::JsxTag);
        let raw = self.str(t.loc);
        JsxAttrVal::Text(Node::new(t.loc, JsxText {
          value: raw[1..raw.len() - 1].to_string(),
        }))
      }
      _ => return Err(next.error(SyntaxErrorType::ExpectedSyntax("JSX attribute value"))),
    })
  }

  /// Parses a JSX named attribute like `key="value"`. See `JsxAttr` for other attribute types.
  pub fn jsx_named_attr(&mut self, ctx: ParseCtx) -> SyntaxResult<JsxAttr> {
    let name = self.jsx_name()?;
    let value = self
      .maybe_consume_with_mode(TT::Equals, LexMode::JsxTag)
      .and_then(|| self.jsx_attr_val(ctx))?;
    Ok(JsxAttr::Named { name, value })
  }

  /// Parses a JSX spread attribute like `{...r.getProps(true)}`.
  pub fn jsx_spread_attr(&mut self, ctx: ParseCtx) -> SyntaxResult<JsxAttr> {
    let value = self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      p.require(TT::DotDotDot)?;
      let value = p.expr(ctx, [TT::BraceClose])?;
      p.require(TT::BraceClose)?;
      Ok(JsxSpreadAttr { value })
    })?;
    Ok(JsxAttr::Spread { value })
  }

  pub fn jsx_elem_attrs(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<JsxAttr>> {
    let mut attrs = Vec::<JsxAttr>::new();
    loop {
      let next = self.peek_with_mode(LexMode::JsxTag);
      attrs.push(match next.typ {
        TT::ChevronRight | TT::Slash => break,
        TT::EOF => return Err(next.error(SyntaxErrorType::UnexpectedEnd)),
        TT::BraceOpen => self.jsx_spread_attr(ctx)?,
        _ => self.jsx_named_attr(ctx)?,
      });
    }
    Ok(attrs)
  }

  /// Parses JSX children between opening and closing tags, like text, other elements, and
  /// expressions.
  pub fn jsx_elem_children(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<JsxElemChild>> {
    let mut children = Vec::<JsxElemChild>::new();
    loop {
      let text = self.require_with_mode(TT::JsxTextContent, LexMode::JsxTextContent)?;
      if !text.loc.is_empty() {
        children.push(JsxElemChild::Text(Node::new(text.loc, JsxText {
          value: self.string(text.loc),
        })));
      };
      let next = self.peek();
      match next.typ {
        TT::ChevronLeftSlash => break,
        TT::ChevronLeft => children.push(JsxElemChild::Element(self.jsx_elem(ctx)?)),
        TT::BraceOpen => children.push(JsxElemChild::Expr(self.jsx_expr_container(ctx)?)),
        TT::EOF => return Err(next.error(SyntaxErrorType::UnexpectedEnd)),
        _ => return Err(next.error(SyntaxErrorType::ExpectedSyntax("JSX child"))),
      };
    }
    Ok(children)
  }

  // https://facebook.github.io/jsx/
  pub fn jsx_elem(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<JsxElem>> {
    self.with_loc(|p| {
      p.require_with_mode(TT::ChevronLeft, LexMode::JsxTag)?;
      let name = p.jsx_elem_name()?;
      let attributes = match name {
        Some(_) => p.jsx_elem_attrs(ctx)?,
        None => Vec::new(),
      };
      if p
        .maybe_consume_with_mode(TT::Slash, LexMode::JsxTag)
        .is_match()
      {
        // Self closing.
        p.require_with_mode(TT::ChevronRight, LexMode::JsxTag)?;
        return Ok(JsxElem {
          name,
          attributes,
          children: Vec::new(),
        });
      }
      p.require_with_mode(TT::ChevronRight, LexMode::JsxTag)?;
      let children = p.jsx_elem_children(ctx)?;
      let closing = p.require_with_mode(TT::ChevronLeftSlash, LexMode::JsxTag)?;
      let end_name = p.jsx_elem_name()?;
      let opening_spelling = name.as_ref().map(JsxElemName::spelling);
      if end_name.as_ref().map(JsxElemName::spelling) != opening_spelling {
        return Err(closing.error(SyntaxErrorType::JsxClosingTagMismatch));
      }
      p.require_with_mode(TT::ChevronRight, LexMode::JsxTag)?;
      Ok(JsxElem {
        name,
        attributes,
        children,
      })
    })
  }
}
