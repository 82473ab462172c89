use super::expr::pat::ParsePatternRules;
use super::expr::Asi;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassMember;
use crate::ast::class_or_object::ClassOrObjGetter;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjMethod;
use crate::ast::class_or_object::ClassOrObjSetter;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::func::Func;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORDS_MAPPING;
use crate::token::Token;
use crate::token::TT;

// Whether a modifier like `async`, `get`, or `static` is actually being used as the key itself,
// as in `{ get: 1 }` or `class A { static() {} }`.
fn modifier_is_key(next: Token) -> bool {
  matches!(
    next.typ,
    TT::ParenthesisOpen
      | TT::Colon
      | TT::Comma
      | TT::BraceClose
      | TT::Equals
      | TT::Semicolon
      | TT::EOF
  )
}

impl<'a> Parser<'a> {
  pub fn class_body(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<ClassMember>>> {
    self.require(TT::BraceOpen)?;
    let mut members = Vec::new();
    loop {
      while self.consume_if(TT::Semicolon).is_match() {}
      if self.consume_if(TT::BraceClose).is_match() {
        break;
      };
      let member = self.with_loc(|p| {
        // `static` must always come first if present.
        let [_, next] = p.peek_n::<2>();
        let static_ = !modifier_is_key(next) && p.consume_if(TT::KeywordStatic).is_match();
        let (key, val) = p.class_or_obj_member(ctx, true)?;
        Ok(ClassMember { key, static_, val })
      })?;
      members.push(member);
    }
    Ok(members)
  }

  /// Parses a class or object key like `a`, `'a'`, `#a`, `"a"`, `1`, `[1]`.
  pub fn class_or_obj_key(&mut self, ctx: ParseCtx) -> SyntaxResult<ClassOrObjKey> {
    Ok(if self.consume_if(TT::BracketOpen).is_match() {
      let key = self.expr(ctx, [TT::BracketClose])?;
      self.require(TT::BracketClose)?;
      ClassOrObjKey::Computed(key)
    } else {
      ClassOrObjKey::Direct(self.with_loc(|p| {
        let t = p.peek();
        let key = match t.typ {
          TT::LiteralString => p.lit_str_val()?,
          TT::LiteralNumber => p.lit_num_val()?.to_string(),
          TT::LiteralBigInt => p.lit_bigint()?.stx.value,
          TT::PrivateMember | TT::Identifier => p.consume_as_string(),
          // Any keyword is allowed as a key.
          t if KEYWORDS_MAPPING.contains_key(&t) => p.consume_as_string(),
          _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("keyword or identifier"))),
        };
        Ok(ClassOrObjMemberDirectKey { key, tt: t.typ })
      })?)
    })
  }

  fn method_func(
    &mut self,
    ctx: ParseCtx,
    is_async: bool,
    generator: bool,
  ) -> SyntaxResult<Node<Func>> {
    self.with_loc(|p| {
      let fn_ctx = ctx.with_rules(ParsePatternRules {
        await_allowed: !is_async && ctx.rules.await_allowed,
        yield_allowed: !generator && ctx.rules.yield_allowed,
      });
      let parameters = p.func_params(fn_ctx)?;
      let body = p.parse_func_block_body(fn_ctx)?.into();
      Ok(Func {
        arrow: false,
        async_: is_async,
        generator,
        parameters,
        body,
      })
    })
  }

  // It's strictly one of these:
  // - <key> [ ( ':' | '=' ) <expr> ]?
  // - async? '*'? <key> '(' ...
  // - [ get | set ] <key> '(' ...
  // where <key> = <ident> | <keyword> | <str> | <num> | '[' <expr> ']'
  pub fn class_or_obj_member(
    &mut self,
    ctx: ParseCtx,
    is_class: bool,
  ) -> SyntaxResult<(ClassOrObjKey, ClassOrObjVal)> {
    let [a, b] = self.peek_n::<2>();
    let is_async =
      a.typ == TT::KeywordAsync && !modifier_is_key(b) && !b.preceded_by_line_terminator;
    if is_async {
      self.consume();
    };
    let generator = self.consume_if(TT::Asterisk).is_match();
    let accessor = match a.typ {
      TT::KeywordGet | TT::KeywordSet if !is_async && !generator && !modifier_is_key(b) => {
        self.consume();
        Some(a.typ)
      }
      _ => None,
    };

    let key = self.class_or_obj_key(ctx)?;
    let start = self.checkpoint();
    if self.peek().typ == TT::ParenthesisOpen {
      let func = self.method_func(ctx, is_async, generator)?;
      let loc = self.since_checkpoint(&start);
      let val: ClassOrObjVal = match accessor {
        Some(TT::KeywordGet) => {
          if !func.stx.parameters.is_empty() {
            return Err(func.error(SyntaxErrorType::ExpectedSyntax("getter without parameters")));
          }
          Node::new(loc, ClassOrObjGetter { func }).into()
        }
        Some(_) => {
          if func.stx.parameters.len() != 1 || func.stx.parameters[0].stx.rest {
            return Err(func.error(SyntaxErrorType::ExpectedSyntax("setter with one parameter")));
          }
          Node::new(loc, ClassOrObjSetter { func }).into()
        }
        None => Node::new(loc, ClassOrObjMethod { func }).into(),
      };
      return Ok((key, val));
    };
    if is_async || generator || accessor.is_some() {
      return Err(self.peek().error(SyntaxErrorType::RequiredTokenNotFound(TT::ParenthesisOpen)));
    };

    let initializer = if is_class {
      let mut asi = Asi::can();
      let init = self
        .consume_if(TT::Equals)
        .and_then(|| self.expr_with_asi(ctx, [TT::Semicolon, TT::BraceClose], &mut asi))?;
      if !asi.did_end_with_asi && !matches!(self.peek().typ, TT::BraceClose) {
        let t = self.peek();
        if !t.preceded_by_line_terminator {
          self.require(TT::Semicolon)?;
        }
      };
      init
    } else {
      self
        .consume_if(TT::Colon)
        .and_then(|| self.expr(ctx, [TT::Comma, TT::BraceClose]))?
    };
    Ok((key, ClassOrObjVal::Prop(initializer)))
  }
}
