use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::decl::ParamDecl;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Parses `(a, [b, c] = d, ...rest)`. A rest parameter must come last.
  pub fn func_params(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<ParamDecl>>> {
    self.require(TT::ParenthesisOpen)?;
    let parameters = self.list_with_loc(TT::Comma, TT::ParenthesisClose, |p| {
      let rest = p.consume_if(TT::DotDotDot).is_match();
      let pattern = p.pat_decl(ctx)?;
      let default_value = p
        .consume_if(TT::Equals)
        .and_then(|| p.expr(ctx, [TT::Comma, TT::ParenthesisClose]))?;
      Ok(ParamDecl {
        rest,
        pattern,
        default_value,
      })
    })?;
    if let Some(p) = parameters
      .iter()
      .rev()
      .skip(1)
      .find(|p| p.stx.rest)
    {
      return Err(p.error(SyntaxErrorType::ExpectedSyntax("rest parameter last")));
    };
    Ok(parameters)
  }

  pub fn parse_func_block_body(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<Stmt>>> {
    self.require(TT::BraceOpen)?;
    let body = self.stmts(ctx, TT::BraceClose)?;
    self.require(TT::BraceClose)?;
    Ok(body)
  }
}
