use super::expr::pat::is_valid_pattern_identifier;
use super::expr::Asi;
use super::ParseCtx;
use super::Parser;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::ImportExpr;
use crate::ast::import_export::ExportName;
use crate::ast::import_export::ExportNames;
use crate::ast::import_export::ImportName;
use crate::ast::import_export::ImportNames;
use crate::ast::node::Node;
use crate::ast::stmt::decl::PatDecl;
use crate::ast::stmt::ExportDefaultExprStmt;
use crate::ast::stmt::ExportListStmt;
use crate::ast::stmt::ImportStmt;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORDS_MAPPING;
use crate::parse::stmt::decl::VarDeclParseMode;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Parses `target`, `target as alias`, `default as alias`, `"target" as alias`.
  fn import_or_export_name(
    &mut self,
    ctx: ParseCtx,
    is_export: bool,
  ) -> SyntaxResult<(String, Node<IdPat>)> {
    let t0 = self.peek();
    #[rustfmt::skip]
    let (target, alias_is_required) = match t0.typ {
      TT::LiteralString => (self.lit_str_val()?, true),
      t if is_valid_pattern_identifier(t, ctx.rules) => (self.consume_as_string(), false),
      // `export { default }` is fine, `import { default }` is not.
      TT::KeywordDefault if is_export => (self.consume_as_string(), false),
      // Any other keyword is allowed, but if reserved, an alias must be used.
      t if KEYWORDS_MAPPING.contains_key(&t) => (self.consume_as_string(), true),
      _ => return Err(t0.error(SyntaxErrorType::ExpectedNotFound)),
    };
    let alias = if self.consume_if(TT::KeywordAs).is_match() {
      let t_alias = self.peek();
      if is_export && KEYWORDS_MAPPING.contains_key(&t_alias.typ) {
        // Exported names may be any keyword, like `default`.
        self.consume();
        Node::new(t_alias.loc, IdPat {
          name: self.string(t_alias.loc),
        })
      } else if is_export && t_alias.typ == TT::LiteralString {
        let name = self.lit_str_val()?;
        Node::new(t_alias.loc, IdPat { name })
      } else {
        self.id_pat(ctx)?
      }
    } else if alias_is_required && !is_export {
      return Err(t0.error(SyntaxErrorType::ExpectedSyntax("import alias")));
    } else {
      // A virtual alias, as if `a as a` had been written.
      Node::new(t0.loc, IdPat {
        name: target.clone(),
      })
    };
    Ok((target, alias))
  }

  fn module_specifier(&mut self) -> SyntaxResult<String> {
    self.lit_str_val()
  }

  fn end_of_module_stmt(&mut self) -> SyntaxResult<()> {
    let t = self.peek();
    if !self.consume_if(TT::Semicolon).is_match()
      && !t.preceded_by_line_terminator
      && !matches!(t.typ, TT::EOF | TT::BraceClose)
    {
      return Err(t.error(SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon)));
    };
    Ok(())
  }

  pub fn import_call(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ImportExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordImport)?;
      p.require(TT::ParenthesisOpen)?;
      let module = p.expr(ctx, [TT::Comma, TT::ParenthesisClose])?;
      // An options argument like `{ with: { type: "json" } }` carries no bindings.
      if p.consume_if(TT::Comma).is_match() && p.peek().typ != TT::ParenthesisClose {
        p.expr(ctx, [TT::Comma, TT::ParenthesisClose])?;
        let _ = p.consume_if(TT::Comma);
      };
      p.require(TT::ParenthesisClose)?;
      Ok(ImportExpr { module })
    })
  }

  /// Parses an import statement like:
  /// - `import "module"`
  /// - `import * as b from "module"`
  /// - `import {"b" as c, d, e as f, default as g} from "module"`
  /// - `import a from "module"`
  /// - `import a, * as b from "module"`
  /// - `import a, {b} from "module"`
  pub fn import_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ImportStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordImport)?;
      if p.peek().typ == TT::LiteralString {
        let module = p.module_specifier()?;
        p.end_of_module_stmt()?;
        return Ok(ImportStmt {
          default: None,
          names: None,
          module,
        });
      };
      let (default, can_have_names) = if is_valid_pattern_identifier(p.peek().typ, ctx.rules) {
        let alias = p.id_pat_decl(ctx)?;
        (Some(alias), p.consume_if(TT::Comma).is_match())
      } else {
        (None, true)
      };
      let names = if !can_have_names {
        None
      } else if p.consume_if(TT::Asterisk).is_match() {
        p.require(TT::KeywordAs)?;
        Some(ImportNames::All(p.id_pat_decl(ctx)?))
      } else {
        p.require(TT::BraceOpen)?;
        let names = p.list_with_loc(TT::Comma, TT::BraceClose, |p| {
          let (importable, alias) = p.import_or_export_name(ctx, false)?;
          let alias = alias.wrap_decl();
          Ok(ImportName { importable, alias })
        })?;
        Some(ImportNames::Specific(names))
      };
      p.require(TT::KeywordFrom)?;
      let module = p.module_specifier()?;
      p.end_of_module_stmt()?;
      Ok(ImportStmt {
        default,
        names,
        module,
      })
    })
  }

  /// Parses an export statement like:
  /// - `export * from "module"`
  /// - `export * as a from "module"`
  /// - `export {a, b as c, d as default}`
  /// - `export {a, default as b} from "module"`
  /// - `export default function a() {}`
  /// - `export default class A {}`
  /// - `export default a + b`
  /// - `export const a = 1`
  /// - `export function a() {}`
  /// - `export class A {}`
  pub fn export_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let [_, t1, t2, t3] = self.peek_n::<4>();
    Ok(match t1.typ {
      TT::BraceOpen | TT::Asterisk => self.export_list_stmt(ctx)?.into_wrapped(),
      TT::KeywordDefault => match (t2.typ, t3.typ) {
        (TT::KeywordFunction, _) | (TT::KeywordAsync, TT::KeywordFunction) => {
          self.func_decl(ctx)?.into_wrapped()
        }
        (TT::KeywordClass, _) => self.class_decl(ctx)?.into_wrapped(),
        _ => self.export_default_expr_stmt(ctx)?.into_wrapped(),
      },
      TT::KeywordVar | TT::KeywordLet | TT::KeywordConst => {
        self.var_decl(ctx, VarDeclParseMode::Asi)?.into_wrapped()
      }
      TT::KeywordFunction | TT::KeywordAsync => self.func_decl(ctx)?.into_wrapped(),
      TT::KeywordClass => self.class_decl(ctx)?.into_wrapped(),
      _ => return Err(t1.error(SyntaxErrorType::ExpectedSyntax("exportable"))),
    })
  }

  fn export_list_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ExportListStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordExport)?;
      let names = if p.consume_if(TT::Asterisk).is_match() {
        let alias = p
          .consume_if(TT::KeywordAs)
          .and_then(|| p.id_pat(ctx))?;
        ExportNames::All(alias)
      } else {
        p.require(TT::BraceOpen)?;
        let names = p.list_with_loc(TT::Comma, TT::BraceClose, |p| {
          let (exportable, alias) = p.import_or_export_name(ctx, true)?;
          Ok(ExportName { exportable, alias })
        })?;
        ExportNames::Specific(names)
      };
      let from = p
        .consume_if(TT::KeywordFrom)
        .and_then(|| p.module_specifier())?;
      if from.is_none() && matches!(names, ExportNames::All(_)) {
        return Err(p.peek().error(SyntaxErrorType::RequiredTokenNotFound(TT::KeywordFrom)));
      };
      p.end_of_module_stmt()?;
      Ok(ExportListStmt { names, from })
    })
  }

  fn export_default_expr_stmt(
    &mut self,
    ctx: ParseCtx,
  ) -> SyntaxResult<Node<ExportDefaultExprStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordExport)?;
      p.require(TT::KeywordDefault)?;
      let mut asi = Asi::can();
      let expression = p.expr_with_asi(ctx, [TT::Semicolon], &mut asi)?;
      if !asi.did_end_with_asi {
        p.require(TT::Semicolon)?;
      };
      Ok(ExportDefaultExprStmt { expression })
    })
  }
}

impl Node<IdPat> {
  fn wrap_decl(self) -> Node<PatDecl> {
    let loc = self.loc;
    Node::new(loc, PatDecl {
      pat: self.into_wrapped(),
    })
  }
}
