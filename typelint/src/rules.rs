//! The checks run over a file: assignments, call arguments and returns.
use crate::diagnostics::Diagnostic;
use crate::error::FatalError;
use crate::host::FileKey;
use crate::options::LintOptions;
use crate::options::Rule;
use crate::relate::is_of_type;
use crate::resolve::Resolver;
use crate::session::FileInfo;
use crate::types::FunctionType;
use crate::types::TypeId;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use typelint_parse::ast::expr::BinaryExpr;
use typelint_parse::ast::expr::CallExpr;
use typelint_parse::ast::expr::Expr;
use typelint_parse::ast::func::Func;
use typelint_parse::ast::func::FuncBody;
use typelint_parse::ast::node::Node;
use typelint_parse::ast::stmt::decl::VarDecl;
use typelint_parse::ast::stmt::ReturnStmt;
use typelint_parse::loc::Loc;
use typelint_parse::operator::OperatorName;

type VarDeclNode = Node<VarDecl>;
type BinaryExprNode = Node<BinaryExpr>;
type CallExprNode = Node<CallExpr>;
type ReturnStmtNode = Node<ReturnStmt>;
type FuncNode = Node<Func>;

/// Runs every rule enabled in `options` over a loaded file.
pub fn check(
  resolver: &Resolver<'_>,
  info: &FileInfo,
  options: &LintOptions,
) -> Result<Vec<Diagnostic>, FatalError> {
  let Some(ast) = info.ast() else {
    return Ok(Vec::new());
  };
  let mut checker = Checker {
    resolver,
    file: &info.key,
    info,
    options,
    returns: Vec::new(),
    diagnostics: Vec::new(),
    fatal: None,
  };
  ast.drive(&mut checker);
  match checker.fatal {
    Some(err) => Err(err),
    None => Ok(checker.diagnostics),
  }
}

fn is_function_expr(expr: &Node<Expr>) -> bool {
  matches!(expr.stx.as_ref(), Expr::ArrowFunc(_) | Expr::Func(_))
}

#[derive(Visitor)]
#[visitor(
  VarDeclNode(enter),
  BinaryExprNode(enter),
  CallExprNode(enter),
  ReturnStmtNode(enter),
  FuncNode(enter, exit)
)]
struct Checker<'c, 'a> {
  resolver: &'c Resolver<'a>,
  file: &'c FileKey,
  info: &'c FileInfo,
  options: &'c LintOptions,
  // Declared return type of each enclosing function, innermost last.
  returns: Vec<TypeId>,
  diagnostics: Vec<Diagnostic>,
  fatal: Option<FatalError>,
}

impl Checker<'_, '_> {
  fn run(&mut self, rule: Rule, check: impl FnOnce(&mut Self) -> Result<(), FatalError>) {
    if self.fatal.is_some() || !self.options.is_enabled(rule) {
      return;
    }
    if let Err(err) = check(self) {
      self.fatal = Some(err);
    }
  }

  fn report(&mut self, rule: Rule, loc: Loc, message: String) {
    let (line, column) = self.info.lines.position(loc.0);
    self.diagnostics.push(Diagnostic {
      code: rule.name(),
      file: self.file.clone(),
      loc,
      line,
      column,
      message,
    });
  }

  fn resolve(&self, expr: &Node<Expr>) -> Result<TypeId, FatalError> {
    self.resolver.resolve_expr(self.file, expr)
  }

  fn is_any(&self, typ: TypeId) -> bool {
    self.resolver.session().store().is_any(typ)
  }

  fn accepts(&self, value: TypeId, required: TypeId) -> bool {
    is_of_type(&self.resolver.session().store(), value, required)
  }

  fn accepts_undefined(&self, required: TypeId) -> bool {
    let undefined = self.resolver.session().store_mut().undefined();
    self.accepts(undefined, required)
  }

  fn show(&self, typ: TypeId) -> String {
    self.resolver.session().store().display(typ).to_string()
  }

  fn show_grouped(&self, typ: TypeId) -> String {
    self.resolver.session().store().display_grouped(typ).to_string()
  }

  // Object literals are described by their syntax, their inferred record is noise.
  fn show_value(&self, expr: &Node<Expr>, typ: TypeId) -> String {
    match expr.stx.as_ref() {
      Expr::LitObj(_) => "(object literal)".to_string(),
      _ => self.show(typ),
    }
  }

  fn check_var_decl(&mut self, node: &VarDeclNode) -> Result<(), FatalError> {
    for (i, declarator) in node.stx.declarators.iter().enumerate() {
      let Some(init) = &declarator.stx.initializer else {
        continue;
      };
      if is_function_expr(init) {
        continue;
      }
      let site = if i == 0 { node.loc } else { declarator.loc };
      let Some(declared) = self.info.declared_at(site.0) else {
        continue;
      };
      let actual = self.resolve(init)?;
      if self.is_any(actual) || self.accepts(actual, declared) {
        continue;
      }
      let message = format!(
        "can't initialize variable of type {} with value of type {}",
        self.show(declared),
        self.show_value(init, actual)
      );
      self.report(Rule::AssignmentTypesMustMatch, declarator.loc, message);
    }
    Ok(())
  }

  fn check_assignment(&mut self, node: &BinaryExprNode) -> Result<(), FatalError> {
    if node.stx.operator != OperatorName::Assignment {
      return Ok(());
    }
    let target = &node.stx.left;
    if !matches!(
      target.stx.as_ref(),
      Expr::Id(_) | Expr::IdPat(_) | Expr::Member(_) | Expr::ComputedMember(_)
    ) {
      return Ok(());
    }
    let declared = self.resolve(target)?;
    if self.is_any(declared) {
      return Ok(());
    }
    let value = &node.stx.right;
    let actual = self.resolve(value)?;
    if self.is_any(actual) || self.accepts(actual, declared) {
      return Ok(());
    }
    let message = format!(
      "can't assign type {} to variable of type {}",
      self.show_value(value, actual),
      self.show(declared)
    );
    self.report(Rule::AssignmentTypesMustMatch, node.loc, message);
    Ok(())
  }

  // The callee's name and type, for calls of plain identifiers with no spread arguments.
  fn callee(&self, node: &CallExprNode) -> Result<Option<(String, FunctionType)>, FatalError> {
    let Expr::Id(id) = node.stx.callee.stx.as_ref() else {
      return Ok(None);
    };
    if node.stx.arguments.iter().any(|arg| arg.stx.spread) {
      return Ok(None);
    }
    let callee = self.resolve(&node.stx.callee)?;
    let func = self.resolver.session().store().as_function(callee).cloned();
    Ok(func.map(|func| (id.stx.name.clone(), func)))
  }

  fn check_args_length(&mut self, node: &CallExprNode) -> Result<(), FatalError> {
    let Some((name, func)) = self.callee(node)? else {
      return Ok(());
    };
    if func.rest.is_some() {
      return Ok(());
    }
    let provided = node.stx.arguments.len();
    let expected = func.arg_count();
    let omitted_are_optional = func
      .args
      .iter()
      .skip(provided)
      .all(|arg| !self.is_any(*arg) && self.accepts_undefined(*arg));
    if provided == expected || (provided < expected && omitted_are_optional) {
      return Ok(());
    }
    let message = if expected == 0 {
      format!("function {name} expects no arguments but was called with {provided}")
    } else {
      format!("function {name} expects {expected} arguments but was called with {provided}")
    };
    self.report(Rule::FunctionArgsLengthMustMatch, node.loc, message);
    Ok(())
  }

  fn check_args_types(&mut self, node: &CallExprNode) -> Result<(), FatalError> {
    let Some((name, func)) = self.callee(node)? else {
      return Ok(());
    };
    for (i, arg) in node.stx.arguments.iter().enumerate() {
      let Some(expected) = func.args.get(i).copied().or(func.rest) else {
        break;
      };
      if self.is_any(expected) {
        continue;
      }
      let value = &arg.stx.value;
      let actual = self.resolve(value)?;
      if self.is_any(actual) || self.accepts(actual, expected) {
        continue;
      }
      let message = format!(
        "type {} expected for argument {i} in call to {name} but {} provided",
        self.show_grouped(expected),
        self.show_value(value, actual)
      );
      self.report(Rule::FunctionArgsTypesMustMatch, value.loc, message);
    }
    if self.options.ignore_trailing_undefineds {
      return Ok(());
    }
    for (i, expected) in func
      .args
      .iter()
      .enumerate()
      .skip(node.stx.arguments.len())
    {
      if self.is_any(*expected) || self.accepts_undefined(*expected) {
        continue;
      }
      let message = format!(
        "type {} expected for argument {i} in call to {name} but undefined implicitly provided",
        self.show_grouped(*expected)
      );
      self.report(Rule::FunctionArgsTypesMustMatch, node.loc, message);
    }
    Ok(())
  }

  fn check_return(&mut self, loc: Loc, value: Option<&Node<Expr>>) -> Result<(), FatalError> {
    let Some(declared) = self.returns.last().copied() else {
      return Ok(());
    };
    if self.is_any(declared) {
      return Ok(());
    }
    let message = match value {
      Some(value) => {
        let actual = self.resolve(value)?;
        if self.is_any(actual) || self.accepts(actual, declared) {
          return Ok(());
        }
        format!(
          "returning {} from a function declared to return {}",
          self.show_value(value, actual),
          self.show(declared)
        )
      }
      None => {
        if self.options.allow_implicit_undefineds || self.accepts_undefined(declared) {
          return Ok(());
        }
        format!(
          "returning an implicit undefined from a function declared to return {}",
          self.show(declared)
        )
      }
    };
    self.report(Rule::FunctionReturnTypeMustMatch, loc, message);
    Ok(())
  }

  fn enter_var_decl_node(&mut self, node: &VarDeclNode) {
    self.run(Rule::AssignmentTypesMustMatch, |c| c.check_var_decl(node));
  }

  fn enter_binary_expr_node(&mut self, node: &BinaryExprNode) {
    self.run(Rule::AssignmentTypesMustMatch, |c| c.check_assignment(node));
  }

  fn enter_call_expr_node(&mut self, node: &CallExprNode) {
    self.run(Rule::FunctionArgsLengthMustMatch, |c| c.check_args_length(node));
    self.run(Rule::FunctionArgsTypesMustMatch, |c| c.check_args_types(node));
  }

  fn enter_return_stmt_node(&mut self, node: &ReturnStmtNode) {
    self.run(Rule::FunctionReturnTypeMustMatch, |c| {
      c.check_return(node.loc, node.stx.value.as_ref())
    });
  }

  fn enter_func_node(&mut self, node: &FuncNode) {
    let ret = match self.resolver.function_type(self.file, node) {
      Ok(func) => {
        let store = self.resolver.session().store();
        store.as_function(func).map_or(store.any(), |f| f.ret)
      }
      Err(err) => {
        self.fatal.get_or_insert(err);
        self.resolver.session().store().any()
      }
    };
    self.returns.push(ret);
    if let FuncBody::Expression(body) = &node.stx.body {
      self.run(Rule::FunctionReturnTypeMustMatch, |c| {
        c.check_return(body.loc, Some(body))
      });
    }
  }

  fn exit_func_node(&mut self, _node: &FuncNode) {
    self.returns.pop();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::host::MemoryHost;
  use crate::session::AnalysisSession;

  fn messages_with(source: &str, options: LintOptions) -> Vec<String> {
    let mut session = AnalysisSession::new(MemoryHost::new().with_file("a.js", source), options);
    session
      .check(&FileKey::new("a.js"))
      .unwrap()
      .into_iter()
      .map(|d| d.message)
      .collect()
  }

  fn messages(source: &str) -> Vec<String> {
    messages_with(source, LintOptions::default())
  }

  #[test]
  fn reports_mismatched_initializers() {
    assert_eq!(
      messages(
        r#"
/** @type {number} */
const jsx = <div />;
/** @type {number|undefined} */
let a = true;
/** @type {string} */
var unset;
/** @type {number} */
let ok = 1;
/** @type {number} */
let fromCall = untyped();
"#
      ),
      vec![
        "can't initialize variable of type number with value of type JSXElement",
        "can't initialize variable of type number|undefined with value of type boolean",
      ]
    );
  }

  #[test]
  fn reports_mismatched_assignments() {
    assert_eq!(
      messages(
        r#"
/** @type {string|undefined} */
let maybe;
/** @type {string} */
let definitely = 'a';
definitely = maybe;
let loose = 1;
loose = 'anything';
"#
      ),
      vec!["can't assign type string|undefined to variable of type string"]
    );
  }

  #[test]
  fn reports_argument_counts() {
    assert_eq!(
      messages(
        r#"
function foo(x, y, z) {}
foo(1, 2);
function none() {}
none(1, 2);
/**
 * @param {number} x
 * @param {boolean} [z=true]
 */
function optional(x, z) {}
optional(1);
/** @param {...number} nums */
function variadic(...nums) {}
variadic();
obj.method(1, 2, 3);
"#
      ),
      vec![
        "function foo expects 3 arguments but was called with 2",
        "function none expects no arguments but was called with 2",
      ]
    );
  }

  #[test]
  fn reports_argument_types() {
    let source = r#"
/**
 * @param {number} a
 * @param {string|undefined} b
 * @param {boolean} c
 */
function foo(a, b, c) {}
foo(1, 2, true);
foo(1, 'x');
/** @param {...string} rest */
function joined(...rest) {}
joined('a', 1);
"#;
    let only_types = LintOptions::only([Rule::FunctionArgsTypesMustMatch]);
    assert_eq!(messages_with(source, only_types.clone()), vec![
      "type (string|undefined) expected for argument 1 in call to foo but number provided",
      "type boolean expected for argument 2 in call to foo but undefined implicitly provided",
      "type string expected for argument 1 in call to joined but number provided",
    ]);
    let lenient = LintOptions {
      ignore_trailing_undefineds: true,
      ..only_types
    };
    assert_eq!(messages_with(source, lenient), vec![
      "type (string|undefined) expected for argument 1 in call to foo but number provided",
      "type string expected for argument 1 in call to joined but number provided",
    ]);
  }

  #[test]
  fn reports_returns() {
    let source = r#"
/** @return {number} */
function implicit() {
  return;
}
/** @return {number} */
function wrong() {
  return 'x';
}
/** @return {number} */
function nested() {
  const inner = () => 'fine';
  return 1;
}
/** @type {function(): string} */
const arrow = () => 1;
function untyped() {
  return;
}
"#;
    assert_eq!(messages(source), vec![
      "returning an implicit undefined from a function declared to return number",
      "returning string from a function declared to return number",
      "returning number from a function declared to return string",
    ]);
    let allowing = LintOptions {
      allow_implicit_undefineds: true,
      ..LintOptions::default()
    };
    assert_eq!(messages_with(source, allowing), vec![
      "returning string from a function declared to return number",
      "returning number from a function declared to return string",
    ]);
  }

  #[test]
  fn functions_satisfy_object_parameters() {
    let source = r#"
/**
 * @param {object} o
 * @param {Function} f
 */
function take(o, f) {}
take(() => 1, function () {});
take(1, () => 1);
"#;
    assert_eq!(messages(source), vec![
      "type object expected for argument 0 in call to take but number provided",
    ]);
  }

  #[test]
  fn disabled_rules_are_skipped() {
    let source = "/** @type {number} */\nlet x = 'a';\nfunction f() {}\nf(1);\n";
    let options = LintOptions::only([Rule::FunctionArgsLengthMustMatch]);
    assert_eq!(messages_with(source, options), vec![
      "function f expects no arguments but was called with 1"
    ]);
  }

  #[test]
  fn diagnostics_carry_positions_and_codes() {
    let mut session = AnalysisSession::new(
      MemoryHost::new().with_file("a.js", "/** @type {number} */\nlet x = 'a';\n"),
      LintOptions::default(),
    );
    let diagnostics = session.check(&FileKey::new("a.js")).unwrap();
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, "assignment-types-must-match");
    assert_eq!((diagnostic.line, diagnostic.column), (2, 5));
    assert_eq!(
      diagnostic.to_string(),
      "a.js:2:5: can't initialize variable of type number with value of type string [assignment-types-must-match]"
    );
  }
}
