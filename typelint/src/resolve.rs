//! Computing the type of an expression or binding.
//!
//! A [`Resolver`] answers queries against the files of one [`AnalysisSession`]. It
//! combines the types declared in annotation comments with inference from the shape
//! of literals and operators, follows identifiers back to their declarations through
//! a [`BindingLookup`], and crosses into other files through imports.
//!
//! Queries about symbols and exports are memoized per resolver. A query that is
//! asked again while it is still being answered (for example two modules that
//! re-export each other's bindings) resolves to `any` instead of recursing forever.
use crate::error::FatalError;
use crate::host::FileKey;
use crate::session::AnalysisSession;
use crate::session::ExportedDecl;
use crate::session::FileInfo;
use crate::session::ImportedRef;
use crate::types::FunctionType;
use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use std::cell::RefCell;
use std::cell::RefMut;
use std::rc::Rc;
use tracing::debug;
use tracing::debug_span;
use typelint_parse::ast::class_or_object::ClassOrObjVal;
use typelint_parse::ast::class_or_object::ObjMemberType;
use typelint_parse::ast::expr::lit::LitArrElem;
use typelint_parse::ast::expr::lit::LitObjExpr;
use typelint_parse::ast::expr::pat::Pat;
use typelint_parse::ast::expr::BinaryExpr;
use typelint_parse::ast::expr::Expr;
use typelint_parse::ast::func::Func;
use typelint_parse::ast::node::Node;
use typelint_parse::ast::stmt::decl::VarDecl;
use typelint_parse::ast::stmt::decl::VarDeclMode;
use typelint_parse::ast::stmt::decl::VarDeclarator;
use typelint_parse::ast::TopLevel;
use typelint_parse::loc::Loc;
use typelint_parse::operator::OperatorName;
use typelint_scope::bind_module;
use typelint_scope::Decl;
use typelint_scope::Imported;
use typelint_scope::ModuleBindings;
use typelint_scope::PatStep;
use typelint_scope::SymbolData;
use typelint_scope::SymbolId;

type Resolved = Result<TypeId, FatalError>;

/// Which declaration an identifier refers to, as decided by scope analysis.
pub trait BindingLookup<'a> {
  /// The symbol an identifier usage or declaration at `loc` refers to.
  fn binding_at(&self, loc: Loc) -> Option<SymbolId>;
  fn symbol(&self, id: SymbolId) -> &SymbolData<'a>;
  /// A symbol declared in the module's top level scope.
  fn top_level(&self, name: &str) -> Option<SymbolId>;
  /// Location of the syntax whose annotation comment describes the function at `func`.
  fn function_site(&self, func: Loc) -> Loc;
}

impl<'a> BindingLookup<'a> for ModuleBindings<'a> {
  fn binding_at(&self, loc: Loc) -> Option<SymbolId> {
    self.symbol_at(loc)
  }

  fn symbol(&self, id: SymbolId) -> &SymbolData<'a> {
    ModuleBindings::symbol(self, id)
  }

  fn top_level(&self, name: &str) -> Option<SymbolId> {
    self.top_level_symbol(name)
  }

  fn function_site(&self, func: Loc) -> Loc {
    self.func_site(func)
  }
}

pub type Bindings<'a> = Rc<dyn BindingLookup<'a> + 'a>;

type BindFn<'a> = Box<dyn Fn(&'a Node<TopLevel>) -> Bindings<'a> + 'a>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum QueryKey {
  Symbol(FileKey, SymbolId),
  Export(FileKey, String),
  Function(FileKey, Loc),
}

// The file a query is being answered in.
struct Ctx<'a> {
  info: &'a FileInfo,
  bindings: Bindings<'a>,
}

pub struct Resolver<'a> {
  session: &'a AnalysisSession,
  bind: BindFn<'a>,
  bindings: RefCell<HashMap<FileKey, Bindings<'a>>>,
  in_progress: RefCell<HashSet<QueryKey>>,
  memo: RefCell<HashMap<QueryKey, TypeId>>,
}

impl<'a> Resolver<'a> {
  /// A resolver that binds identifiers with [`bind_module`].
  pub fn new(session: &'a AnalysisSession) -> Self {
    Self::with_bindings(session, |ast| Rc::new(bind_module(ast)))
  }

  /// A resolver that asks `bind` for the bindings of each file it visits.
  pub fn with_bindings(
    session: &'a AnalysisSession,
    bind: impl Fn(&'a Node<TopLevel>) -> Bindings<'a> + 'a,
  ) -> Self {
    Resolver {
      session,
      bind: Box::new(bind),
      bindings: RefCell::new(HashMap::new()),
      in_progress: RefCell::new(HashSet::new()),
      memo: RefCell::new(HashMap::new()),
    }
  }

  pub fn session(&self) -> &'a AnalysisSession {
    self.session
  }

  fn store(&self) -> RefMut<'_, TypeStore> {
    self.session.store_mut()
  }

  fn any(&self) -> TypeId {
    self.session.store().any()
  }

  fn primitive(&self, name: &str) -> TypeId {
    self.store().primitive(name)
  }

  fn ctx(&self, file: &FileKey) -> Option<Ctx<'a>> {
    let session = self.session;
    let info = session.file(file)?;
    let ast = info.ast()?;
    let bindings = self
      .bindings
      .borrow_mut()
      .entry(file.clone())
      .or_insert_with(|| (self.bind)(ast))
      .clone();
    Some(Ctx { info, bindings })
  }

  fn guarded(&self, key: QueryKey, query: impl FnOnce() -> Resolved) -> Resolved {
    if let Some(typ) = self.memo.borrow().get(&key).copied() {
      return Ok(typ);
    }
    if !self.in_progress.borrow_mut().insert(key.clone()) {
      debug!(query = ?key, "cycle while resolving, using any");
      return Ok(self.any());
    }
    let span = debug_span!("resolve", query = ?key, type_id = tracing::field::Empty);
    let result = span.in_scope(query);
    self.in_progress.borrow_mut().remove(&key);
    let typ = result?;
    span.record("type_id", typ.raw());
    self.memo.borrow_mut().insert(key, typ);
    Ok(typ)
  }

  /// The type of `expr`, which must belong to the AST of `file`.
  pub fn resolve_expr(&self, file: &FileKey, expr: &Node<Expr>) -> Resolved {
    match self.ctx(file) {
      Some(ctx) => self.expr(&ctx, expr),
      None => Ok(self.any()),
    }
  }

  /// The type of a function in `file`, combining its annotation with its parameter list.
  pub fn function_type(&self, file: &FileKey, func: &Node<Func>) -> Resolved {
    match self.ctx(file) {
      Some(ctx) => self.func(&ctx, func),
      None => Ok(self.any()),
    }
  }

  /// The type of a binding declared in the top level scope of `file`.
  pub fn top_level_type(&self, file: &FileKey, name: &str) -> Resolved {
    let Some(ctx) = self.ctx(file) else {
      return Ok(self.any());
    };
    match ctx.bindings.top_level(name) {
      Some(symbol) => self.symbol(&ctx, symbol),
      None => Ok(self.any()),
    }
  }

  /// The type of the value `file` exports as `name`, following re-exports.
  pub fn export_type(&self, file: &FileKey, name: &str) -> Resolved {
    if name == "default" {
      return self.default_export_type(file);
    }
    self.guarded(QueryKey::Export(file.clone(), name.to_string()), || {
      match self.session.get_named_export(file, name) {
        Some((owner, decl)) => self.exported(owner, decl),
        None => {
          debug!(file = %file, name, "no such export");
          Ok(self.any())
        }
      }
    })
  }

  /// The type of the default export of `file`.
  pub fn default_export_type(&self, file: &FileKey) -> Resolved {
    self.guarded(QueryKey::Export(file.clone(), "default".to_string()), || {
      match self.session.get_default_export(file) {
        Some((owner, decl)) => self.exported(owner, decl),
        None => {
          debug!(file = %file, "no default export");
          Ok(self.any())
        }
      }
    })
  }

  fn exported(&self, owner: &'a FileInfo, decl: ExportedDecl<'a>) -> Resolved {
    let Some(ctx) = self.ctx(&owner.key) else {
      return Ok(self.any());
    };
    match decl {
      ExportedDecl::Var { decl, declarator } => self.var(&ctx, decl, declarator, &[]),
      ExportedDecl::Function(func) => self.func(&ctx, &func.stx.function),
      ExportedDecl::Class(_) => Ok(self.any()),
      ExportedDecl::Local(local) => match ctx.bindings.top_level(local) {
        Some(symbol) => self.symbol(&ctx, symbol),
        None => Ok(self.any()),
      },
      ExportedDecl::Expr(expr) => self.expr(&ctx, expr),
      ExportedDecl::Reexport { module, imported } => {
        let Some(target) = owner.module(module) else {
          return Ok(self.any());
        };
        match imported {
          ImportedRef::Default => self.default_export_type(target),
          ImportedRef::Named(name) => self.export_type(target, name),
          ImportedRef::Namespace => Ok(self.any()),
        }
      }
    }
  }

  fn symbol(&self, ctx: &Ctx<'a>, id: SymbolId) -> Resolved {
    self.guarded(QueryKey::Symbol(ctx.info.key.clone(), id), || {
      let data = ctx.bindings.symbol(id);
      match &data.decl {
        Decl::Function(decl) => self.func(ctx, &decl.stx.function),
        Decl::FunctionExprName(expr) => self.func(ctx, &expr.stx.func),
        Decl::Param {
          func,
          index,
          rest,
          path,
        } => self.param(ctx, func, *index, *rest, &data.name, path),
        Decl::Var {
          decl,
          declarator,
          path,
        } => self.var(ctx, decl, declarator, path),
        Decl::Import { module, imported } => {
          let Some(target) = ctx.info.module(module) else {
            return Ok(self.any());
          };
          match imported {
            Imported::Default => self.default_export_type(target),
            Imported::Named(name) => self.export_type(target, name),
            Imported::Namespace => Ok(self.any()),
          }
        }
        Decl::Class(_) | Decl::ClassExprName(_) | Decl::ForBinding(_) | Decl::CatchParam => {
          Ok(self.any())
        }
      }
    })
  }

  fn param(
    &self,
    ctx: &Ctx<'a>,
    func: &Node<Func>,
    index: usize,
    rest: bool,
    name: &str,
    path: &[PatStep],
  ) -> Resolved {
    let func_type = self.func(ctx, func)?;
    let root = {
      let mut store = self.store();
      let any = store.any();
      match store.as_function(func_type).cloned() {
        None => any,
        Some(f) => {
          let by_name = if path.is_empty() { f.param(name) } else { None };
          match by_name {
            Some(typ) => typ,
            None if rest => {
              let elem = f.rest.unwrap_or(any);
              store.array(elem)
            }
            None => f.args.get(index).copied().unwrap_or(any),
          }
        }
      }
    };
    Ok(self.project(root, path))
  }

  fn var(
    &self,
    ctx: &Ctx<'a>,
    decl: &Node<VarDecl>,
    declarator: &Node<VarDeclarator>,
    path: &[PatStep],
  ) -> Resolved {
    let init = declarator.stx.initializer.as_ref();
    if let Some(init) = init.filter(|_| path.is_empty()) {
      if matches!(init.stx.as_ref(), Expr::ArrowFunc(_) | Expr::Func(_)) {
        return self.expr(ctx, init);
      }
    }
    let first = decl
      .stx
      .declarators
      .first()
      .is_some_and(|d| d.loc == declarator.loc);
    let site = if first { decl.loc } else { declarator.loc };
    let root = match ctx.info.declared_at(site.0) {
      Some(declared) => declared,
      None => match (decl.stx.mode, init) {
        (VarDeclMode::Const, Some(init)) => self.expr(ctx, init)?,
        _ => self.any(),
      },
    };
    Ok(self.project(root, path))
  }

  // Follows destructuring steps from the type of the whole value.
  fn project(&self, mut typ: TypeId, path: &[PatStep]) -> TypeId {
    let store = self.session.store();
    for step in path {
      typ = match step {
        PatStep::Prop(name) => store.property(typ, name),
        PatStep::Index(_) => store.element(typ),
        PatStep::Unknown => store.any(),
      };
    }
    typ
  }

  fn func(&self, ctx: &Ctx<'a>, func: &Node<Func>) -> Resolved {
    self.guarded(QueryKey::Function(ctx.info.key.clone(), func.loc), || {
      let site = ctx.bindings.function_site(func.loc);
      let declared = ctx.info.declared_at(site.0);
      let params = &func.stx.parameters;
      let has_rest = params.last().is_some_and(|p| p.stx.rest);
      let names: Vec<Option<&str>> = params
        .iter()
        .filter(|p| !p.stx.rest)
        .map(|p| match p.stx.pattern.stx.pat.stx.as_ref() {
          Pat::Id(id) => Some(id.stx.name.as_str()),
          _ => None,
        })
        .collect();

      let mut store = self.store();
      let any = store.any();
      let Some(declared) = declared else {
        return Ok(store.function(FunctionType {
          ret: any,
          args: vec![any; names.len()],
          rest: has_rest.then_some(any),
          params: names
            .iter()
            .flatten()
            .map(|name| (name.to_string(), any))
            .collect(),
        }));
      };
      let Some(annotated) = store.as_function(declared).cloned() else {
        return Ok(declared);
      };
      // `@type {function(...)}` and callback typedefs only describe positions.
      if annotated.params.is_empty() && !annotated.args.is_empty() {
        return Ok(declared);
      }
      let positional = annotated.params.is_empty();
      let args = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
          let by_name = name.and_then(|name| annotated.param(name));
          let by_position = (positional || name.is_none())
            .then(|| annotated.args.get(i).copied())
            .flatten();
          by_name.or(by_position).unwrap_or(any)
        })
        .collect();
      let rest = annotated.rest.or(has_rest.then_some(any));
      Ok(store.function(FunctionType {
        ret: annotated.ret,
        args,
        rest,
        params: annotated.params,
      }))
    })
  }

  fn identifier(&self, ctx: &Ctx<'a>, loc: Loc, name: &str) -> Resolved {
    match ctx.bindings.binding_at(loc) {
      Some(symbol) => self.symbol(ctx, symbol),
      None if name == "undefined" => Ok(self.store().undefined()),
      None => Ok(self.any()),
    }
  }

  fn expr(&self, ctx: &Ctx<'a>, expr: &Node<Expr>) -> Resolved {
    Ok(match expr.stx.as_ref() {
      Expr::LitNum(_) => self.primitive("number"),
      Expr::LitStr(_) | Expr::LitTemplate(_) => self.primitive("string"),
      Expr::LitBool(_) => self.primitive("boolean"),
      Expr::LitNull(_) => self.primitive("null"),
      Expr::LitBigInt(_) => self.primitive("bigint"),
      Expr::LitRegex(_) => self.primitive("RegExp"),
      Expr::JsxElem(_) => self.primitive("JSXElement"),
      Expr::Binary(bin) => self.binary(ctx, bin)?,
      Expr::Unary(unary) => match unary.stx.operator {
        OperatorName::LogicalNot | OperatorName::Delete => self.primitive("boolean"),
        OperatorName::UnaryPlus
        | OperatorName::UnaryNegation
        | OperatorName::BitwiseNot
        | OperatorName::PrefixIncrement
        | OperatorName::PrefixDecrement => self.primitive("number"),
        OperatorName::Typeof => self.primitive("string"),
        OperatorName::Void => self.primitive("undefined"),
        _ => self.any(),
      },
      Expr::UnaryPostfix(_) => self.primitive("number"),
      Expr::Cond(cond) => {
        let consequent = self.expr(ctx, &cond.stx.consequent)?;
        let alternate = self.expr(ctx, &cond.stx.alternate)?;
        self.store().union([consequent, alternate])
      }
      Expr::Id(id) => self.identifier(ctx, expr.loc, &id.stx.name)?,
      Expr::IdPat(id) => self.identifier(ctx, expr.loc, &id.stx.name)?,
      Expr::Member(member) => {
        let object = self.expr(ctx, &member.stx.left)?;
        let mut store = self.store();
        let sized = matches!(store.kind(store.resolve(object)), TypeKind::Array(_))
          || store.is_primitive(object, "string");
        if member.stx.right == "length" && sized {
          store.number()
        } else {
          store.property(object, &member.stx.right)
        }
      }
      Expr::ComputedMember(member) => {
        let object = self.expr(ctx, &member.stx.object)?;
        let store = self.session.store();
        match member.stx.member.stx.as_ref() {
          Expr::LitStr(key) => store.property(object, &key.stx.value),
          _ => store.element(object),
        }
      }
      Expr::Call(call) => match call.stx.callee.stx.as_ref() {
        // Methods would need a model of `this`.
        Expr::Member(_) | Expr::ComputedMember(_) => self.any(),
        _ => {
          let callee = self.expr(ctx, &call.stx.callee)?;
          let store = self.session.store();
          match store.as_function(callee) {
            Some(func) => func.ret,
            None => store.any(),
          }
        }
      },
      Expr::New(new) => match new.stx.callee.stx.as_ref() {
        Expr::Id(class) => match self.session.typedefs().lookup(&class.stx.name) {
          Some(alias) => alias,
          None => self.primitive(&class.stx.name),
        },
        _ => self.any(),
      },
      Expr::LitObj(obj) => self.object(ctx, obj)?,
      Expr::LitArr(arr) => {
        let line = ctx.info.line_of(expr.loc.0);
        let declared = ctx.info.declared_on_line(line).filter(|t| {
          let store = self.session.store();
          matches!(store.kind(store.resolve(*t)), TypeKind::Array(_))
        });
        match declared {
          Some(declared) => declared,
          None => {
            let mut elements = Vec::new();
            for elem in arr.stx.elements.iter() {
              match elem {
                LitArrElem::Single(value) => elements.push(self.expr(ctx, value)?),
                LitArrElem::Rest(value) => {
                  let spread = self.expr(ctx, value)?;
                  elements.push(self.session.store().element(spread));
                }
                LitArrElem::Empty => elements.push(self.primitive("undefined")),
              }
            }
            let mut store = self.store();
            let elem = if elements.is_empty() {
              store.any()
            } else {
              store.union(elements)
            };
            store.array(elem)
          }
        }
      }
      Expr::ArrowFunc(arrow) => self.func(ctx, &arrow.stx.func)?,
      Expr::Func(func) => self.func(ctx, &func.stx.func)?,
      Expr::Class(_)
      | Expr::Import(_)
      | Expr::Super(_)
      | Expr::This(_)
      | Expr::TaggedTemplate(_)
      | Expr::ArrPat(_)
      | Expr::ObjPat(_) => self.any(),
    })
  }

  fn binary(&self, ctx: &Ctx<'a>, bin: &Node<BinaryExpr>) -> Resolved {
    let operator = bin.stx.operator;
    if operator.is_comparison() {
      return Ok(self.primitive("boolean"));
    }
    match operator {
      OperatorName::Addition | OperatorName::AssignmentAddition => {
        let left = self.expr(ctx, &bin.stx.left)?;
        let right = self.expr(ctx, &bin.stx.right)?;
        let store = self.session.store();
        let stringy = |t: TypeId| match store.kind(store.resolve(t)) {
          TypeKind::Union(members) => members.iter().any(|m| store.is_primitive(*m, "string")),
          _ => store.is_primitive(t, "string"),
        };
        let name = if stringy(left) || stringy(right) {
          "string"
        } else {
          "number"
        };
        drop(store);
        Ok(self.primitive(name))
      }
      OperatorName::Subtraction
      | OperatorName::Multiplication
      | OperatorName::Division
      | OperatorName::Remainder
      | OperatorName::Exponentiation
      | OperatorName::BitwiseAnd
      | OperatorName::BitwiseOr
      | OperatorName::BitwiseXor
      | OperatorName::BitwiseLeftShift
      | OperatorName::BitwiseRightShift
      | OperatorName::BitwiseUnsignedRightShift
      | OperatorName::AssignmentSubtraction
      | OperatorName::AssignmentMultiplication
      | OperatorName::AssignmentDivision
      | OperatorName::AssignmentRemainder
      | OperatorName::AssignmentExponentiation
      | OperatorName::AssignmentBitwiseAnd
      | OperatorName::AssignmentBitwiseOr
      | OperatorName::AssignmentBitwiseXor
      | OperatorName::AssignmentBitwiseLeftShift
      | OperatorName::AssignmentBitwiseRightShift
      | OperatorName::AssignmentBitwiseUnsignedRightShift => Ok(self.primitive("number")),
      OperatorName::LogicalAnd
      | OperatorName::LogicalOr
      | OperatorName::NullishCoalescing
      | OperatorName::AssignmentLogicalAnd
      | OperatorName::AssignmentLogicalOr
      | OperatorName::AssignmentNullishCoalescing => {
        let left = self.expr(ctx, &bin.stx.left)?;
        let right = self.expr(ctx, &bin.stx.right)?;
        Ok(self.store().union([left, right]))
      }
      OperatorName::Assignment | OperatorName::Comma => self.expr(ctx, &bin.stx.right),
      operator => Err(FatalError::UnsupportedOperator {
        file: ctx.info.key.clone(),
        line: ctx.info.line_of(bin.loc.0),
        operator,
      }),
    }
  }

  fn object(&self, ctx: &Ctx<'a>, obj: &Node<LitObjExpr>) -> Resolved {
    let mut props = Vec::new();
    for member in obj.stx.members.iter() {
      match &member.stx.typ {
        ObjMemberType::Valued { key, val } => {
          let Some(name) = key.static_name() else {
            continue;
          };
          let typ = match val {
            ClassOrObjVal::Prop(Some(value)) => self.expr(ctx, value)?,
            ClassOrObjVal::Method(method) => self.func(ctx, &method.stx.func)?,
            ClassOrObjVal::Getter(getter) => {
              let func = self.func(ctx, &getter.stx.func)?;
              let store = self.session.store();
              store.as_function(func).map_or(store.any(), |f| f.ret)
            }
            ClassOrObjVal::Setter(_) | ClassOrObjVal::Prop(None) => self.any(),
          };
          props.push((name.to_string(), typ));
        }
        ObjMemberType::Shorthand { id } => {
          let typ = self.identifier(ctx, id.loc, &id.stx.name)?;
          props.push((id.stx.name.clone(), typ));
        }
        ObjMemberType::Rest { val } => {
          let spread = self.expr(ctx, val)?;
          let store = self.session.store();
          if let TypeKind::Record(spread_props) = store.kind(store.resolve(spread)) {
            props.extend(spread_props.iter().cloned());
          }
        }
      }
    }
    Ok(self.store().record(props))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::host::MemoryHost;
  use crate::options::LintOptions;
  use typelint_parse::ast::expr::IdExpr;

  fn session(files: &[(&str, &str)]) -> AnalysisSession {
    let mut host = MemoryHost::new();
    for (name, text) in files {
      host.insert(name, text);
    }
    let mut session = AnalysisSession::new(host, LintOptions::default());
    session.load(&FileKey::new(files[0].0)).unwrap();
    session
  }

  fn types_of(session: &AnalysisSession, file: &str, names: &[&str]) -> Vec<String> {
    let resolver = Resolver::new(session);
    let key = FileKey::new(file);
    names
      .iter()
      .map(|name| {
        let typ = resolver.top_level_type(&key, name).unwrap();
        session.store().display(typ).to_string()
      })
      .collect()
  }

  #[test]
  fn infers_literals_and_operators() {
    let source = r#"
const s = 'a';
const a = 1 + 'x';
const b = 1 - true;
const c = 1 < 2;
const d = !s;
const e = typeof s;
const f = void 0;
const g = s ? 1 : 'x';
const h = s || 1;
const i = `t${1}`;
const j = /re/g;
const k = 10n;
const l = null;
const m = undefined;
const n = unknownGlobal;
const o = [1, 'a'];
const p = { a: 1, b: s, ...{ c: true } };
const q = p.b;
const r = p['a'];
const t = o.length;
const u = o[0];
const v = [];
const w = (s, 2);
"#;
    let session = session(&[("a.js", source)]);
    let names = [
      "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r",
      "t", "u", "v", "w",
    ];
    assert_eq!(types_of(&session, "a.js", &names), vec![
      "string",
      "number",
      "boolean",
      "boolean",
      "string",
      "undefined",
      "number|string",
      "string|number",
      "string",
      "RegExp",
      "bigint",
      "null",
      "undefined",
      "any",
      "(number|string)[]",
      "{a:number, b:string, c:boolean}",
      "string",
      "number",
      "number",
      "number|string",
      "any[]",
      "number",
    ]);
  }

  #[test]
  fn declarations_take_precedence_and_lets_are_opaque() {
    let source = r#"
/** @type {number} */
let declared = 'not a number';
let inferred = 1;
const a = 1, /** @type {string} */ b = 2;
/** @type {{x: boolean, y: number[]}} */
const { x: x2, y: [z2] } = obj;
"#;
    let session = session(&[("a.js", source)]);
    assert_eq!(
      types_of(&session, "a.js", &["declared", "inferred", "a", "b", "x2", "z2"]),
      vec!["number", "any", "number", "string", "boolean", "number"]
    );
  }

  #[test]
  fn functions_combine_annotations_with_parameters() {
    let source = r#"
/**
 * @param {string} a
 * @param {number} [b]
 * @param {...boolean} flags
 * @return {string}
 */
function f(a, b, ...flags) { return a; }

/** @returns {number} */
function g(x, y, z) { return 1; }

function h(p, q) {}

/** @type {function(number, (string|undefined)): boolean} */
const arrow = (n, s) => true;

/**
 * @param {object} opts
 * @param {number} opts.size
 */
const withOpts = ({ size }) => size;

const callsF = f('x');
const callsG = g();
const callsH = h();
"#;
    let session = session(&[("a.js", source)]);
    assert_eq!(
      types_of(&session, "a.js", &[
        "f", "g", "h", "arrow", "withOpts", "callsF", "callsG", "callsH"
      ]),
      vec![
        "function(string, number|undefined, ...boolean):string",
        "function(any, any, any):number",
        "function(any, any):any",
        "function(number, string|undefined):boolean",
        "function({size:number}):any",
        "string",
        "number",
        "any",
      ]
    );
  }

  #[test]
  fn parameters_resolve_inside_bodies() {
    let source = r#"
/**
 * @param {string} name
 * @param {...number} nums
 */
function f(name, ...nums) {
  return name;
}
"#;
    let session = session(&[("a.js", source)]);
    let key = FileKey::new("a.js");
    let resolver = Resolver::new(&session);
    let info = session.file(&key).unwrap();
    let bindings = bind_module(info.ast().unwrap());
    let mut found = Vec::new();
    for (id, symbol) in bindings.symbols() {
      if matches!(symbol.decl, Decl::Param { .. }) {
        let ctx = resolver.ctx(&key).unwrap();
        let typ = resolver.symbol(&ctx, id).unwrap();
        found.push(format!("{}: {}", symbol.name, session.store().display(typ)));
      }
    }
    found.sort();
    assert_eq!(found, vec!["name: string", "nums: number[]"]);
  }

  #[test]
  fn follows_imports_and_re_exports() {
    let session = session(&[
      (
        "main.js",
        r#"
import { origin, scale as s } from './shapes.js';
import make from './make.js';
import * as everything from './shapes.js';
const o = origin;
const k = s;
const made = make();
const ns = everything;
"#,
      ),
      (
        "shapes.js",
        "export * from './point.js';\nexport { factor as scale } from './factor.js';\n",
      ),
      (
        "point.js",
        r#"
/**
 * @typedef {object} Point
 * @property {number} x
 */
/** @type {Point} */
export const origin = { x: 0 };
"#,
      ),
      ("factor.js", "const factor = 2;\nexport { factor };\n"),
      (
        "make.js",
        "/** @return {boolean} */\nexport default function () { return true; }\n",
      ),
    ]);
    assert_eq!(
      types_of(&session, "main.js", &["o", "k", "made", "ns"]),
      vec!["Point", "number", "boolean", "any"]
    );
  }

  #[test]
  fn default_imports_follow_default_exports() {
    let session = session(&[
      (
        "main.js",
        "import made from './again.js';\nimport sum from './sum.js';\nconst a = made();\nconst b = sum;\n",
      ),
      ("again.js", "export { default } from './make.js';\n"),
      (
        "make.js",
        "/** @return {string} */\nexport default function make() { return ''; }\n",
      ),
      ("sum.js", "export default 1 + 2;\n"),
    ]);
    assert_eq!(types_of(&session, "main.js", &["a", "b"]), vec!["string", "number"]);
    let resolver = Resolver::new(&session);
    let typ = resolver.default_export_type(&FileKey::new("sum.js")).unwrap();
    assert_eq!(session.store().display(typ).to_string(), "number");
  }

  #[test]
  fn import_cycles_resolve_to_any() {
    let session = session(&[
      ("a.js", "import { b } from './b.js';\nexport const a = b;\n"),
      ("b.js", "import { a } from './a.js';\nexport const b = a;\n"),
    ]);
    assert_eq!(types_of(&session, "a.js", &["a"]), vec!["any"]);
    assert_eq!(types_of(&session, "b.js", &["b"]), vec!["any"]);
  }

  #[test]
  fn injected_bindings_decide_identifiers() {
    struct NoBindings;
    impl<'a> BindingLookup<'a> for NoBindings {
      fn binding_at(&self, _: Loc) -> Option<SymbolId> {
        None
      }
      fn symbol(&self, _: SymbolId) -> &SymbolData<'a> {
        unreachable!()
      }
      fn top_level(&self, _: &str) -> Option<SymbolId> {
        None
      }
      fn function_site(&self, func: Loc) -> Loc {
        func
      }
    }

    let session = session(&[("a.js", "const s = 'a';\nconst t = s;\n")]);
    let resolver = Resolver::with_bindings(&session, |_| Rc::new(NoBindings));
    let key = FileKey::new("a.js");
    let id = Node::new(Loc(0, 0), IdExpr {
      name: "s".to_string(),
    })
    .into_wrapped::<Expr>();
    let typ = resolver.resolve_expr(&key, &id).unwrap();
    assert!(session.store().is_any(typ));
    let undefined = Node::new(Loc(0, 0), IdExpr {
      name: "undefined".to_string(),
    })
    .into_wrapped::<Expr>();
    let typ = resolver.resolve_expr(&key, &undefined).unwrap();
    assert!(session.store().is_primitive(typ, "undefined"));
  }

  #[test]
  fn unknown_binary_operators_are_fatal() {
    let session = session(&[("a.js", "\n\nx;\n")]);
    let resolver = Resolver::new(&session);
    let operand = || {
      Node::new(Loc(2, 3), IdExpr {
        name: "x".to_string(),
      })
      .into_wrapped::<Expr>()
    };
    let expr = Node::new(Loc(2, 3), BinaryExpr {
      operator: OperatorName::Typeof,
      left: operand(),
      right: operand(),
    })
    .into_wrapped::<Expr>();
    let err = resolver.resolve_expr(&FileKey::new("a.js"), &expr).unwrap_err();
    assert_eq!(err, FatalError::UnsupportedOperator {
      file: FileKey::new("a.js"),
      line: 3,
      operator: OperatorName::Typeof,
    });
  }
}
