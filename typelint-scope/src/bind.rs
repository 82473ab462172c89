use super::Decl;
use super::Imported;
use super::ModuleBindings;
use super::PatStep;
use super::ScopeData;
use super::ScopeId;
use super::ScopeKind;
use super::SymbolData;
use super::SymbolId;
use std::collections::BTreeMap;
use typelint_parse::ast::class_or_object::ClassMember;
use typelint_parse::ast::class_or_object::ClassOrObjKey;
use typelint_parse::ast::class_or_object::ClassOrObjVal;
use typelint_parse::ast::class_or_object::ObjMemberType;
use typelint_parse::ast::expr::jsx::JsxAttr;
use typelint_parse::ast::expr::jsx::JsxAttrVal;
use typelint_parse::ast::expr::jsx::JsxElem;
use typelint_parse::ast::expr::jsx::JsxElemChild;
use typelint_parse::ast::expr::jsx::JsxElemName;
use typelint_parse::ast::expr::lit::LitArrElem;
use typelint_parse::ast::expr::lit::LitTemplatePart;
use typelint_parse::ast::expr::pat::ArrPat;
use typelint_parse::ast::expr::pat::ObjPat;
use typelint_parse::ast::expr::pat::Pat;
use typelint_parse::ast::expr::Expr;
use typelint_parse::ast::func::Func;
use typelint_parse::ast::func::FuncBody;
use typelint_parse::ast::import_export::ExportNames;
use typelint_parse::ast::import_export::ImportNames;
use typelint_parse::ast::node::Node;
use typelint_parse::ast::stmt::decl::VarDecl;
use typelint_parse::ast::stmt::decl::VarDeclMode;
use typelint_parse::ast::stmt::ForInOfLhs;
use typelint_parse::ast::stmt::ForTripleStmtInit;
use typelint_parse::ast::stmt::Stmt;
use typelint_parse::ast::TopLevel;
use typelint_parse::loc::Loc;

/// Builds the scope tree of a module and resolves every identifier usage in it.
pub fn bind_module<'a>(top_level: &'a Node<TopLevel>) -> ModuleBindings<'a> {
  let mut binder = Binder {
    bindings: ModuleBindings::new(),
    current: ScopeId(0),
    pending: Vec::new(),
  };
  binder.new_scope(None, ScopeKind::Module);
  binder.stmts(&top_level.stx.body);
  binder.finish()
}

// The Func inside a function-valued expression.
fn func_of(expr: &Node<Expr>) -> Option<Loc> {
  match expr.stx.as_ref() {
    Expr::ArrowFunc(arrow) => Some(arrow.stx.func.loc),
    Expr::Func(func) => Some(func.stx.func.loc),
    _ => None,
  }
}

struct Binder<'a> {
  bindings: ModuleBindings<'a>,
  current: ScopeId,
  pending: Vec<(ScopeId, &'a str, Loc)>,
}

impl<'a> Binder<'a> {
  fn finish(mut self) -> ModuleBindings<'a> {
    for (scope, name, loc) in std::mem::take(&mut self.pending) {
      match self.bindings.resolve_name_in_scope(scope, name) {
        Some(symbol) => {
          self.bindings.resolved.insert(loc, symbol);
        }
        None => self.bindings.unresolved.push((name.to_string(), loc)),
      };
    }
    self.bindings
  }

  fn new_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
    let id = ScopeId(self.bindings.scopes.len() as u32);
    self.bindings.scopes.push(ScopeData {
      parent,
      kind,
      children: Vec::new(),
      symbols: BTreeMap::new(),
    });
    if let Some(parent) = parent {
      self.bindings.scopes[parent.0 as usize].children.push(id);
    }
    id
  }

  fn in_scope(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self)) {
    let outer = self.current;
    self.current = self.new_scope(Some(outer), kind);
    f(self);
    self.current = outer;
  }

  fn closure_scope(&self) -> ScopeId {
    let mut id = self.current;
    loop {
      let data = self.bindings.scope(id);
      match data.parent {
        Some(parent) if !data.kind.is_closure() => id = parent,
        _ => return id,
      }
    }
  }

  fn declare(&mut self, scope: ScopeId, name: &str, loc: Loc, decl: Decl<'a>) -> SymbolId {
    // Redeclarations (`var a; var a;`) share the first symbol.
    let existing = self.bindings.scopes[scope.0 as usize].symbols.get(name).copied();
    let symbol = existing.unwrap_or_else(|| {
      let id = SymbolId(self.bindings.symbols.len() as u32);
      self.bindings.symbols.push(SymbolData {
        name: name.to_string(),
        scope,
        decl,
        loc,
      });
      self.bindings.scopes[scope.0 as usize]
        .symbols
        .insert(name.to_string(), id);
      id
    });
    self.bindings.resolved.insert(loc, symbol);
    symbol
  }

  fn use_name(&mut self, name: &'a str, loc: Loc) {
    self.pending.push((self.current, name, loc));
  }

  fn func_site(&mut self, func: Loc, site: Loc) {
    self.bindings.func_sites.insert(func, site);
  }

  fn declare_pat(
    &mut self,
    scope: ScopeId,
    pat: &'a Node<Pat>,
    path: &mut Vec<PatStep>,
    make: &mut dyn FnMut(Vec<PatStep>) -> Decl<'a>,
  ) {
    match pat.stx.as_ref() {
      Pat::Id(id) => {
        let decl = make(path.clone());
        self.declare(scope, &id.stx.name, id.loc, decl);
      }
      Pat::Arr(arr) => {
        for (i, elem) in arr.stx.elements.iter().enumerate() {
          let Some(elem) = elem else {
            continue;
          };
          if let Some(default) = &elem.default_value {
            self.expr(default);
          }
          path.push(PatStep::Index(i));
          self.declare_pat(scope, &elem.target, path, make);
          path.pop();
        }
        if let Some(rest) = &arr.stx.rest {
          path.push(PatStep::Unknown);
          self.declare_pat(scope, rest, path, make);
          path.pop();
        }
      }
      Pat::Obj(obj) => {
        for prop in obj.stx.properties.iter() {
          let step = match &prop.stx.key {
            ClassOrObjKey::Direct(key) => PatStep::Prop(key.stx.key.clone()),
            ClassOrObjKey::Computed(key) => {
              self.expr(key);
              PatStep::Unknown
            }
          };
          if let Some(default) = &prop.stx.default_value {
            self.expr(default);
          }
          path.push(step);
          self.declare_pat(scope, &prop.stx.target, path, make);
          path.pop();
        }
        if let Some(rest) = &obj.stx.rest {
          path.push(PatStep::Unknown);
          let decl = make(path.clone());
          path.pop();
          self.declare(scope, &rest.stx.name, rest.loc, decl);
        }
      }
    }
  }

  fn stmts(&mut self, body: &'a [Node<Stmt>]) {
    for stmt in body.iter() {
      self.stmt(stmt);
    }
  }

  fn stmt(&mut self, stmt: &'a Node<Stmt>) {
    match stmt.stx.as_ref() {
      Stmt::Block(block) => self.in_scope(ScopeKind::Block, |b| b.stmts(&block.stx.body)),
      Stmt::Break(_) | Stmt::Continue(_) | Stmt::Debugger(_) | Stmt::Empty(_) => {}
      Stmt::DoWhile(s) => {
        self.stmt(&s.stx.body);
        self.expr(&s.stx.condition);
      }
      Stmt::ExportDefaultExpr(s) => {
        if let Some(func) = func_of(&s.stx.expression) {
          self.func_site(func, stmt.loc);
        }
        self.expr(&s.stx.expression);
      }
      Stmt::ExportList(s) => {
        if s.stx.from.is_some() {
          return;
        }
        if let ExportNames::Specific(names) = &s.stx.names {
          for name in names.iter() {
            self.use_name(name.stx.exportable.as_str(), name.loc);
          }
        }
      }
      Stmt::Expr(s) => self.expr(&s.stx.expr),
      Stmt::ForIn(s) => self.in_scope(ScopeKind::Block, |b| {
        b.for_lhs(&s.stx.lhs);
        b.expr(&s.stx.rhs);
        b.stmts(&s.stx.body.stx.body);
      }),
      Stmt::ForOf(s) => self.in_scope(ScopeKind::Block, |b| {
        b.for_lhs(&s.stx.lhs);
        b.expr(&s.stx.rhs);
        b.stmts(&s.stx.body.stx.body);
      }),
      Stmt::ForTriple(s) => self.in_scope(ScopeKind::Block, |b| {
        match &s.stx.init {
          ForTripleStmtInit::None => {}
          ForTripleStmtInit::Expr(e) => b.expr(e),
          ForTripleStmtInit::Decl(d) => b.var_decl(d),
        };
        if let Some(cond) = &s.stx.cond {
          b.expr(cond);
        }
        if let Some(post) = &s.stx.post {
          b.expr(post);
        }
        b.stmts(&s.stx.body.stx.body);
      }),
      Stmt::If(s) => {
        self.expr(&s.stx.test);
        self.stmt(&s.stx.consequent);
        if let Some(alt) = &s.stx.alternate {
          self.stmt(alt);
        }
      }
      Stmt::Import(s) => {
        let module = s.stx.module.as_str();
        let scope = self.current;
        if let Some(default) = &s.stx.default {
          self.declare_pat(scope, &default.stx.pat, &mut Vec::new(), &mut |_| {
            Decl::Import {
              module,
              imported: Imported::Default,
            }
          });
        }
        match &s.stx.names {
          None => {}
          Some(ImportNames::All(alias)) => {
            self.declare_pat(scope, &alias.stx.pat, &mut Vec::new(), &mut |_| {
              Decl::Import {
                module,
                imported: Imported::Namespace,
              }
            });
          }
          Some(ImportNames::Specific(names)) => {
            for name in names.iter() {
              let imported = match name.stx.importable.as_str() {
                "default" => Imported::Default,
                other => Imported::Named(other.to_string()),
              };
              self.declare_pat(scope, &name.stx.alias.stx.pat, &mut Vec::new(), &mut |_| {
                Decl::Import {
                  module,
                  imported: imported.clone(),
                }
              });
            }
          }
        };
      }
      Stmt::Label(s) => self.stmt(&s.stx.statement),
      Stmt::Return(s) => {
        if let Some(value) = &s.stx.value {
          self.expr(value);
        }
      }
      Stmt::Switch(s) => {
        self.expr(&s.stx.test);
        self.in_scope(ScopeKind::Block, |b| {
          for branch in s.stx.branches.iter() {
            if let Some(case) = &branch.stx.case {
              b.expr(case);
            }
            b.stmts(&branch.stx.body);
          }
        });
      }
      Stmt::Throw(s) => self.expr(&s.stx.value),
      Stmt::Try(s) => {
        self.in_scope(ScopeKind::Block, |b| b.stmts(&s.stx.wrapped.stx.body));
        if let Some(catch) = &s.stx.catch {
          self.in_scope(ScopeKind::Block, |b| {
            if let Some(param) = &catch.stx.parameter {
              let scope = b.current;
              b.declare_pat(scope, &param.stx.pat, &mut Vec::new(), &mut |_| {
                Decl::CatchParam
              });
            }
            b.stmts(&catch.stx.body);
          });
        }
        if let Some(finally) = &s.stx.finally {
          self.in_scope(ScopeKind::Block, |b| b.stmts(&finally.stx.body));
        }
      }
      Stmt::While(s) => {
        self.expr(&s.stx.condition);
        self.stmt(&s.stx.body);
      }
      Stmt::ClassDecl(decl) => {
        if let Some(name) = &decl.stx.name {
          let scope = self.current;
          self.declare(scope, &name.stx.name, name.loc, Decl::Class(decl));
        }
        if let Some(extends) = &decl.stx.extends {
          self.expr(extends);
        }
        self.class_body(&decl.stx.members);
      }
      Stmt::FunctionDecl(decl) => {
        if let Some(name) = &decl.stx.name {
          let scope = self.current;
          self.declare(scope, &name.stx.name, name.loc, Decl::Function(decl));
        }
        self.func_site(decl.stx.function.loc, stmt.loc);
        self.func(&decl.stx.function, ScopeKind::NonArrowFunction);
      }
      Stmt::VarDecl(decl) => self.var_decl(decl),
    }
  }

  fn var_decl(&mut self, decl: &'a Node<VarDecl>) {
    let scope = match decl.stx.mode {
      VarDeclMode::Var => self.closure_scope(),
      VarDeclMode::Const | VarDeclMode::Let => self.current,
    };
    for (i, declarator) in decl.stx.declarators.iter().enumerate() {
      self.declare_pat(
        scope,
        &declarator.stx.pattern.stx.pat,
        &mut Vec::new(),
        &mut |path| Decl::Var {
          decl,
          declarator,
          path,
        },
      );
      if let Some(init) = &declarator.stx.initializer {
        if let Some(func) = func_of(init) {
          // The first declarator shares its line with the keyword.
          let site = if i == 0 { decl.loc } else { declarator.loc };
          self.func_site(func, site);
        }
        self.expr(init);
      }
    }
  }

  fn for_lhs(&mut self, lhs: &'a ForInOfLhs) {
    match lhs {
      ForInOfLhs::Assign(pat) => self.pat_use(pat),
      ForInOfLhs::Decl((mode, pat)) => {
        let mode = *mode;
        let scope = match mode {
          VarDeclMode::Var => self.closure_scope(),
          VarDeclMode::Const | VarDeclMode::Let => self.current,
        };
        self.declare_pat(scope, &pat.stx.pat, &mut Vec::new(), &mut |_| {
          Decl::ForBinding(mode)
        });
      }
    }
  }

  fn func(&mut self, func: &'a Node<Func>, kind: ScopeKind) {
    self.in_scope(kind, |b| {
      let scope = b.current;
      for (index, param) in func.stx.parameters.iter().enumerate() {
        if let Some(default) = &param.stx.default_value {
          b.expr(default);
        }
        let rest = param.stx.rest;
        b.declare_pat(scope, &param.stx.pattern.stx.pat, &mut Vec::new(), &mut |path| {
          Decl::Param {
            func,
            index,
            rest,
            path,
          }
        });
      }
      match &func.stx.body {
        FuncBody::Block(body) => b.stmts(body),
        FuncBody::Expression(expr) => b.expr(expr),
      };
    });
  }

  fn class_body(&mut self, members: &'a [Node<ClassMember>]) {
    self.in_scope(ScopeKind::Class, |b| {
      for member in members.iter() {
        b.member(member.loc, &member.stx.key, &member.stx.val);
      }
    });
  }

  fn member(&mut self, loc: Loc, key: &'a ClassOrObjKey, val: &'a ClassOrObjVal) {
    if let ClassOrObjKey::Computed(key) = key {
      self.expr(key);
    }
    let func = match val {
      ClassOrObjVal::Getter(g) => &g.stx.func,
      ClassOrObjVal::Setter(s) => &s.stx.func,
      ClassOrObjVal::Method(m) => &m.stx.func,
      ClassOrObjVal::Prop(None) => return,
      ClassOrObjVal::Prop(Some(value)) => {
        if let Some(func) = func_of(value) {
          self.func_site(func, loc);
        }
        self.expr(value);
        return;
      }
    };
    self.func_site(func.loc, loc);
    self.func(func, ScopeKind::NonArrowFunction);
  }

  fn pat_use(&mut self, pat: &'a Node<Pat>) {
    match pat.stx.as_ref() {
      Pat::Id(id) => self.use_name(&id.stx.name, id.loc),
      Pat::Arr(arr) => self.arr_pat_use(arr),
      Pat::Obj(obj) => self.obj_pat_use(obj),
    }
  }

  fn arr_pat_use(&mut self, arr: &'a Node<ArrPat>) {
    for elem in arr.stx.elements.iter().flatten() {
      self.pat_use(&elem.target);
      if let Some(default) = &elem.default_value {
        self.expr(default);
      }
    }
    if let Some(rest) = &arr.stx.rest {
      self.pat_use(rest);
    }
  }

  fn obj_pat_use(&mut self, obj: &'a Node<ObjPat>) {
    for prop in obj.stx.properties.iter() {
      if let ClassOrObjKey::Computed(key) = &prop.stx.key {
        self.expr(key);
      }
      self.pat_use(&prop.stx.target);
      if let Some(default) = &prop.stx.default_value {
        self.expr(default);
      }
    }
    if let Some(rest) = &obj.stx.rest {
      self.use_name(&rest.stx.name, rest.loc);
    }
  }

  fn expr(&mut self, expr: &'a Node<Expr>) {
    match expr.stx.as_ref() {
      Expr::ArrowFunc(arrow) => self.func(&arrow.stx.func, ScopeKind::ArrowFunction),
      Expr::Binary(bin) => {
        if bin.stx.operator.is_assignment() {
          if let Some(func) = func_of(&bin.stx.right) {
            self.func_site(func, expr.loc);
          }
        }
        self.expr(&bin.stx.left);
        self.expr(&bin.stx.right);
      }
      Expr::Call(call) => {
        self.expr(&call.stx.callee);
        for arg in call.stx.arguments.iter() {
          self.expr(&arg.stx.value);
        }
      }
      Expr::Class(class) => {
        if let Some(extends) = &class.stx.extends {
          self.expr(extends);
        }
        match &class.stx.name {
          Some(name) => self.in_scope(ScopeKind::FunctionExpressionName, |b| {
            let scope = b.current;
            b.declare(scope, &name.stx.name, name.loc, Decl::ClassExprName(class));
            b.class_body(&class.stx.members);
          }),
          None => self.class_body(&class.stx.members),
        }
      }
      Expr::ComputedMember(m) => {
        self.expr(&m.stx.object);
        self.expr(&m.stx.member);
      }
      Expr::Cond(c) => {
        self.expr(&c.stx.test);
        self.expr(&c.stx.consequent);
        self.expr(&c.stx.alternate);
      }
      Expr::Func(f) => match &f.stx.name {
        Some(name) => self.in_scope(ScopeKind::FunctionExpressionName, |b| {
          let scope = b.current;
          b.declare(scope, &name.stx.name, name.loc, Decl::FunctionExprName(f));
          b.func(&f.stx.func, ScopeKind::NonArrowFunction);
        }),
        None => self.func(&f.stx.func, ScopeKind::NonArrowFunction),
      },
      Expr::Id(id) => self.use_name(&id.stx.name, expr.loc),
      Expr::Import(import) => self.expr(&import.stx.module),
      Expr::Member(m) => self.expr(&m.stx.left),
      Expr::New(n) => {
        self.expr(&n.stx.callee);
        for arg in n.stx.arguments.iter() {
          self.expr(&arg.stx.value);
        }
      }
      Expr::Super(_) | Expr::This(_) => {}
      Expr::TaggedTemplate(t) => {
        self.expr(&t.stx.function);
        self.template_parts(&t.stx.parts);
      }
      Expr::Unary(u) => self.expr(&u.stx.argument),
      Expr::UnaryPostfix(u) => self.expr(&u.stx.argument),
      Expr::JsxElem(elem) => self.jsx(elem),
      Expr::LitArr(arr) => {
        for elem in arr.stx.elements.iter() {
          match elem {
            LitArrElem::Single(e) | LitArrElem::Rest(e) => self.expr(e),
            LitArrElem::Empty => {}
          };
        }
      }
      Expr::LitObj(obj) => {
        for member in obj.stx.members.iter() {
          match &member.stx.typ {
            ObjMemberType::Valued { key, val } => self.member(member.loc, key, val),
            ObjMemberType::Shorthand { id } => self.use_name(&id.stx.name, id.loc),
            ObjMemberType::Rest { val } => self.expr(val),
          };
        }
      }
      Expr::LitTemplate(t) => self.template_parts(&t.stx.parts),
      Expr::LitBigInt(_)
      | Expr::LitBool(_)
      | Expr::LitNull(_)
      | Expr::LitNum(_)
      | Expr::LitRegex(_)
      | Expr::LitStr(_) => {}
      Expr::ArrPat(arr) => self.arr_pat_use(arr),
      Expr::IdPat(id) => self.use_name(&id.stx.name, expr.loc),
      Expr::ObjPat(obj) => self.obj_pat_use(obj),
    }
  }

  fn template_parts(&mut self, parts: &'a [LitTemplatePart]) {
    for part in parts.iter() {
      if let LitTemplatePart::Substitution(e) = part {
        self.expr(e);
      }
    }
  }

  fn jsx(&mut self, elem: &'a Node<JsxElem>) {
    match &elem.stx.name {
      Some(JsxElemName::Id(id)) => self.use_name(&id.stx.name, id.loc),
      Some(JsxElemName::Member(m)) => self.use_name(&m.stx.base.stx.name, m.stx.base.loc),
      Some(JsxElemName::Name(_)) | None => {}
    };
    for attr in elem.stx.attributes.iter() {
      match attr {
        JsxAttr::Named { value, .. } => match value {
          Some(JsxAttrVal::Expression(c)) => {
            if let Some(v) = &c.stx.value {
              self.expr(v);
            }
          }
          Some(JsxAttrVal::Element(e)) => self.jsx(e),
          Some(JsxAttrVal::Text(_)) | None => {}
        },
        JsxAttr::Spread { value } => self.expr(&value.stx.value),
      };
    }
    for child in elem.stx.children.iter() {
      match child {
        JsxElemChild::Element(e) => self.jsx(e),
        JsxElemChild::Expr(c) => {
          if let Some(v) = &c.stx.value {
            self.expr(v);
          }
        }
        JsxElemChild::Text(_) => {}
      };
    }
  }
}
