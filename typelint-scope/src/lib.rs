//! Lexical scopes and bindings for a parsed module.
//!
//! [`bind_module`] walks a `typelint-parse` AST once, building a scope tree and a
//! symbol per declared name, then resolves every identifier usage to its nearest
//! visible declaration. The result borrows the AST: each [`Decl`] points back at
//! the syntax that introduced the name, so later passes can read initializers,
//! parameter lists and import specifiers without another walk.
//!
//! ## Scope kinds
//!
//! - [`ScopeKind::Module`]: the top level; a closure for `var`.
//! - [`ScopeKind::NonArrowFunction`] / [`ScopeKind::ArrowFunction`]: parameters
//!   and body of a function; `var` hoists to the nearest of these.
//! - [`ScopeKind::FunctionExpressionName`]: holds only the name of a named
//!   function or class expression.
//! - [`ScopeKind::Class`]: class bodies.
//! - [`ScopeKind::Block`]: braces, `for` headers, `catch` clauses and `switch`
//!   bodies.
//!
//! Hoisting falls out of resolving only after the whole module is declared:
//! a usage sees every declaration of its scope chain regardless of order.
//! Temporal dead zones are not modelled.
use ahash::HashMap;
use ahash::HashMapExt;
use std::collections::BTreeMap;
use typelint_parse::ast::expr::ClassExpr;
use typelint_parse::ast::expr::FuncExpr;
use typelint_parse::ast::func::Func;
use typelint_parse::ast::node::Node;
use typelint_parse::ast::stmt::decl::ClassDecl;
use typelint_parse::ast::stmt::decl::FuncDecl;
use typelint_parse::ast::stmt::decl::VarDecl;
use typelint_parse::ast::stmt::decl::VarDeclMode;
use typelint_parse::ast::stmt::decl::VarDeclarator;
use typelint_parse::loc::Loc;

mod bind;

pub use bind::bind_module;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
  pub fn raw(self) -> u32 {
    self.0
  }

  pub fn from_raw(raw: u32) -> Self {
    ScopeId(raw)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
  pub fn raw(self) -> u32 {
    self.0
  }

  pub fn from_raw(raw: u32) -> Self {
    SymbolId(raw)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
  Module,
  Class,
  NonArrowFunction,
  ArrowFunction,
  Block,
  FunctionExpressionName,
}

impl ScopeKind {
  /// Whether `var` declarations stop here.
  pub fn is_closure(self) -> bool {
    matches!(
      self,
      ScopeKind::Module | ScopeKind::NonArrowFunction | ScopeKind::ArrowFunction
    )
  }
}

#[derive(Debug)]
pub struct ScopeData {
  pub parent: Option<ScopeId>,
  pub kind: ScopeKind,
  pub children: Vec<ScopeId>,
  pub symbols: BTreeMap<String, SymbolId>,
}

/// One step from a destructuring pattern's root to the bound identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatStep {
  Prop(String),
  Index(usize),
  // Computed keys and rest elements.
  Unknown,
}

/// What an import binding refers to in the imported module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Imported {
  Default,
  Named(String),
  Namespace,
}

/// The syntax that introduced a symbol.
#[derive(Clone, Debug)]
pub enum Decl<'a> {
  Function(&'a Node<FuncDecl>),
  FunctionExprName(&'a Node<FuncExpr>),
  Class(&'a Node<ClassDecl>),
  ClassExprName(&'a Node<ClassExpr>),
  Param {
    func: &'a Node<Func>,
    index: usize,
    rest: bool,
    path: Vec<PatStep>,
  },
  Var {
    decl: &'a Node<VarDecl>,
    declarator: &'a Node<VarDeclarator>,
    path: Vec<PatStep>,
  },
  // `for (const x of ...)` and friends; the value comes from iteration.
  ForBinding(VarDeclMode),
  CatchParam,
  Import {
    module: &'a str,
    imported: Imported,
  },
}

#[derive(Debug)]
pub struct SymbolData<'a> {
  pub name: String,
  pub scope: ScopeId,
  pub decl: Decl<'a>,
  /// Location of the identifier that declared this symbol.
  pub loc: Loc,
}

#[derive(Debug)]
pub struct ModuleBindings<'a> {
  scopes: Vec<ScopeData>,
  symbols: Vec<SymbolData<'a>>,
  // Identifier usages and declaring identifiers, by location.
  resolved: HashMap<Loc, SymbolId>,
  unresolved: Vec<(String, Loc)>,
  // Function location to the location of the syntax its annotation comment is attached to.
  func_sites: HashMap<Loc, Loc>,
}

impl<'a> ModuleBindings<'a> {
  fn new() -> Self {
    ModuleBindings {
      scopes: Vec::new(),
      symbols: Vec::new(),
      resolved: HashMap::new(),
      unresolved: Vec::new(),
      func_sites: HashMap::new(),
    }
  }

  pub fn top_scope(&self) -> ScopeId {
    ScopeId(0)
  }

  pub fn scope(&self, id: ScopeId) -> &ScopeData {
    &self.scopes[id.0 as usize]
  }

  pub fn symbol(&self, id: SymbolId) -> &SymbolData<'a> {
    &self.symbols[id.0 as usize]
  }

  pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &SymbolData<'a>)> {
    self
      .symbols
      .iter()
      .enumerate()
      .map(|(i, s)| (SymbolId(i as u32), s))
  }

  /// The symbol an identifier at `loc` refers to or declares.
  pub fn symbol_at(&self, loc: Loc) -> Option<SymbolId> {
    self.resolved.get(&loc).copied()
  }

  pub fn top_level_symbol(&self, name: &str) -> Option<SymbolId> {
    self.scope(self.top_scope()).symbols.get(name).copied()
  }

  /// Walks up from `scope` to the nearest declaration of `name`.
  pub fn resolve_name_in_scope(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
    let mut current = Some(scope);
    while let Some(id) = current {
      let data = self.scope(id);
      if let Some(symbol) = data.symbols.get(name) {
        return Some(*symbol);
      }
      current = data.parent;
    }
    None
  }

  /// Usages that matched no declaration, such as globals.
  pub fn unresolved(&self) -> &[(String, Loc)] {
    &self.unresolved
  }

  /// The location whose annotation comment describes the function at `func`.
  ///
  /// For `const f = () => {}` this is the declaration statement rather than the arrow
  /// itself; for function declarations it is the whole declaration including `export`.
  pub fn func_site(&self, func: Loc) -> Loc {
    self.func_sites.get(&func).copied().unwrap_or(func)
  }
}
