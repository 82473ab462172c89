//! The module cache: one [`FileInfo`] per loaded file, plus the typedef table and type
//! store every file shares.
use crate::builder::define_typedefs;
use crate::builder::doc_comments;
use crate::builder::register_typedefs;
use crate::builder::Builder;
use crate::builder::DocComment;
use crate::builder::TypedefTable;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::SYNTAX_ERROR;
use crate::error::FatalError;
use crate::error::HostError;
use crate::host::FileKey;
use crate::host::Host;
use crate::options::LintOptions;
use crate::resolve::Resolver;
use crate::rules;
use crate::types::TypeId;
use crate::types::TypeStore;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;
use tracing::warn;
use typelint_parse::ast::expr::pat::Pat;
use typelint_parse::ast::expr::Expr;
use typelint_parse::ast::import_export::ExportNames;
use typelint_parse::ast::node::Node;
use typelint_parse::ast::stmt::decl::ClassDecl;
use typelint_parse::ast::stmt::decl::ExportMode;
use typelint_parse::ast::stmt::decl::FuncDecl;
use typelint_parse::ast::stmt::decl::VarDecl;
use typelint_parse::ast::stmt::decl::VarDeclarator;
use typelint_parse::ast::stmt::Stmt;
use typelint_parse::ast::TopLevel;
use typelint_parse::comment::Comment;
use typelint_parse::error::SyntaxError;
use typelint_parse::loc::LineIndex;
use typelint_parse::parse_with_comments;
use typelint_scope::Imported;

#[derive(Clone, Debug)]
pub enum FileStatus {
  Ok,
  Unreadable(HostError),
  SyntaxError(SyntaxError),
}

/// A top level declaration found by looking up an export.
#[derive(Clone, Copy, Debug)]
pub enum ExportedDecl<'a> {
  Var {
    decl: &'a Node<VarDecl>,
    declarator: &'a Node<VarDeclarator>,
  },
  Function(&'a Node<FuncDecl>),
  Class(&'a Node<ClassDecl>),
  /// `export { local as name }`, or a name bound by an exported destructuring.
  Local(&'a str),
  /// `export default <expr>`.
  Expr(&'a Node<Expr>),
  /// `export { name } from "module"` and `export * as name from "module"`.
  Reexport {
    module: &'a str,
    imported: ImportedRef<'a>,
  },
}

/// Borrowed form of [`Imported`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportedRef<'a> {
  Default,
  Named(&'a str),
  Namespace,
}

impl ImportedRef<'_> {
  pub fn to_owned(self) -> Imported {
    match self {
      ImportedRef::Default => Imported::Default,
      ImportedRef::Named(name) => Imported::Named(name.to_string()),
      ImportedRef::Namespace => Imported::Namespace,
    }
  }
}

fn imported_ref(name: &str) -> ImportedRef<'_> {
  match name {
    "default" => ImportedRef::Default,
    name => ImportedRef::Named(name),
  }
}

// The identifier `name` as bound somewhere in `pat`.
fn bound_name<'p>(pat: &'p Node<Pat>, name: &str) -> Option<&'p str> {
  match pat.stx.as_ref() {
    Pat::Id(id) => (id.stx.name == name).then_some(id.stx.name.as_str()),
    Pat::Arr(arr) => arr
      .stx
      .elements
      .iter()
      .flatten()
      .find_map(|e| bound_name(&e.target, name))
      .or_else(|| arr.stx.rest.as_ref().and_then(|r| bound_name(r, name))),
    Pat::Obj(obj) => obj
      .stx
      .properties
      .iter()
      .find_map(|p| bound_name(&p.stx.target, name))
      .or_else(|| {
        obj
          .stx
          .rest
          .as_ref()
          .filter(|r| r.stx.name == name)
          .map(|r| r.stx.name.as_str())
      }),
  }
}

// Offset of the first token at or after `pos`, skipping whitespace and comments.
fn next_token(source: &str, comments: &[Comment], mut pos: usize) -> usize {
  let bytes = source.as_bytes();
  loop {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
      pos += 1;
    }
    match comments.binary_search_by_key(&pos, |c| c.loc.0) {
      Ok(i) => pos = comments[i].loc.1,
      Err(_) => return pos,
    }
  }
}

/// Everything known about one source file.
#[derive(Debug)]
pub struct FileInfo {
  pub key: FileKey,
  pub source: Arc<str>,
  pub status: FileStatus,
  pub lines: LineIndex,
  ast: Option<Node<TopLevel>>,
  comments: Vec<Comment>,
  docs: Vec<DocComment>,
  // Declared types by the offset of the first token after their comment.
  declared_by_offset: HashMap<usize, TypeId>,
  // Declared types by the line after their comment, for comments that end their line.
  declared_by_line: BTreeMap<usize, TypeId>,
  // Import and re-export specifiers the host could resolve.
  modules: HashMap<String, FileKey>,
}

impl FileInfo {
  fn degenerate(key: FileKey, source: Arc<str>, status: FileStatus) -> Self {
    FileInfo {
      lines: LineIndex::new(&source),
      key,
      source,
      status,
      ast: None,
      comments: Vec::new(),
      docs: Vec::new(),
      declared_by_offset: HashMap::new(),
      declared_by_line: BTreeMap::new(),
      modules: HashMap::new(),
    }
  }

  fn read(host: &dyn Host, key: &FileKey) -> Self {
    let _span = debug_span!("read_file", file = %key).entered();
    let source = match host.file_text(key) {
      Ok(source) => source,
      Err(err) => {
        warn!(file = %key, error = %err, "file could not be read");
        return FileInfo::degenerate(key.clone(), Arc::from(""), FileStatus::Unreadable(err));
      }
    };
    let (ast, comments) = match parse_with_comments(&source) {
      Ok(parsed) => parsed,
      Err(err) => {
        debug!(file = %key, error = %err, "file failed to parse");
        return FileInfo::degenerate(key.clone(), source, FileStatus::SyntaxError(err));
      }
    };
    let lines = LineIndex::new(&source);
    let docs = doc_comments(&source, &comments, &lines);
    let mut modules = HashMap::new();
    for specifier in module_specifiers(&ast) {
      match host.resolve(key, specifier) {
        Some(target) => {
          modules.insert(specifier.to_string(), target);
        }
        None => debug!(file = %key, specifier, "unresolved module"),
      }
    }
    FileInfo {
      key: key.clone(),
      source,
      status: FileStatus::Ok,
      lines,
      ast: Some(ast),
      comments,
      docs,
      declared_by_offset: HashMap::new(),
      declared_by_line: BTreeMap::new(),
      modules,
    }
  }

  pub fn ast(&self) -> Option<&Node<TopLevel>> {
    self.ast.as_ref()
  }

  pub fn doc_comments(&self) -> &[DocComment] {
    &self.docs
  }

  /// The file an import specifier in this file refers to.
  pub fn module(&self, specifier: &str) -> Option<&FileKey> {
    self.modules.get(specifier)
  }

  pub fn line_of(&self, offset: usize) -> usize {
    self.lines.line(offset)
  }

  /// Type declared by the comment directly before the token at `offset`.
  pub fn declared_at(&self, offset: usize) -> Option<TypeId> {
    self.declared_by_offset.get(&offset).copied()
  }

  /// Type declared by a comment ending on the line before `line`.
  pub fn declared_on_line(&self, line: usize) -> Option<TypeId> {
    self.declared_by_line.get(&line).copied()
  }

  /// Lines with a declared type, in order.
  pub fn declared_lines(&self) -> impl Iterator<Item = (usize, TypeId)> + '_ {
    self.declared_by_line.iter().map(|(l, t)| (*l, *t))
  }

  fn body(&self) -> &[Node<Stmt>] {
    match &self.ast {
      Some(ast) => &ast.stx.body,
      None => &[],
    }
  }

  /// The declaration exported from this file as `name`, not following `export *`.
  pub fn named_export(&self, name: &str) -> Option<ExportedDecl<'_>> {
    if name == "default" {
      return self.default_export();
    }
    for stmt in self.body() {
      match stmt.stx.as_ref() {
        Stmt::VarDecl(decl) if decl.stx.export => {
          for declarator in decl.stx.declarators.iter() {
            let pat = &declarator.stx.pattern.stx.pat;
            if let Pat::Id(id) = pat.stx.as_ref() {
              if id.stx.name == name {
                return Some(ExportedDecl::Var { decl, declarator });
              }
            } else if let Some(local) = bound_name(pat, name) {
              return Some(ExportedDecl::Local(local));
            }
          }
        }
        Stmt::FunctionDecl(func)
          if func.stx.export == ExportMode::Named
            && func.stx.name.as_ref().is_some_and(|n| n.stx.name == name) =>
        {
          return Some(ExportedDecl::Function(func));
        }
        Stmt::ClassDecl(class)
          if class.stx.export == ExportMode::Named
            && class.stx.name.as_ref().is_some_and(|n| n.stx.name == name) =>
        {
          return Some(ExportedDecl::Class(class));
        }
        Stmt::ExportList(list) => match &list.stx.names {
          ExportNames::Specific(names) => {
            if let Some(export) = names.iter().find(|n| n.stx.alias.stx.name == name) {
              let exportable = export.stx.exportable.as_str();
              return Some(match &list.stx.from {
                Some(module) => ExportedDecl::Reexport {
                  module: module.as_str(),
                  imported: imported_ref(exportable),
                },
                None => ExportedDecl::Local(exportable),
              });
            }
          }
          ExportNames::All(Some(alias)) if alias.stx.name == name => {
            if let Some(module) = &list.stx.from {
              return Some(ExportedDecl::Reexport {
                module: module.as_str(),
                imported: ImportedRef::Namespace,
              });
            }
          }
          ExportNames::All(_) => {}
        },
        _ => {}
      }
    }
    None
  }

  /// The declaration exported as the default export of this file.
  pub fn default_export(&self) -> Option<ExportedDecl<'_>> {
    for stmt in self.body() {
      match stmt.stx.as_ref() {
        Stmt::FunctionDecl(func) if func.stx.export == ExportMode::Default => {
          return Some(ExportedDecl::Function(func));
        }
        Stmt::ClassDecl(class) if class.stx.export == ExportMode::Default => {
          return Some(ExportedDecl::Class(class));
        }
        Stmt::ExportDefaultExpr(export) => return Some(ExportedDecl::Expr(&export.stx.expression)),
        Stmt::ExportList(list) => {
          if let ExportNames::Specific(names) = &list.stx.names {
            if let Some(export) = names.iter().find(|n| n.stx.alias.stx.name == "default") {
              let exportable = export.stx.exportable.as_str();
              return Some(match &list.stx.from {
                Some(module) => ExportedDecl::Reexport {
                  module: module.as_str(),
                  imported: imported_ref(exportable),
                },
                None => ExportedDecl::Local(exportable),
              });
            }
          }
        }
        _ => {}
      }
    }
    None
  }

  /// Specifiers of `export * from "module"` statements, in order.
  pub fn star_exports(&self) -> impl Iterator<Item = &str> {
    self.body().iter().filter_map(|stmt| match stmt.stx.as_ref() {
      Stmt::ExportList(list) => match (&list.stx.names, &list.stx.from) {
        (ExportNames::All(None), Some(module)) => Some(module.as_str()),
        _ => None,
      },
      _ => None,
    })
  }

  // Indexes every comment's declared type under the token and line that follow it.
  fn index_declarations(
    &mut self,
    store: &mut TypeStore,
    typedefs: &TypedefTable,
  ) -> Result<(), FatalError> {
    let FileInfo {
      key,
      source,
      comments,
      docs,
      declared_by_offset,
      declared_by_line,
      lines,
      ..
    } = self;
    for doc in docs.iter() {
      let mut builder = Builder::new(store, typedefs, key, doc.start_line);
      let Some(typ) = builder.build_declaration(doc.declaration_tags())? else {
        continue;
      };
      let next = next_token(source, comments, doc.loc.1);
      if next >= source.len() {
        continue;
      }
      declared_by_offset.insert(next, typ);
      if lines.line(next) > doc.end_line {
        declared_by_line.insert(doc.end_line + 1, typ);
      }
    }
    Ok(())
  }
}

fn module_specifiers(ast: &Node<TopLevel>) -> impl Iterator<Item = &str> {
  ast.stx.body.iter().filter_map(|stmt| match stmt.stx.as_ref() {
    Stmt::Import(import) => Some(import.stx.module.as_str()),
    Stmt::ExportList(list) => list.stx.from.as_deref(),
    _ => None,
  })
}

/// Owns every cache of one analysis run: loaded files, typedefs and types.
///
/// Files are loaded with [`AnalysisSession::load`], which also loads everything they
/// import, and are never reloaded; start a new session to see changed contents.
pub struct AnalysisSession {
  host: Arc<dyn Host>,
  options: LintOptions,
  files: HashMap<FileKey, FileInfo>,
  typedefs: TypedefTable,
  store: RefCell<TypeStore>,
}

impl AnalysisSession {
  pub fn new(host: impl Host, options: LintOptions) -> Self {
    AnalysisSession {
      host: Arc::new(host),
      options,
      files: HashMap::new(),
      typedefs: TypedefTable::new(),
      store: RefCell::new(TypeStore::new()),
    }
  }

  pub fn options(&self) -> &LintOptions {
    &self.options
  }

  pub fn typedefs(&self) -> &TypedefTable {
    &self.typedefs
  }

  pub fn store(&self) -> Ref<'_, TypeStore> {
    self.store.borrow()
  }

  pub(crate) fn store_mut(&self) -> RefMut<'_, TypeStore> {
    self.store.borrow_mut()
  }

  /// A previously loaded file.
  pub fn file(&self, key: &FileKey) -> Option<&FileInfo> {
    self.files.get(key)
  }

  /// Loads `root` and every file reachable from it through imports and re-exports.
  ///
  /// Typedef placeholders of all newly loaded files are registered before any type
  /// is built, so annotations may name typedefs from any file in the import graph.
  pub fn load(&mut self, root: &FileKey) -> Result<(), FatalError> {
    let _span = debug_span!("load", file = %root).entered();
    let mut loaded = Vec::new();
    let mut pending = vec![root.clone()];
    let mut seen = HashSet::new();
    while let Some(key) = pending.pop() {
      if self.files.contains_key(&key) || !seen.insert(key.clone()) {
        continue;
      }
      let info = FileInfo::read(self.host.as_ref(), &key);
      pending.extend(
        info
          .modules
          .values()
          .filter(|target| !self.files.contains_key(*target))
          .cloned(),
      );
      self.files.insert(key.clone(), info);
      loaded.push(key);
    }
    debug!(files = loaded.len(), "loaded new files");

    // A failed load leaves no partially indexed files or stray typedefs behind.
    if let Err(err) = self.index_loaded(&loaded) {
      for key in loaded.iter() {
        self.files.remove(key);
        self.typedefs.forget_file(key);
      }
      return Err(err);
    }

    match &self.files[root].status {
      FileStatus::Unreadable(err) => Err(FatalError::Host(err.clone())),
      _ => Ok(()),
    }
  }

  fn index_loaded(&mut self, loaded: &[FileKey]) -> Result<(), FatalError> {
    let store = self.store.get_mut();
    for key in loaded.iter() {
      let info = &self.files[key];
      register_typedefs(store, &mut self.typedefs, key, &info.docs)?;
    }
    for key in loaded.iter() {
      let info = &self.files[key];
      define_typedefs(store, &self.typedefs, key, &info.docs)?;
    }
    for key in loaded.iter() {
      if let Some(info) = self.files.get_mut(key) {
        info.index_declarations(store, &self.typedefs)?;
      }
    }
    Ok(())
  }

  /// Loads `key` if needed and returns its file info.
  pub fn get_file_info(&mut self, key: &FileKey) -> Result<&FileInfo, FatalError> {
    self.load(key)?;
    self
      .files
      .get(key)
      .ok_or_else(|| FatalError::NotLoaded { file: key.clone() })
  }

  /// Finds the declaration exported as `name` from `file`, following `export *`
  /// re-exports. Returns the file the declaration is written in.
  pub fn get_named_export(
    &self,
    file: &FileKey,
    name: &str,
  ) -> Option<(&FileInfo, ExportedDecl<'_>)> {
    let mut visited = HashSet::new();
    self.find_export(file, name, &mut visited)
  }

  fn find_export<'s>(
    &'s self,
    file: &FileKey,
    name: &str,
    visited: &mut HashSet<FileKey>,
  ) -> Option<(&'s FileInfo, ExportedDecl<'s>)> {
    if !visited.insert(file.clone()) {
      return None;
    }
    let info = self.files.get(file)?;
    if let Some(decl) = info.named_export(name) {
      return Some((info, decl));
    }
    if name == "default" {
      return None;
    }
    info
      .star_exports()
      .filter_map(|module| info.module(module))
      .find_map(|target| self.find_export(target, name, visited))
  }

  pub fn get_default_export(&self, file: &FileKey) -> Option<(&FileInfo, ExportedDecl<'_>)> {
    let info = self.files.get(file)?;
    info.default_export().map(|decl| (info, decl))
  }

  /// Runs every enabled rule over a loaded file.
  pub fn check_file(&self, file: &FileKey) -> Result<Vec<Diagnostic>, FatalError> {
    let _span = debug_span!("check", file = %file).entered();
    let info = self
      .files
      .get(file)
      .ok_or_else(|| FatalError::NotLoaded { file: file.clone() })?;
    match &info.status {
      FileStatus::Ok => {}
      FileStatus::Unreadable(err) => return Err(FatalError::Host(err.clone())),
      FileStatus::SyntaxError(err) => {
        let (line, column) = info.lines.position(err.loc.0);
        return Ok(vec![Diagnostic {
          code: SYNTAX_ERROR,
          file: file.clone(),
          loc: err.loc,
          line,
          column,
          message: err.to_string(),
        }]);
      }
    }
    let resolver = Resolver::new(self);
    let diagnostics = rules::check(&resolver, info, &self.options)?;
    debug!(diagnostics = diagnostics.len(), "checked file");
    Ok(diagnostics)
  }

  /// Loads and checks `file`.
  pub fn check(&mut self, file: &FileKey) -> Result<Vec<Diagnostic>, FatalError> {
    self.load(file)?;
    self.check_file(file)
  }

  /// Renders the type of the variable, function or expression statement declared on
  /// `line`, as the checker sees it.
  pub fn declared_type_on_line(&self, file: &FileKey, line: usize) -> Option<String> {
    let info = self.files.get(file)?;
    let typ = info.declared_on_line(line)?;
    Some(self.store().display(typ).to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::host::MemoryHost;

  fn session(host: MemoryHost) -> AnalysisSession {
    AnalysisSession::new(host, LintOptions::default())
  }

  #[test]
  fn indexes_declarations_by_following_token_and_line() {
    let source = "/** @type {number} */ let a = 1;\n/** @type {string} */\nlet b = '';\n\n/** @type {boolean} */\n\nlet c;\n";
    let mut session = session(MemoryHost::new().with_file("a.js", source));
    let key = FileKey::new("a.js");
    session.load(&key).unwrap();
    let info = session.file(&key).unwrap();
    let at = |needle: &str| info.declared_at(source.find(needle).unwrap());
    let store = session.store();
    assert_eq!(store.display(at("let a").unwrap()).to_string(), "number");
    assert_eq!(store.display(at("let b").unwrap()).to_string(), "string");
    assert_eq!(store.display(at("let c").unwrap()).to_string(), "boolean");
    // Inline comments do not claim the next line.
    assert_eq!(info.declared_on_line(2), None);
    assert!(info.declared_on_line(3).is_some());
    // Line keys follow the comment even when that line is blank.
    assert!(info.declared_on_line(6).is_some());
    assert_eq!(info.declared_on_line(7), None);
    assert_eq!(info.declared_lines().count(), 2);
  }

  #[test]
  fn typedef_only_comments_declare_nothing() {
    let source = "/**\n * @typedef {object} Point\n * @property {number} x\n */\nconst origin = {};\n";
    let mut session = session(MemoryHost::new().with_file("a.js", source));
    let key = FileKey::new("a.js");
    session.load(&key).unwrap();
    let info = session.file(&key).unwrap();
    assert_eq!(info.declared_lines().count(), 0);
    assert!(session.typedefs().get("Point").is_some());
  }

  #[test]
  fn loads_imports_eagerly_and_shares_typedefs() {
    let host = MemoryHost::new()
      .with_file(
        "src/main.js",
        "import { make } from './shapes.js';\n/** @type {Circle} */\nconst c = make();\n",
      )
      .with_file(
        "src/shapes.js",
        "export * from './circle.js';\n",
      )
      .with_file(
        "src/circle.js",
        "/**\n * @typedef {object} Circle\n * @property {number} radius\n */\n/** @return {Circle} */\nexport function make() { return { radius: 1 }; }\n",
      );
    let mut session = session(host);
    let main = FileKey::new("src/main.js");
    session.load(&main).unwrap();
    assert!(session.file(&FileKey::new("src/circle.js")).is_some());
    assert_eq!(
      session.declared_type_on_line(&main, 3).as_deref(),
      Some("Circle")
    );
    let circle = session.typedefs().get("Circle").unwrap();
    assert_eq!(circle.file, FileKey::new("src/circle.js"));

    let (owner, decl) = session
      .get_named_export(&FileKey::new("src/shapes.js"), "make")
      .unwrap();
    assert_eq!(owner.key, FileKey::new("src/circle.js"));
    assert!(matches!(decl, ExportedDecl::Function(_)));
    assert!(session
      .get_named_export(&FileKey::new("src/shapes.js"), "missing")
      .is_none());
  }

  #[test]
  fn finds_every_kind_of_export() {
    let source = r#"
export const a = 1, { b, c: [d] } = obj;
export function f() {}
export class K {}
const local = 2;
export { local as renamed, local as default };
export { x as y } from './other.js';
export * as ns from './other.js';
"#;
    let mut session = session(MemoryHost::new().with_file("m.js", source));
    let key = FileKey::new("m.js");
    session.load(&key).unwrap();
    let info = session.file(&key).unwrap();
    assert!(matches!(info.named_export("a"), Some(ExportedDecl::Var { .. })));
    assert!(matches!(info.named_export("b"), Some(ExportedDecl::Local("b"))));
    assert!(matches!(info.named_export("d"), Some(ExportedDecl::Local("d"))));
    assert!(matches!(info.named_export("f"), Some(ExportedDecl::Function(_))));
    assert!(matches!(info.named_export("K"), Some(ExportedDecl::Class(_))));
    assert!(matches!(
      info.named_export("renamed"),
      Some(ExportedDecl::Local("local"))
    ));
    assert!(matches!(
      info.default_export(),
      Some(ExportedDecl::Local("local"))
    ));
    assert!(matches!(
      info.named_export("y"),
      Some(ExportedDecl::Reexport {
        module: "./other.js",
        imported: ImportedRef::Named("x"),
      })
    ));
    assert!(matches!(
      info.named_export("ns"),
      Some(ExportedDecl::Reexport {
        imported: ImportedRef::Namespace,
        ..
      })
    ));
    assert!(info.named_export("local").is_none());
  }

  #[test]
  fn unreadable_and_unparsable_files_are_degenerate() {
    let host = MemoryHost::new()
      .with_file("main.js", "import a from './broken.js';\nimport b from './gone.js';\n")
      .with_file("broken.js", "let = ;");
    let mut session = session(host);
    let main = FileKey::new("main.js");
    session.load(&main).unwrap();
    // `gone.js` does not resolve at all; `broken.js` resolves but fails to parse.
    let broken = session.file(&FileKey::new("broken.js")).unwrap();
    assert!(matches!(broken.status, FileStatus::SyntaxError(_)));
    assert!(broken.ast().is_none());
    assert!(session.check_file(&main).unwrap().is_empty());
    let diagnostics = session.check_file(&FileKey::new("broken.js")).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, SYNTAX_ERROR);

    let err = session.load(&FileKey::new("nope.js")).unwrap_err();
    assert!(matches!(err, FatalError::Host(HostError::MissingFileText { .. })));
    // The failed read is cached rather than retried.
    assert!(session.file(&FileKey::new("nope.js")).is_some());
  }

  #[test]
  fn file_info_is_loaded_once() {
    let mut session = session(MemoryHost::new().with_file("a.js", "export const a = 1;\n"));
    let key = FileKey::new("a.js");
    let first = session.get_file_info(&key).unwrap() as *const FileInfo;
    let second = session.get_file_info(&key).unwrap() as *const FileInfo;
    assert_eq!(first, second);
    assert!(matches!(session.file(&key).unwrap().status, FileStatus::Ok));

    let missing = FileKey::new("missing.js");
    let err = session.get_file_info(&missing).unwrap_err();
    assert!(matches!(err, FatalError::Host(HostError::MissingFileText { .. })));
    let shell = session.file(&missing).unwrap();
    assert!(matches!(shell.status, FileStatus::Unreadable(_)));
    assert!(shell.ast().is_none());
    assert!(shell.named_export("a").is_none());
    assert!(shell.default_export().is_none());
  }

  #[test]
  fn finds_default_exports() {
    let host = MemoryHost::new()
      .with_file("func.js", "export default function make() {}\n")
      .with_file("expr.js", "export default 1 + 2;\n")
      .with_file("again.js", "export { default } from './func.js';\n")
      .with_file("none.js", "export const a = 1;\n");
    let mut session = session(host);
    for name in ["func.js", "expr.js", "again.js", "none.js"] {
      session.load(&FileKey::new(name)).unwrap();
    }
    let (owner, decl) = session.get_default_export(&FileKey::new("func.js")).unwrap();
    assert_eq!(owner.key, FileKey::new("func.js"));
    assert!(matches!(decl, ExportedDecl::Function(_)));
    let (_, decl) = session.get_default_export(&FileKey::new("expr.js")).unwrap();
    assert!(matches!(decl, ExportedDecl::Expr(_)));
    let (owner, decl) = session.get_default_export(&FileKey::new("again.js")).unwrap();
    assert_eq!(owner.key, FileKey::new("again.js"));
    assert!(matches!(
      decl,
      ExportedDecl::Reexport {
        module: "./func.js",
        imported: ImportedRef::Default,
      }
    ));
    assert!(session.get_default_export(&FileKey::new("none.js")).is_none());
    assert!(session.get_default_export(&FileKey::new("unloaded.js")).is_none());
  }

  #[test]
  fn failed_loads_leave_nothing_behind() {
    let host = MemoryHost::new()
      .with_file("base.js", "/** @typedef {number} Id */\nexport const a = 1;\n")
      .with_file("clash.js", "import { b } from './other.js';\n/** @typedef {string} Id */\n")
      .with_file("other.js", "/** @typedef {boolean} Flag */\nexport const b = true;\n");
    let mut session = session(host);
    session.load(&FileKey::new("base.js")).unwrap();
    let err = session.load(&FileKey::new("clash.js")).unwrap_err();
    assert!(matches!(err, FatalError::DuplicateTypedef { ref name, .. } if name == "Id"));
    assert!(session.file(&FileKey::new("clash.js")).is_none());
    assert!(session.file(&FileKey::new("other.js")).is_none());
    assert!(session.typedefs().get("Flag").is_none());
    let id = session.typedefs().get("Id").unwrap();
    assert_eq!(id.file, FileKey::new("base.js"));
    assert!(session.file(&FileKey::new("base.js")).is_some());
  }
}
