//! Turning annotation tags into types.
//!
//! Typedefs are built in two passes over a file's annotation comments. The first
//! registers an unbound alias per `@typedef`/`@callback` name in the session's
//! [`TypedefTable`]; the second builds every definition and binds its alias. Because
//! every name is visible before any body is built, a typedef may refer to itself or
//! to one defined later in the same or another loaded file.
use crate::error::FatalError;
use crate::host::FileKey;
use crate::jsdoc::expr::parse_type_expr;
use crate::jsdoc::expr::TypeExpr;
use crate::jsdoc::parse_tags;
use crate::jsdoc::Tag;
use crate::types::FunctionType;
use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use ahash::HashMap;
use ahash::HashMapExt;
use typelint_parse::comment::Comment;
use typelint_parse::loc::LineIndex;
use typelint_parse::loc::Loc;

/// The logical scope typedefs are filed under, set by `@module` and `@global`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DocScope {
  #[default]
  Global,
  Module(String),
}

/// An annotation comment with its tags and the scope in effect where it appears.
#[derive(Clone, Debug)]
pub struct DocComment {
  pub loc: Loc,
  pub start_line: usize,
  pub end_line: usize,
  pub tags: Vec<Tag>,
  pub scope: DocScope,
}

impl DocComment {
  /// Tags describing the code that follows, i.e. everything before the first typedef.
  pub fn declaration_tags(&self) -> &[Tag] {
    let end = self
      .tags
      .iter()
      .position(starts_typedef)
      .unwrap_or(self.tags.len());
    &self.tags[..end]
  }

  /// Each `@typedef` or `@callback` tag followed by the tags that describe it.
  pub fn typedef_groups(&self) -> Vec<&[Tag]> {
    let starts: Vec<usize> = self
      .tags
      .iter()
      .enumerate()
      .filter(|(_, t)| starts_typedef(t))
      .map(|(i, _)| i)
      .collect();
    starts
      .iter()
      .enumerate()
      .map(|(n, start)| {
        let end = starts.get(n + 1).copied().unwrap_or(self.tags.len());
        &self.tags[*start..end]
      })
      .collect()
  }
}

fn starts_typedef(tag: &Tag) -> bool {
  matches!(tag.tag.as_str(), "typedef" | "callback")
}

fn is_param(tag: &Tag) -> bool {
  matches!(tag.tag.as_str(), "param" | "arg" | "argument")
}

fn is_return(tag: &Tag) -> bool {
  matches!(tag.tag.as_str(), "return" | "returns")
}

fn is_property(tag: &Tag) -> bool {
  matches!(tag.tag.as_str(), "property" | "prop")
}

/// Collects the documentation comments of a file in source order.
pub fn doc_comments(source: &str, comments: &[Comment], lines: &LineIndex) -> Vec<DocComment> {
  let mut scope = DocScope::Global;
  comments
    .iter()
    .filter(|c| c.is_doc(source))
    .map(|c| {
      let tags = parse_tags(c.value(source));
      for tag in tags.iter() {
        match tag.tag.as_str() {
          "module" => scope = DocScope::Module(tag.name.clone().unwrap_or_default()),
          "global" => scope = DocScope::Global,
          _ => {}
        }
      }
      DocComment {
        loc: c.loc,
        start_line: lines.start_line(c.loc),
        end_line: lines.end_line(c.loc),
        tags,
        scope: scope.clone(),
      }
    })
    .collect()
}

#[derive(Clone, Debug)]
pub struct TypedefEntry {
  pub alias: TypeId,
  pub file: FileKey,
  pub scope: DocScope,
  pub line: usize,
}

/// Typedefs by name, shared by all files of a session.
#[derive(Debug, Default)]
pub struct TypedefTable {
  entries: HashMap<String, TypedefEntry>,
}

impl TypedefTable {
  pub fn new() -> Self {
    TypedefTable {
      entries: HashMap::new(),
    }
  }

  /// Registers a typedef name. A name may be defined only once per session.
  pub fn register(&mut self, name: &str, entry: TypedefEntry) -> Result<(), FatalError> {
    if let Some(first) = self.entries.get(name) {
      return Err(FatalError::DuplicateTypedef {
        name: name.to_string(),
        file: entry.file,
        line: entry.line,
        first: first.file.clone(),
      });
    }
    self.entries.insert(name.to_string(), entry);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&TypedefEntry> {
    self.entries.get(name)
  }

  /// Drops every typedef registered by `file`.
  pub fn forget_file(&mut self, file: &FileKey) {
    self.entries.retain(|_, entry| &entry.file != file);
  }

  /// Every typedef, sorted by name.
  pub fn entries(&self) -> Vec<(&str, &TypedefEntry)> {
    let mut entries: Vec<_> = self
      .entries
      .iter()
      .map(|(name, entry)| (name.as_str(), entry))
      .collect();
    entries.sort_by_key(|(name, _)| *name);
    entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Resolves a type name to a typedef's alias, including `module:path~Name` and
  /// `module:path.Name` references to a typedef filed under that module.
  pub fn lookup(&self, reference: &str) -> Option<TypeId> {
    let Some(qualified) = reference.strip_prefix("module:") else {
      return self.entries.get(reference).map(|e| e.alias);
    };
    let (module, name) = qualified.rsplit_once(|c| c == '~' || c == '.')?;
    self
      .entries
      .get(name)
      .filter(|e| e.scope == DocScope::Module(module.to_string()))
      .map(|e| e.alias)
  }
}

// A parameter or property, with the dotted children that extend it.
struct Member {
  name: String,
  typ: TypeId,
  optional: bool,
  rest: bool,
  children: Vec<Member>,
}

// Places `member` under the entry its dotted name points to. Members whose parent
// is unknown are dropped.
fn attach(members: &mut Vec<Member>, mut member: Member) {
  let Some((parent, child)) = member.name.split_once('.') else {
    members.push(member);
    return;
  };
  let (parent, child) = (parent.to_string(), child.to_string());
  if let Some(p) = members.iter_mut().find(|m| m.name == parent) {
    member.name = child;
    attach(&mut p.children, member);
  }
}

pub struct Builder<'b> {
  store: &'b mut TypeStore,
  typedefs: &'b TypedefTable,
  file: &'b FileKey,
  // Line of the comment being built, for error reporting.
  line: usize,
}

impl<'b> Builder<'b> {
  pub fn new(
    store: &'b mut TypeStore,
    typedefs: &'b TypedefTable,
    file: &'b FileKey,
    line: usize,
  ) -> Self {
    Builder {
      store,
      typedefs,
      file,
      line,
    }
  }

  fn parse_tag_expr(&self, tag: &Tag) -> Result<Option<TypeExpr>, FatalError> {
    let Some(text) = tag.typ.as_deref() else {
      return Ok(None);
    };
    parse_type_expr(text)
      .map(Some)
      .map_err(|err| FatalError::UnsupportedTypeSyntax {
        file: self.file.clone(),
        line: self.line + tag.line_offset,
        text: text.to_string(),
        reason: err.to_string(),
      })
  }

  /// The type written in a tag's braces, or `Any` if it has none.
  pub fn build_type(&mut self, tag: &Tag) -> Result<TypeId, FatalError> {
    Ok(match self.parse_tag_expr(tag)? {
      Some(expr) => self.build_expr(&expr),
      None => self.store.any(),
    })
  }

  pub fn build_expr(&mut self, expr: &TypeExpr) -> TypeId {
    match expr {
      TypeExpr::Any => self.store.any(),
      TypeExpr::Name(name) => self.build_name(name),
      TypeExpr::Union(members) => {
        let members: Vec<TypeId> = members.iter().map(|m| self.build_expr(m)).collect();
        self.store.union(members)
      }
      TypeExpr::Array(elem) | TypeExpr::Rest(elem) => {
        let elem = self.build_expr(elem);
        self.store.array(elem)
      }
      TypeExpr::Apply { base, args } => match (base.as_str(), args.as_slice()) {
        ("Array", [elem]) => {
          let elem = self.build_expr(elem);
          self.store.array(elem)
        }
        // Type parameters are not tracked.
        _ => self.build_name(base),
      },
      TypeExpr::Function { params, rest, ret } => {
        let args = params.iter().map(|p| self.build_expr(p)).collect();
        let rest = rest.as_ref().map(|r| self.build_expr(r));
        let ret = match ret {
          Some(ret) => self.build_expr(ret),
          None => self.store.any(),
        };
        self.store.function(FunctionType {
          ret,
          args,
          rest,
          params: Vec::new(),
        })
      }
      TypeExpr::Record(props) => {
        let props = props
          .iter()
          .map(|(name, typ)| {
            let typ = match typ {
              Some(typ) => self.build_expr(typ),
              None => self.store.any(),
            };
            (name.clone(), typ)
          })
          .collect();
        self.store.record(props)
      }
      TypeExpr::Optional(inner) => {
        let inner = self.build_expr(inner);
        let undefined = self.store.undefined();
        self.store.union([inner, undefined])
      }
      TypeExpr::Nullable(inner) => {
        let inner = self.build_expr(inner);
        let null = self.store.null();
        self.store.union([inner, null])
      }
      TypeExpr::NonNullable(inner) => self.build_expr(inner),
      TypeExpr::Import { name, .. } => match name {
        Some(name) => self.build_name(name),
        None => self.store.any(),
      },
    }
  }

  fn build_name(&mut self, name: &str) -> TypeId {
    match name {
      "any" | "unknown" => return self.store.any(),
      "Array" => {
        let any = self.store.any();
        return self.store.array(any);
      }
      "Function" => return self.store.primitive("function"),
      "void" => return self.store.undefined(),
      _ => {}
    };
    match self.typedefs.lookup(name) {
      Some(alias) => alias,
      None => self.store.primitive(name),
    }
  }

  fn member(&mut self, tag: &Tag) -> Result<Member, FatalError> {
    let expr = self.parse_tag_expr(tag)?;
    let (typ, rest) = match &expr {
      Some(TypeExpr::Rest(elem)) => (self.build_expr(elem), true),
      Some(expr) => (self.build_expr(expr), false),
      None => (self.store.any(), false),
    };
    Ok(Member {
      name: tag.name.clone().unwrap_or_default(),
      typ,
      optional: tag.optional,
      rest,
      children: Vec::new(),
    })
  }

  fn finish_member(&mut self, member: Member) -> TypeId {
    let mut typ = member.typ;
    let object_like = match self.store.kind(typ) {
      TypeKind::Any => true,
      TypeKind::Primitive(name) => name == "object" || name == "Object",
      _ => false,
    };
    if object_like && !member.children.is_empty() {
      let props = member
        .children
        .into_iter()
        .map(|child| (child.name.clone(), self.finish_member(child)))
        .collect();
      typ = self.store.record(props);
    }
    if member.optional {
      let undefined = self.store.undefined();
      typ = self.store.union([typ, undefined]);
    }
    typ
  }

  /// A function type from `@param` and `@return` tags.
  pub fn build_function(&mut self, tags: &[Tag]) -> Result<TypeId, FatalError> {
    let ret = match tags.iter().find(|t| is_return(t)) {
      Some(tag) => self.build_type(tag)?,
      None => self.store.any(),
    };
    let mut members = Vec::new();
    for tag in tags.iter().filter(|t| is_param(t)) {
      let member = self.member(tag)?;
      attach(&mut members, member);
    }
    let mut func = FunctionType {
      ret,
      args: Vec::new(),
      rest: None,
      params: Vec::new(),
    };
    for member in members {
      let (name, rest) = (member.name.clone(), member.rest);
      let typ = self.finish_member(member);
      if rest {
        func.rest = Some(typ);
        if !name.is_empty() {
          let array = self.store.array(typ);
          func.params.push((name, array));
        }
      } else {
        func.args.push(typ);
        if !name.is_empty() {
          func.params.push((name, typ));
        }
      }
    }
    Ok(self.store.function(func))
  }

  /// The definition of a typedef group: the `@typedef`/`@callback` tag followed by
  /// the tags that describe it.
  pub fn build_typedef(&mut self, group: &[Tag]) -> Result<TypeId, FatalError> {
    let Some((head, body)) = group.split_first() else {
      return Ok(self.store.any());
    };
    if head.tag == "callback" {
      return self.build_function(body);
    }
    let base = self.parse_tag_expr(head)?;
    let has_properties = body.iter().any(is_property);
    let object_base = match &base {
      None => true,
      Some(TypeExpr::Name(name)) => name == "object" || name == "Object",
      Some(TypeExpr::Record(_)) => true,
      Some(_) => false,
    };
    if !(has_properties && object_base) {
      return Ok(match base {
        Some(expr) => self.build_expr(&expr),
        None => self.store.any(),
      });
    }
    let mut members = Vec::new();
    if let Some(TypeExpr::Record(fields)) = &base {
      for (name, typ) in fields {
        let typ = match typ {
          Some(typ) => self.build_expr(typ),
          None => self.store.any(),
        };
        members.push(Member {
          name: name.clone(),
          typ,
          optional: false,
          rest: false,
          children: Vec::new(),
        });
      }
    }
    for tag in body.iter().filter(|t| is_property(t)) {
      let member = self.member(tag)?;
      attach(&mut members, member);
    }
    let props = members
      .into_iter()
      .map(|m| (m.name.clone(), self.finish_member(m)))
      .collect();
    Ok(self.store.record(props))
  }

  /// The type a comment declares for the code after it, if any.
  pub fn build_declaration(&mut self, tags: &[Tag]) -> Result<Option<TypeId>, FatalError> {
    let typed = tags.iter().find(|t| {
      matches!(t.tag.as_str(), "type" | "const" | "constant") && t.typ.is_some()
    });
    if let Some(tag) = typed {
      return self.build_type(tag).map(Some);
    }
    if tags.iter().any(|t| is_param(t) || is_return(t)) {
      return self.build_function(tags).map(Some);
    }
    if tags
      .iter()
      .any(|t| matches!(t.tag.as_str(), "function" | "func" | "method"))
    {
      let any = self.store.any();
      return Ok(Some(self.store.function(FunctionType {
        ret: any,
        args: Vec::new(),
        rest: None,
        params: Vec::new(),
      })));
    }
    Ok(None)
  }
}

/// Registers an unbound alias for every typedef in `comments`.
pub fn register_typedefs(
  store: &mut TypeStore,
  table: &mut TypedefTable,
  file: &FileKey,
  comments: &[DocComment],
) -> Result<(), FatalError> {
  for comment in comments {
    for group in comment.typedef_groups() {
      let head = &group[0];
      let Some(name) = head.name.as_deref() else {
        continue;
      };
      let alias = store.alias(name);
      table.register(name, TypedefEntry {
        alias,
        file: file.clone(),
        scope: comment.scope.clone(),
        line: comment.start_line + head.line_offset,
      })?;
    }
  }
  Ok(())
}

/// Builds and binds the definitions of typedefs registered by [`register_typedefs`].
pub fn define_typedefs(
  store: &mut TypeStore,
  table: &TypedefTable,
  file: &FileKey,
  comments: &[DocComment],
) -> Result<(), FatalError> {
  for comment in comments {
    for group in comment.typedef_groups() {
      let Some(alias) = group[0]
        .name
        .as_deref()
        .and_then(|name| table.get(name))
        .filter(|entry| &entry.file == file)
        .map(|entry| entry.alias)
      else {
        continue;
      };
      let mut builder = Builder::new(store, table, file, comment.start_line);
      let definition = builder.build_typedef(group)?;
      store.bind_alias(alias, definition);
    }
  }
  Ok(())
}
