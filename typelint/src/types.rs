//! The type model: a closed set of type kinds stored in an arena.
//!
//! Every type is addressed by a [`TypeId`]. Identity of ids is what the relation's
//! "same type" short circuit compares, and aliases hold the id of their target, so a
//! typedef that refers to itself is just an alias whose target eventually contains
//! the alias's own id.
use ahash::HashMap;
use ahash::HashMapExt;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
  pub fn raw(self) -> u32 {
    self.0
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
  pub ret: TypeId,
  /// Positional argument types, used at call sites.
  pub args: Vec<TypeId>,
  /// Element type of a trailing rest parameter.
  pub rest: Option<TypeId>,
  /// Parameter types by name, used to type parameter bindings inside the body.
  pub params: Vec<(String, TypeId)>,
}

impl FunctionType {
  pub fn arg_count(&self) -> usize {
    self.args.len()
  }

  pub fn param(&self, name: &str) -> Option<TypeId> {
    self
      .params
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, t)| *t)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
  /// Accepts everything as a requirement; satisfies only `Any` as a value.
  Any,
  /// Compatible with nothing in either direction.
  Invalid,
  Primitive(String),
  /// A named reference to another type. Created unbound and bound exactly once.
  Alias { name: String, target: Option<TypeId> },
  Union(Vec<TypeId>),
  /// Properties in declaration order; keys are unique.
  Record(Vec<(String, TypeId)>),
  Array(TypeId),
  Function(FunctionType),
}

#[derive(Debug)]
pub struct TypeStore {
  kinds: Vec<TypeKind>,
  primitives: HashMap<String, TypeId>,
}

const ANY: TypeId = TypeId(0);
const INVALID: TypeId = TypeId(1);

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TypeStore {
  pub fn new() -> Self {
    TypeStore {
      kinds: vec![TypeKind::Any, TypeKind::Invalid],
      primitives: HashMap::new(),
    }
  }

  fn push(&mut self, kind: TypeKind) -> TypeId {
    let id = TypeId(self.kinds.len() as u32);
    self.kinds.push(kind);
    id
  }

  pub fn kind(&self, id: TypeId) -> &TypeKind {
    &self.kinds[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.kinds.len()
  }

  pub fn is_empty(&self) -> bool {
    self.kinds.is_empty()
  }

  pub fn any(&self) -> TypeId {
    ANY
  }

  pub fn invalid(&self) -> TypeId {
    INVALID
  }

  /// Interns a primitive by name, with all whitespace removed.
  pub fn primitive(&mut self, name: &str) -> TypeId {
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(id) = self.primitives.get(&name) {
      return *id;
    }
    let id = self.push(TypeKind::Primitive(name.clone()));
    self.primitives.insert(name, id);
    id
  }

  pub fn string(&mut self) -> TypeId {
    self.primitive("string")
  }

  pub fn number(&mut self) -> TypeId {
    self.primitive("number")
  }

  pub fn boolean(&mut self) -> TypeId {
    self.primitive("boolean")
  }

  pub fn undefined(&mut self) -> TypeId {
    self.primitive("undefined")
  }

  pub fn null(&mut self) -> TypeId {
    self.primitive("null")
  }

  /// Creates an unbound alias, to be bound with [`TypeStore::bind_alias`].
  pub fn alias(&mut self, name: &str) -> TypeId {
    self.push(TypeKind::Alias {
      name: name.to_string(),
      target: None,
    })
  }

  /// Points an alias at its definition. Returns false if `alias` is not an unbound alias.
  pub fn bind_alias(&mut self, alias: TypeId, to: TypeId) -> bool {
    match &mut self.kinds[alias.0 as usize] {
      TypeKind::Alias { target, .. } if target.is_none() => {
        *target = Some(to);
        true
      }
      _ => false,
    }
  }

  /// Builds a union, flattening nested unions and dropping repeated members.
  ///
  /// A single distinct member is returned as is.
  pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
    let mut flat = Vec::new();
    for member in members {
      match self.kind(member) {
        TypeKind::Union(inner) => {
          for m in inner.iter() {
            if !flat.contains(m) {
              flat.push(*m);
            }
          }
        }
        _ => {
          if !flat.contains(&member) {
            flat.push(member);
          }
        }
      };
    }
    match flat.len() {
      0 => INVALID,
      1 => flat[0],
      _ => self.push(TypeKind::Union(flat)),
    }
  }

  pub fn record(&mut self, props: Vec<(String, TypeId)>) -> TypeId {
    let mut unique: Vec<(String, TypeId)> = Vec::with_capacity(props.len());
    for (name, typ) in props {
      match unique.iter_mut().find(|(n, _)| *n == name) {
        Some(existing) => existing.1 = typ,
        None => unique.push((name, typ)),
      }
    }
    self.push(TypeKind::Record(unique))
  }

  pub fn array(&mut self, elem: TypeId) -> TypeId {
    self.push(TypeKind::Array(elem))
  }

  pub fn function(&mut self, func: FunctionType) -> TypeId {
    self.push(TypeKind::Function(func))
  }

  /// Follows aliases to the first non-alias type. Unbound or circular aliases are `Any`.
  pub fn resolve(&self, mut id: TypeId) -> TypeId {
    for _ in 0..self.kinds.len() {
      match self.kind(id) {
        TypeKind::Alias {
          target: Some(target),
          ..
        } => id = *target,
        TypeKind::Alias { target: None, .. } => return ANY,
        _ => return id,
      }
    }
    ANY
  }

  pub fn is_any(&self, id: TypeId) -> bool {
    self.resolve(id) == ANY
  }

  pub fn as_function(&self, id: TypeId) -> Option<&FunctionType> {
    match self.kind(self.resolve(id)) {
      TypeKind::Function(func) => Some(func),
      _ => None,
    }
  }

  pub fn is_primitive(&self, id: TypeId, name: &str) -> bool {
    matches!(self.kind(self.resolve(id)), TypeKind::Primitive(p) if p == name)
  }

  /// Type of property `name`, or `Any` when the type does not track it.
  pub fn property(&self, id: TypeId, name: &str) -> TypeId {
    match self.kind(self.resolve(id)) {
      TypeKind::Record(props) => props
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, t)| *t)
        .unwrap_or(ANY),
      _ => ANY,
    }
  }

  pub fn element(&self, id: TypeId) -> TypeId {
    match self.kind(self.resolve(id)) {
      TypeKind::Array(elem) => *elem,
      _ => ANY,
    }
  }

  pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
    TypeDisplay {
      store: self,
      id,
      grouped: false,
    }
  }

  /// Like [`TypeStore::display`], but wraps unions in parentheses so the result can sit
  /// inside a longer sentence or a compound type.
  pub fn display_grouped(&self, id: TypeId) -> TypeDisplay<'_> {
    TypeDisplay {
      store: self,
      id,
      grouped: true,
    }
  }
}

pub struct TypeDisplay<'s> {
  store: &'s TypeStore,
  id: TypeId,
  grouped: bool,
}

impl<'s> TypeDisplay<'s> {
  fn nested(&self, id: TypeId, grouped: bool) -> TypeDisplay<'s> {
    TypeDisplay {
      store: self.store,
      id,
      grouped,
    }
  }
}

impl fmt::Display for TypeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.store.kind(self.id) {
      TypeKind::Any => f.write_str("any"),
      TypeKind::Invalid => f.write_str("invalid"),
      TypeKind::Primitive(name) => f.write_str(name),
      // Aliases print by name so recursive typedefs terminate.
      TypeKind::Alias { name, .. } => f.write_str(name),
      TypeKind::Union(members) => {
        if self.grouped {
          f.write_str("(")?;
        }
        for (i, m) in members.iter().enumerate() {
          if i > 0 {
            f.write_str("|")?;
          }
          write!(f, "{}", self.nested(*m, true))?;
        }
        if self.grouped {
          f.write_str(")")?;
        }
        Ok(())
      }
      TypeKind::Record(props) => {
        f.write_str("{")?;
        for (i, (name, t)) in props.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{name}:{}", self.nested(*t, false))?;
        }
        f.write_str("}")
      }
      TypeKind::Array(elem) => write!(f, "{}[]", self.nested(*elem, true)),
      TypeKind::Function(func) => {
        f.write_str("function(")?;
        for (i, arg) in func.args.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{}", self.nested(*arg, false))?;
        }
        if let Some(rest) = func.rest {
          if !func.args.is_empty() {
            f.write_str(", ")?;
          }
          write!(f, "...{}", self.nested(rest, true))?;
        }
        write!(f, "):{}", self.nested(func.ret, true))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn primitives_are_interned_without_whitespace() {
    let mut store = TypeStore::new();
    let a = store.primitive("number");
    let b = store.primitive(" num ber ");
    assert_eq!(a, b);
    assert_ne!(a, store.string());
  }

  #[test]
  fn unions_flatten_and_dedupe() {
    let mut store = TypeStore::new();
    let n = store.number();
    let s = store.string();
    let u = store.undefined();
    let inner = store.union([n, s]);
    let outer = store.union([inner, n, u]);
    assert_eq!(store.kind(outer), &TypeKind::Union(vec![n, s, u]));
    assert_eq!(store.union([n, n]), n);
  }

  #[test]
  fn aliases_bind_once() {
    let mut store = TypeStore::new();
    let alias = store.alias("Thing");
    assert!(store.is_any(alias));
    let n = store.number();
    assert!(store.bind_alias(alias, n));
    assert!(!store.bind_alias(alias, n));
    assert_eq!(store.resolve(alias), n);
    assert!(!store.bind_alias(n, alias));
  }

  #[test]
  fn circular_aliases_resolve_to_any() {
    let mut store = TypeStore::new();
    let a = store.alias("A");
    let b = store.alias("B");
    store.bind_alias(a, b);
    store.bind_alias(b, a);
    assert!(store.is_any(a));
  }

  #[test]
  fn displays_compound_types() {
    let mut store = TypeStore::new();
    let n = store.number();
    let s = store.string();
    let u = store.undefined();
    let name_value = store.record(vec![("name".to_string(), s), ("value".to_string(), u)]);
    let outer = store.record(vec![
      ("data".to_string(), name_value),
      ("department".to_string(), s),
    ]);
    assert_eq!(
      store.display(outer).to_string(),
      "{data:{name:string, value:undefined}, department:string}"
    );

    let opt = store.union([s, u]);
    assert_eq!(store.display(opt).to_string(), "string|undefined");
    assert_eq!(store.display_grouped(opt).to_string(), "(string|undefined)");
    let arr = store.array(opt);
    assert_eq!(store.display(arr).to_string(), "(string|undefined)[]");

    let any = store.any();
    let func = store.function(FunctionType {
      ret: n,
      args: vec![s, any],
      rest: Some(n),
      params: Vec::new(),
    });
    assert_eq!(store.display(func).to_string(), "function(string, any, ...number):number");
  }

  #[test]
  fn properties_of_non_records_are_any() {
    let mut store = TypeStore::new();
    let s = store.string();
    let rec = store.record(vec![("a".to_string(), s)]);
    let alias = store.alias("Rec");
    store.bind_alias(alias, rec);
    assert_eq!(store.property(alias, "a"), s);
    assert_eq!(store.property(alias, "b"), store.any());
    assert_eq!(store.property(s, "length"), store.any());
  }
}
