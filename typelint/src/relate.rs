//! Assignability between types.
//!
//! [`is_of_type`] asks whether a value of one type may be used where another is
//! required. Value kinds that only make sense from the required side (unions, `Any`)
//! defer to [`is_supertype_of`], which in turn hands concrete pairs back to
//! [`is_of_type`]. Concrete pairs are decided structurally without deferring again,
//! so the mutual recursion always shrinks one side.
use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use ahash::HashSet;
use ahash::HashSetExt;

/// Whether a value of type `value` can be used where `required` is expected.
pub fn is_of_type(store: &TypeStore, value: TypeId, required: TypeId) -> bool {
  Relate::new(store).is_of_type(value, required)
}

/// Whether `required` accepts a value of type `value`.
pub fn is_supertype_of(store: &TypeStore, required: TypeId, value: TypeId) -> bool {
  Relate::new(store).is_supertype_of(required, value)
}

// Names that accept any structured value of the matching shape.
fn is_object_wildcard(name: &str) -> bool {
  matches!(name, "object" | "Object")
}

fn is_function_wildcard(name: &str) -> bool {
  matches!(name, "function" | "Function")
}

struct Relate<'s> {
  store: &'s TypeStore,
  // Structural comparisons in progress. Meeting one again means a recursive typedef
  // is being compared with itself, which holds unless some other member disagrees.
  assumed: HashSet<(TypeId, TypeId)>,
}

impl<'s> Relate<'s> {
  fn new(store: &'s TypeStore) -> Self {
    Relate {
      store,
      assumed: HashSet::new(),
    }
  }

  fn alias_target(&self, id: TypeId) -> TypeId {
    match self.store.kind(id) {
      TypeKind::Alias {
        target: Some(target),
        ..
      } => *target,
      _ => self.store.any(),
    }
  }

  fn is_of_type(&mut self, value: TypeId, required: TypeId) -> bool {
    if value == required {
      return true;
    }
    let store = self.store;
    match store.kind(value) {
      TypeKind::Alias { .. } => {
        let target = self.alias_target(value);
        self.assuming(value, required, |r| r.is_of_type(target, required))
      }
      TypeKind::Any => self.is_supertype_of(required, value),
      TypeKind::Invalid => false,
      TypeKind::Union(members) => members.iter().all(|m| self.is_of_type(*m, required)),
      _ => self.concrete_is_of_type(value, required),
    }
  }

  fn concrete_is_of_type(&mut self, value: TypeId, required: TypeId) -> bool {
    let store = self.store;
    match (store.kind(value), store.kind(required)) {
      (_, TypeKind::Alias { .. }) => {
        let target = self.alias_target(required);
        self.assuming(value, required, |r| r.is_of_type(value, target))
      }
      (_, TypeKind::Any | TypeKind::Invalid | TypeKind::Union(_)) => {
        self.is_supertype_of(required, value)
      }
      (TypeKind::Primitive(v), TypeKind::Primitive(r)) => v == r,
      (TypeKind::Record(v_props), TypeKind::Record(r_props)) => {
        self.assuming(value, required, |r| {
          r_props.iter().all(|(name, r_type)| {
            let v_type = v_props
              .iter()
              .find(|(n, _)| n == name)
              .map(|(_, t)| *t)
              .unwrap_or(store.any());
            r.is_of_type(v_type, *r_type)
          })
        })
      }
      // Element types are compared with the required element on the value side.
      (TypeKind::Array(v_elem), TypeKind::Array(r_elem)) => {
        let (v_elem, r_elem) = (*v_elem, *r_elem);
        self.assuming(value, required, |r| r.is_of_type(r_elem, v_elem))
      }
      (TypeKind::Function(v_func), TypeKind::Function(r_func)) => {
        self.assuming(value, required, |r| {
          r.is_of_type(v_func.ret, r_func.ret)
            && r_func.args.iter().enumerate().all(|(i, r_arg)| {
              // A value function ignoring an argument accepts anything there.
              let v_arg = v_func.args.get(i).copied().or(v_func.rest);
              match v_arg {
                Some(v_arg) => r.is_of_type(*r_arg, v_arg),
                None => true,
              }
            })
        })
      }
      (TypeKind::Function(_), TypeKind::Primitive(name)) => {
        is_function_wildcard(name) || is_object_wildcard(name)
      }
      (TypeKind::Record(_) | TypeKind::Array(_), TypeKind::Primitive(name)) => {
        is_object_wildcard(name)
      }
      _ => false,
    }
  }

  fn is_supertype_of(&mut self, required: TypeId, value: TypeId) -> bool {
    if required == value {
      return true;
    }
    let store = self.store;
    match store.kind(required) {
      TypeKind::Alias { .. } => {
        let target = self.alias_target(required);
        self.assuming(value, required, |r| r.is_supertype_of(target, value))
      }
      TypeKind::Any => true,
      TypeKind::Invalid => false,
      TypeKind::Union(members) => members.iter().any(|m| self.is_supertype_of(*m, value)),
      _ => match store.kind(value) {
        TypeKind::Any | TypeKind::Invalid => false,
        _ => self.is_of_type(value, required),
      },
    }
  }

  fn assuming(
    &mut self,
    value: TypeId,
    required: TypeId,
    f: impl FnOnce(&mut Self) -> bool,
  ) -> bool {
    if !self.assumed.insert((value, required)) {
      return true;
    }
    let result = f(self);
    self.assumed.remove(&(value, required));
    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::FunctionType;

  fn func(store: &mut TypeStore, ret: TypeId, args: Vec<TypeId>) -> TypeId {
    store.function(FunctionType {
      ret,
      args,
      rest: None,
      params: Vec::new(),
    })
  }

  #[test]
  fn every_type_is_of_itself() {
    let mut store = TypeStore::new();
    let any = store.any();
    let invalid = store.invalid();
    let n = store.number();
    let rec = store.record(vec![("a".to_string(), n)]);
    let alias = store.alias("Unbound");
    for t in [any, invalid, n, rec, alias] {
      assert!(is_of_type(&store, t, t));
    }
  }

  #[test]
  fn primitives_compare_by_name() {
    let mut store = TypeStore::new();
    let n = store.number();
    let s = store.string();
    let n2 = store.primitive("number");
    assert!(is_of_type(&store, n, n2));
    assert!(!is_of_type(&store, n, s));
    assert!(!is_of_type(&store, s, n));
  }

  #[test]
  fn any_is_permissive_only_as_a_requirement() {
    let mut store = TypeStore::new();
    let any = store.any();
    let n = store.number();
    assert!(is_of_type(&store, n, any));
    assert!(!is_of_type(&store, any, n));
    let invalid = store.invalid();
    assert!(!is_of_type(&store, invalid, any));
    assert!(!is_of_type(&store, n, invalid));
  }

  #[test]
  fn union_values_need_every_member_to_fit() {
    let mut store = TypeStore::new();
    let n = store.number();
    let s = store.string();
    let u = store.undefined();
    let ns = store.union([n, s]);
    let nu = store.union([n, u]);
    for t in [n, s, u, ns, nu] {
      assert_eq!(
        is_of_type(&store, ns, t),
        is_of_type(&store, n, t) && is_of_type(&store, s, t)
      );
    }
    // Asked of the union itself, the identity short circuit answers first.
    for t in [n, s, u, nu] {
      assert_eq!(
        is_supertype_of(&store, ns, t),
        is_supertype_of(&store, n, t) || is_supertype_of(&store, s, t)
      );
    }
    assert!(is_of_type(&store, n, nu));
    assert!(is_of_type(&store, u, nu));
    assert!(!is_of_type(&store, nu, n));
    let snu = store.union([s, n, u]);
    assert!(is_of_type(&store, nu, snu));
  }

  #[test]
  fn functions_are_contravariant_in_arguments() {
    let mut store = TypeStore::new();
    let n = store.number();
    let any = store.any();
    let f1 = func(&mut store, n, vec![any]);
    let f2 = func(&mut store, n, vec![n]);
    assert!(is_of_type(&store, f1, f2));
    assert!(!is_of_type(&store, f2, f1));

    let s = store.string();
    let returns_string = func(&mut store, s, vec![]);
    assert!(!is_of_type(&store, returns_string, f2));
    let wildcard = store.primitive("function");
    assert!(is_of_type(&store, f2, wildcard));
    assert!(!is_of_type(&store, n, wildcard));
    let object = store.primitive("object");
    assert!(is_of_type(&store, f2, object));
    let record = store.record(vec![]);
    assert!(!is_of_type(&store, record, wildcard));
  }

  #[test]
  fn arrays_compare_elements_from_the_required_side() {
    let mut store = TypeStore::new();
    let n = store.number();
    let u = store.undefined();
    let nu = store.union([n, u]);
    let numbers = store.array(n);
    let maybe_numbers = store.array(nu);
    assert!(is_of_type(&store, maybe_numbers, numbers));
    assert!(!is_of_type(&store, numbers, maybe_numbers));
  }

  #[test]
  fn records_use_width_subtyping() {
    let mut store = TypeStore::new();
    let n = store.number();
    let s = store.string();
    let required = store.record(vec![("a".to_string(), n)]);
    let wider = store.record(vec![("a".to_string(), n), ("b".to_string(), s)]);
    let missing = store.record(vec![("b".to_string(), s)]);
    let wrong = store.record(vec![("a".to_string(), s)]);
    assert!(is_of_type(&store, wider, required));
    assert!(!is_of_type(&store, missing, required));
    assert!(!is_of_type(&store, wrong, required));
    let object = store.primitive("object");
    assert!(is_of_type(&store, wider, object));
  }

  #[test]
  fn aliases_are_transparent() {
    let mut store = TypeStore::new();
    let n = store.number();
    let a = store.alias("A");
    let b = store.alias("B");
    store.bind_alias(a, n);
    store.bind_alias(b, n);
    assert!(is_of_type(&store, a, b));
    assert!(is_of_type(&store, n, a));
    assert!(is_of_type(&store, a, n));
    let s = store.string();
    assert!(!is_of_type(&store, s, a));
  }

  #[test]
  fn recursive_typedefs_terminate() {
    let mut store = TypeStore::new();
    let n = store.number();
    let s = store.string();
    let null = store.null();
    let list_a = store.alias("ListA");
    let next_a = store.union([list_a, null]);
    let body_a = store.record(vec![("value".to_string(), n), ("next".to_string(), next_a)]);
    store.bind_alias(list_a, body_a);
    let list_b = store.alias("ListB");
    let next_b = store.union([list_b, null]);
    let body_b = store.record(vec![("value".to_string(), n), ("next".to_string(), next_b)]);
    store.bind_alias(list_b, body_b);
    assert!(is_of_type(&store, list_a, list_b));

    let list_c = store.alias("ListC");
    let next_c = store.union([list_c, null]);
    let body_c = store.record(vec![("value".to_string(), s), ("next".to_string(), next_c)]);
    store.bind_alias(list_c, body_c);
    assert!(!is_of_type(&store, list_c, list_a));
  }
}
