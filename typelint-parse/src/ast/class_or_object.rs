use super::expr::Expr;
use super::expr::IdExpr;
use super::func::Func;
use super::node::Node;
use crate::token::TT;
use derive_more::derive::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// A node as the key may differ from the source text, due to decoding of string keys.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjMemberDirectKey {
  #[drive(skip)]
  pub key: String,
  // The original token type, to tell whether the key could have been a shorthand.
  #[drive(skip)]
  pub tt: TT,
}

// Direct keys are not variable usages, so this cannot be collapsed into an expression.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ClassOrObjKey {
  // Identifier, keyword, string, or number.
  Direct(Node<ClassOrObjMemberDirectKey>),
  Computed(Node<Expr>),
}

impl ClassOrObjKey {
  /// The statically known name of this key, if any.
  pub fn static_name(&self) -> Option<&str> {
    match self {
      ClassOrObjKey::Direct(d) => Some(&d.stx.key),
      ClassOrObjKey::Computed(_) => None,
    }
  }
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjGetter {
  pub func: Node<Func>, // `parameters` is empty.
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjMethod {
  pub func: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrObjSetter {
  pub func: Node<Func>, // `parameters` has exactly one entry.
}

#[derive(Debug, Drive, DriveMut, From, Serialize)]
pub enum ClassOrObjVal {
  Getter(Node<ClassOrObjGetter>),
  Setter(Node<ClassOrObjSetter>),
  Method(Node<ClassOrObjMethod>),
  // Always Some for object literals; shorthands are ObjMemberType::Shorthand.
  Prop(Option<Node<Expr>>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ObjMemberType {
  Valued { key: ClassOrObjKey, val: ClassOrObjVal },
  Shorthand { id: Node<IdExpr> },
  Rest { val: Node<Expr> },
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassMember {
  pub key: ClassOrObjKey,
  #[drive(skip)]
  pub static_: bool,
  pub val: ClassOrObjVal,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjMember {
  pub typ: ObjMemberType,
}
