use super::Expr;
use crate::ast::class_or_object::ObjMember;
use crate::ast::node::Node;
use crate::num::JsNumber;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitBoolExpr {
  #[drive(skip)]
  pub value: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitNumExpr {
  #[drive(skip)]
  pub value: JsNumber,
}

/// Decoded, without quotes.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitStrExpr {
  #[drive(skip)]
  pub value: String,
}

// Only the kind of these literals is ever needed, so their source text is not kept.

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitNullExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitBigIntExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitRegexExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitTemplateExpr {
  pub parts: Vec<LitTemplatePart>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum LitTemplatePart {
  Substitution(Node<Expr>),
  #[drive(skip)]
  String(String),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum LitArrElem {
  Single(Node<Expr>),
  Rest(Node<Expr>),
  /// A hole, as in `[a, , b]`.
  Empty,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitArrExpr {
  pub elements: Vec<LitArrElem>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitObjExpr {
  pub members: Vec<Node<ObjMember>>,
}
