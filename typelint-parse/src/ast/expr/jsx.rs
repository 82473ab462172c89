use super::Expr;
use super::IdExpr;
use crate::ast::node::Node;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum JsxAttrVal {
  Expression(Node<JsxExprContainer>),
  Text(Node<JsxText>),
  Element(Node<JsxElem>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum JsxAttr {
  Named {
    name: Node<JsxName>,
    value: Option<JsxAttrVal>,
  },
  Spread {
    value: Node<JsxSpreadAttr>,
  },
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum JsxElemName {
  // Capitalized names refer to components in scope.
  Id(Node<IdExpr>),
  Member(Node<JsxMemberExpr>),
  // Built-in elements like `div`.
  Name(Node<JsxName>),
}

impl JsxElemName {
  /// Source-level spelling, used to match closing tags.
  pub fn spelling(&self) -> String {
    match self {
      JsxElemName::Id(id) => id.stx.name.clone(),
      JsxElemName::Member(m) => {
        let mut out = m.stx.base.stx.name.clone();
        for p in m.stx.path.iter() {
          out.push('.');
          out.push_str(p);
        }
        out
      }
      JsxElemName::Name(n) => match &n.stx.namespace {
        Some(ns) => format!("{ns}:{}", n.stx.name),
        None => n.stx.name.clone(),
      },
    }
  }
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum JsxElemChild {
  Element(Node<JsxElem>),
  Expr(Node<JsxExprContainer>),
  Text(Node<JsxText>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct JsxElem {
  pub name: Option<JsxElemName>, // None if fragment
  pub attributes: Vec<JsxAttr>,  // Always empty if fragment
  pub children: Vec<JsxElemChild>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct JsxExprContainer {
  // None for an empty container like `{/* comment */}`.
  pub value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct JsxMemberExpr {
  pub base: Node<IdExpr>,
  #[drive(skip)]
  pub path: Vec<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct JsxName {
  #[drive(skip)]
  pub namespace: Option<String>,
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct JsxSpreadAttr {
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct JsxText {
  #[drive(skip)]
  pub value: String,
}
