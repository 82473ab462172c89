use super::expr::Expr;
use super::node::Node;
use super::stmt::decl::ParamDecl;
use super::stmt::Stmt;
use derive_more::derive::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

// One type for every function form (declarations, expressions, arrows, methods), so that
// downstream code has a single node to match on.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Func {
  #[drive(skip)]
  pub arrow: bool,
  #[drive(skip)]
  pub async_: bool,
  #[drive(skip)]
  pub generator: bool,
  pub parameters: Vec<Node<ParamDecl>>,
  pub body: FuncBody,
}

// Not a BlockStmt, as the function scope starts at the parameters, not the braces.
#[derive(Debug, Drive, DriveMut, From, Serialize)]
pub enum FuncBody {
  Block(Vec<Node<Stmt>>),
  // Arrow functions only.
  Expression(Node<Expr>),
}
