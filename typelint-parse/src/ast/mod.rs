use derive_visitor::Drive;
use derive_visitor::DriveMut;
use node::Node;
use serde::Serialize;
use stmt::Stmt;

pub mod class_or_object;
pub mod expr;
pub mod func;
pub mod import_export;
pub mod node;
pub mod stmt;

/// A parsed source file.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TopLevel {
  pub body: Vec<Node<Stmt>>,
}
