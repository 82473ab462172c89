use super::expr::pat::IdPat;
use super::node::Node;
use super::stmt::decl::PatDecl;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// One entry of `export { ... }`. Quoted names are stored decoded, like identifiers.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportName {
  /// The local binding, or the name in the source module for `export { ... } from`.
  #[drive(skip)]
  pub exportable: String,
  /// The exported name; `b` in `a as b`, and `a` again when there is no `as`.
  pub alias: Node<IdPat>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ExportNames {
  /// `export * from "m"`, or `export * as ns from "m"` with the alias.
  All(Option<Node<IdPat>>),
  Specific(Vec<Node<ExportName>>),
}

/// One entry of `import { ... }`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportName {
  #[drive(skip)]
  pub importable: String,
  /// Always an [`IdPat`], named after `importable` when there is no `as`.
  pub alias: Node<PatDecl>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ImportNames {
  /// `import * as ns`.
  All(Node<PatDecl>),
  Specific(Vec<Node<ImportName>>),
}
