use crate::ast::class_or_object::ClassMember;
use crate::ast::expr::pat::ClassOrFuncName;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::Expr;
use crate::ast::func::Func;
use crate::ast::node::Node;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// Whether a function or class declaration is preceded by `export` or `export default`.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Serialize)]
pub enum ExportMode {
  NotExported,
  Named,
  Default,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassDecl {
  #[drive(skip)]
  pub export: ExportMode,
  /// Omitted only when `export` is [`ExportMode::Default`].
  pub name: Option<Node<ClassOrFuncName>>,
  pub extends: Option<Node<Expr>>,
  pub members: Vec<Node<ClassMember>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FuncDecl {
  #[drive(skip)]
  pub export: ExportMode,
  pub name: Option<Node<ClassOrFuncName>>,
  pub function: Node<Func>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ParamDecl {
  #[drive(skip)]
  pub rest: bool,
  pub pattern: Node<PatDecl>,
  pub default_value: Option<Node<Expr>>,
}

// Declarations (imports, parameters, var/let/const, catch bindings) get a dedicated wrapper so
// they can be told apart from patterns used as assignment targets. It holds only the pattern;
// initializers live on the owner.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct PatDecl {
  pub pat: Node<Pat>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct VarDecl {
  #[drive(skip)]
  pub export: bool,
  pub mode: VarDeclMode,
  pub declarators: Vec<Node<VarDeclarator>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct VarDeclarator {
  pub pattern: Node<PatDecl>,
  pub initializer: Option<Node<Expr>>,
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Serialize, Drive, DriveMut)]
pub enum VarDeclMode {
  Const,
  Let,
  Var,
}
