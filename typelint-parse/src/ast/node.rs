use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

#[derive(Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  // Byte range in the source this node was parsed from. Synthesized nodes reuse the range of
  // whatever they were derived from.
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
    }
  }

  /// Converts the syntax into another syntax type, keeping the location.
  pub fn into_stx<T: From<S> + Drive + DriveMut>(self) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(T::from(*self.stx)),
    }
  }

  /// Wraps this node as a variant of an enum syntax type like `Expr`, at the same location.
  pub fn into_wrapped<T: From<Node<S>> + Drive + DriveMut>(self) -> Node<T> {
    let loc = self.loc;
    Node::new(loc, T::from(self))
  }

  pub fn map_stx<T: Drive + DriveMut, F: FnOnce(S) -> T>(self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(*self.stx)),
    }
  }

  /// Creates a new node at this node's location with syntax derived from this node's syntax.
  pub fn derive_stx<T: Drive + DriveMut, F: FnOnce(&S) -> T>(&self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(&self.stx)),
    }
  }

  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, None)
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

// The location is included so that tools consuming the JSON dump can map nodes back to source.
impl<S: Serialize + Drive + DriveMut> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    use serde::ser::SerializeStruct;
    let mut state = serializer.serialize_struct("Node", 2)?;
    state.serialize_field("loc", &self.loc)?;
    state.serialize_field("stx", &self.stx)?;
    state.end()
  }
}
