use crate::loc::Loc;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CommentKind {
  /// `/* ... */`
  Block,
  /// `// ...` up to but excluding the line terminator.
  Line,
}

/// A comment found while lexing, in source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
  pub kind: CommentKind,
  pub loc: Loc,
}

impl Comment {
  /// The text between the delimiters.
  pub fn value<'s>(&self, source: &'s str) -> &'s str {
    let raw = &source[self.loc.0..self.loc.1];
    match self.kind {
      CommentKind::Line => &raw[2..],
      CommentKind::Block => {
        let inner = &raw[2..];
        inner.strip_suffix("*/").unwrap_or(inner)
      }
    }
  }

  /// Whether this is a documentation block, i.e. `/** ... */`.
  pub fn is_doc(&self, source: &str) -> bool {
    self.kind == CommentKind::Block && {
      let value = self.value(source);
      value.starts_with('*') && !value.starts_with("**")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_value_and_doc_flag() {
    let source = "/** @type {number} */ // trailing\n/* plain */ /*** banner */";
    let doc = Comment {
      kind: CommentKind::Block,
      loc: Loc(0, 21),
    };
    assert_eq!(doc.value(source), "* @type {number} ");
    assert!(doc.is_doc(source));

    let line = Comment {
      kind: CommentKind::Line,
      loc: Loc(22, 33),
    };
    assert_eq!(line.value(source), " trailing");
    assert!(!line.is_doc(source));

    let plain = Comment {
      kind: CommentKind::Block,
      loc: Loc(34, 45),
    };
    assert!(!plain.is_doc(source));

    let banner = Comment {
      kind: CommentKind::Block,
      loc: Loc(46, 60),
    };
    assert!(!banner.is_doc(source));
  }
}
