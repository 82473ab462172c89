use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A half-open range of UTF-8 byte offsets within the current source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1.saturating_sub(self.0)
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add_option(self, rhs: Option<Loc>) -> Loc {
    let mut new = self;
    if let Some(rhs) = rhs {
      new.extend(rhs);
    };
    new
  }

  pub fn contains(&self, offset: usize) -> bool {
    offset >= self.0 && offset < self.1
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

/// Maps byte offsets to 1-based line numbers.
///
/// Annotation comments are attached to declarations by line, so every consumer that
/// needs "the line after this comment" goes through one of these.
#[derive(Clone, Debug, Default)]
pub struct LineIndex {
  line_starts: Vec<usize>,
}

impl LineIndex {
  pub fn new(source: &str) -> LineIndex {
    let mut line_starts = vec![0];
    line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
    LineIndex { line_starts }
  }

  /// Line containing `offset`. Offsets past the end map to the last line.
  pub fn line(&self, offset: usize) -> usize {
    match self.line_starts.binary_search(&offset) {
      Ok(i) => i + 1,
      Err(i) => i,
    }
  }

  pub fn start_line(&self, loc: Loc) -> usize {
    self.line(loc.0)
  }

  /// Line of the last byte covered by `loc`.
  pub fn end_line(&self, loc: Loc) -> usize {
    self.line(max(loc.0, loc.1.saturating_sub(1)))
  }

  pub fn line_count(&self) -> usize {
    self.line_starts.len()
  }

  /// 1-based (line, column) pair, with the column counted in bytes.
  pub fn position(&self, offset: usize) -> (usize, usize) {
    let line = self.line(offset);
    (line, offset - self.line_starts[line - 1] + 1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extends_to_cover_both_ranges() {
    let mut loc = Loc(4, 10);
    loc.extend(Loc(2, 6));
    assert_eq!(loc, Loc(2, 10));
    assert_eq!(Loc(1, 2) + Loc(5, 6), Loc(1, 6));
    assert_eq!(Loc(1, 2).add_option(None), Loc(1, 2));
  }

  #[test]
  fn maps_offsets_to_lines() {
    let index = LineIndex::new("a\nbc\n\nd");
    assert_eq!(index.line(0), 1);
    assert_eq!(index.line(1), 1);
    assert_eq!(index.line(2), 2);
    assert_eq!(index.line(4), 2);
    assert_eq!(index.line(5), 3);
    assert_eq!(index.line(6), 4);
    assert_eq!(index.line(100), 4);
    assert_eq!(index.line_count(), 4);
    assert_eq!(index.position(3), (2, 2));
  }

  #[test]
  fn end_line_uses_last_covered_byte() {
    let source = "/** x */\nlet a;";
    let index = LineIndex::new(source);
    assert_eq!(index.end_line(Loc(0, 8)), 1);
    assert_eq!(index.start_line(Loc(9, 15)), 2);
  }
}
