use crate::host::FileKey;
use serde::Serialize;
use std::fmt;
use typelint_parse::loc::Loc;

/// Code of diagnostics for files that failed to parse.
pub const SYNTAX_ERROR: &str = "syntax-error";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  /// The rule name, or [`SYNTAX_ERROR`].
  pub code: &'static str,
  pub file: FileKey,
  pub loc: Loc,
  /// 1-based position of `loc.0`.
  pub line: usize,
  pub column: usize,
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}:{}: {} [{}]",
      self.file, self.line, self.column, self.message, self.code
    )
  }
}
