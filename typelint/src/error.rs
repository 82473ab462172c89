use crate::host::FileKey;
use thiserror::Error;
use typelint_parse::operator::OperatorName;

/// Failure reported by a [`crate::Host`] while reading a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
  #[error("missing text for file {file}")]
  MissingFileText { file: FileKey },
  #[error("failed to read {file}: {message}")]
  Io { file: FileKey, message: String },
}

/// Conditions that abort analysis instead of producing a diagnostic.
///
/// These mean an annotation or expression fell outside the grammar the checker
/// understands; guessing a type for them would produce wrong verdicts rather than
/// missing ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
  #[error("host error: {0}")]
  Host(#[from] HostError),
  #[error("{file}:{line}: unsupported type expression `{text}`: {reason}")]
  UnsupportedTypeSyntax {
    file: FileKey,
    line: usize,
    text: String,
    reason: String,
  },
  #[error("{file}:{line}: typedef `{name}` is already defined in {first}")]
  DuplicateTypedef {
    name: String,
    file: FileKey,
    line: usize,
    first: FileKey,
  },
  #[error("{file}:{line}: operator {operator:?} cannot appear in a binary expression")]
  UnsupportedOperator {
    file: FileKey,
    line: usize,
    operator: OperatorName,
  },
  #[error("{file} was not loaded into the session")]
  NotLoaded { file: FileKey },
}
