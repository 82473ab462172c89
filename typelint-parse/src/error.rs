use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// Classification of syntax errors produced by the lexer and parser.
///
/// Each variant carries a stable code (prefix `JS`) returned by [`SyntaxErrorType::code`]:
/// - `JS0001`: [`SyntaxErrorType::ExpectedNotFound`]
/// - `JS0002`: [`SyntaxErrorType::ExpectedSyntax`]
/// - `JS0003`: [`SyntaxErrorType::InvalidAssigmentTarget`]
/// - `JS0004`: [`SyntaxErrorType::InvalidCharacterEscape`]
/// - `JS0005`: [`SyntaxErrorType::JsxClosingTagMismatch`]
/// - `JS0006`: [`SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters`]
/// - `JS0007`: [`SyntaxErrorType::LineTerminatorAfterThrow`]
/// - `JS0008`: [`SyntaxErrorType::LineTerminatorInRegex`]
/// - `JS0009`: [`SyntaxErrorType::LineTerminatorInString`]
/// - `JS0010`: [`SyntaxErrorType::MalformedLiteralNumber`]
/// - `JS0011`: [`SyntaxErrorType::RequiredTokenNotFound`]
/// - `JS0012`: [`SyntaxErrorType::TryStatementHasNoCatchOrFinally`]
/// - `JS0013`: [`SyntaxErrorType::UnexpectedEnd`]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedNotFound,
  ExpectedSyntax(&'static str),
  InvalidAssigmentTarget,
  InvalidCharacterEscape,
  JsxClosingTagMismatch,
  LineTerminatorAfterArrowFunctionParameters,
  LineTerminatorAfterThrow,
  LineTerminatorInRegex,
  LineTerminatorInString,
  MalformedLiteralNumber,
  RequiredTokenNotFound(TT),
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
}

impl SyntaxErrorType {
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedNotFound => "JS0001",
      SyntaxErrorType::ExpectedSyntax(_) => "JS0002",
      SyntaxErrorType::InvalidAssigmentTarget => "JS0003",
      SyntaxErrorType::InvalidCharacterEscape => "JS0004",
      SyntaxErrorType::JsxClosingTagMismatch => "JS0005",
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => "JS0006",
      SyntaxErrorType::LineTerminatorAfterThrow => "JS0007",
      SyntaxErrorType::LineTerminatorInRegex => "JS0008",
      SyntaxErrorType::LineTerminatorInString => "JS0009",
      SyntaxErrorType::MalformedLiteralNumber => "JS0010",
      SyntaxErrorType::RequiredTokenNotFound(_) => "JS0011",
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => "JS0012",
      SyntaxErrorType::UnexpectedEnd => "JS0013",
    }
  }

  pub fn message(&self, actual_token: Option<TT>) -> String {
    let base = match self {
      SyntaxErrorType::ExpectedNotFound => "expected token not found".to_string(),
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {expected}"),
      SyntaxErrorType::InvalidAssigmentTarget => "invalid assignment target".to_string(),
      SyntaxErrorType::InvalidCharacterEscape => "invalid character escape".to_string(),
      SyntaxErrorType::JsxClosingTagMismatch => {
        "JSX closing tag does not match opening tag".to_string()
      }
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => {
        "line terminator not allowed after arrow function parameters".to_string()
      }
      SyntaxErrorType::LineTerminatorAfterThrow => {
        "line terminator not allowed after `throw`".to_string()
      }
      SyntaxErrorType::LineTerminatorInRegex => {
        "line terminator not allowed in regex literal".to_string()
      }
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".to_string()
      }
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".to_string(),
      SyntaxErrorType::RequiredTokenNotFound(tt) => format!("expected token {tt:?}"),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "try statement has no catch or finally block".to_string()
      }
      SyntaxErrorType::UnexpectedEnd => "unexpected end of source".to_string(),
    };
    match actual_token {
      Some(tt) => format!("{base} (found {tt:?})"),
      None => base,
    }
  }
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.typ.code(), self.typ.message(self.actual_token))
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;
