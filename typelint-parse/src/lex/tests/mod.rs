use crate::comment::CommentKind;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer, LexMode::Standard);
    assert_eq!(t.typ, expected, "lexing {code:?}");
  }
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(EOF, t.typ, "lexing {code:?}");
}

#[test]
fn test_lex_keywords() {
  check("class", [KeywordClass]);
  check("instanceof", [KeywordInstanceof]);
  check("classes", [Identifier]);
  check("let letter", [KeywordLet, Identifier]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Identifier]);
  check("$el _private", [Identifier, Identifier]);
  check("caf\u{e9}", [Identifier]);
  check("\\u0061bc", [Identifier]);
}

#[test]
fn test_lex_literal_numbers() {
  check("929", [LiteralNumber]);
  check(".929", [LiteralNumber]);
  check(". 929.2.", [Dot, LiteralNumber, Dot]);
  check(".929.2..", [LiteralNumber, LiteralNumber, Dot, Dot]);
  check("1_000e-3", [LiteralNumber]);
  check("?.929", [Question, LiteralNumber]);
  check("?..929", [QuestionDot, LiteralNumber]);
  check("0x1F 0b101 0o17", [LiteralNumber, LiteralNumber, LiteralNumber]);
  check("10n 0xffn", [LiteralBigInt, LiteralBigInt]);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [LiteralString]);
  check("\"it's\"", [LiteralString]);
  check("'line \\\n continued'", [LiteralString]);
  check("'hello world\n", [Invalid]);
}

#[test]
fn test_lex_template_parts() {
  let mut lexer = Lexer::new("`a${b}c`");
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, LiteralTemplatePartString);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, Identifier);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, BraceClose);
  assert_eq!(
    lex_next(&mut lexer, LexMode::TemplateStrContinue).typ,
    LiteralTemplatePartStringEnd
  );
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, EOF);
}

#[test]
fn test_lex_regex_depends_on_mode() {
  let mut lexer = Lexer::new("/a[/]b/gi");
  assert_eq!(lex_next(&mut lexer, LexMode::SlashIsRegex).typ, LiteralRegex);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, EOF);

  check("a / b", [Identifier, Slash, Identifier]);
}

#[test]
fn test_lex_import_statement() {
  check("import * as a from \"./a\";", [
    KeywordImport,
    Asterisk,
    KeywordAs,
    Identifier,
    KeywordFrom,
    LiteralString,
    Semicolon,
  ]);
}

#[test]
fn test_lex_jsx_names_allow_hyphens_and_keywords() {
  let mut lexer = Lexer::new("data-id class");
  let t = lex_next(&mut lexer, LexMode::JsxTag);
  assert_eq!(t.typ, Identifier);
  assert_eq!(t.loc, Loc(0, 7));
  assert_eq!(lex_next(&mut lexer, LexMode::JsxTag).typ, Identifier);
}

#[test]
fn test_lex_records_comments_once() {
  let code = "/** @type {number} */\nlet x; // trailing\n/* a */ x";
  let mut lexer = Lexer::new(code);
  let first = lexer.checkpoint();
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(t.typ, KeywordLet);
  assert!(t.preceded_by_line_terminator);

  // Rewinding and relexing must not duplicate the comment.
  lexer.apply_checkpoint(first);
  lex_next(&mut lexer, LexMode::Standard);
  while lex_next(&mut lexer, LexMode::Standard).typ != EOF {}

  let comments = lexer.comments();
  assert_eq!(comments.len(), 3);
  assert_eq!(comments[0].kind, CommentKind::Block);
  assert_eq!(comments[0].loc, Loc(0, 21));
  assert_eq!(comments[1].kind, CommentKind::Line);
  assert_eq!(comments[1].value(code), " trailing");
  assert_eq!(comments[2].value(code), " a ");
}

#[test]
fn test_lex_line_terminator_flag() {
  let mut lexer = Lexer::new("a /* multi\nline */ b /* same */ c");
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
}
