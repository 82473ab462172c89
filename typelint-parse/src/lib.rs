use ast::node::Node;
use ast::TopLevel;
use comment::Comment;
use error::SyntaxResult;
use lex::Lexer;
use parse::Parser;

pub mod ast;
pub mod char;
pub mod comment;
pub mod error;
pub mod lex;
pub mod loc;
pub mod num;
pub mod operator;
pub mod parse;
pub mod token;
mod util;

pub fn parse(source: &str) -> SyntaxResult<Node<TopLevel>> {
  parse_with_comments(source).map(|(top_level, _)| top_level)
}

/// Parses a module and also returns every comment in it, in source order.
pub fn parse_with_comments(source: &str) -> SyntaxResult<(Node<TopLevel>, Vec<Comment>)> {
  let lexer = Lexer::new(source);
  let mut parser = Parser::new(lexer);
  let top_level = parser.parse_top_level()?;
  Ok((top_level, parser.into_comments()))
}
