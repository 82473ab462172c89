//! Reading annotation comments: splitting a `/** ... */` body into tags, and parsing
//! the type expressions inside `{...}`.
pub mod expr;

/// One `@tag {type} name description` entry of an annotation comment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
  pub tag: String,
  /// Text between the outermost braces, trimmed.
  pub typ: Option<String>,
  pub name: Option<String>,
  /// Written as `[name]` or `[name=default]`.
  pub optional: bool,
  pub default: Option<String>,
  pub description: String,
  /// Lines between the start of the comment and this tag.
  pub line_offset: usize,
}

// Tags followed by a name after the optional type.
fn takes_name(tag: &str) -> bool {
  matches!(
    tag,
    "param"
      | "arg"
      | "argument"
      | "property"
      | "prop"
      | "typedef"
      | "callback"
      | "module"
      | "function"
      | "func"
      | "method"
  )
}

// Strips the leading `*` decoration of every line.
fn strip_decoration(value: &str) -> Vec<&str> {
  value
    .split('\n')
    .map(|line| {
      let line = line.trim_start();
      line.strip_prefix('*').unwrap_or(line).trim()
    })
    .collect()
}

// Returns the text inside a balanced `open ... close` starting at `s[0]`, and the rest.
fn balanced(s: &str, open: char, close: char) -> Option<(&str, &str)> {
  let mut depth = 0usize;
  for (i, c) in s.char_indices() {
    if c == open {
      depth += 1;
    } else if c == close {
      depth -= 1;
      if depth == 0 {
        return Some((&s[1..i], &s[i + 1..]));
      }
    }
  }
  None
}

fn parse_tag(tag: &str, body: &str, line_offset: usize) -> Tag {
  let mut out = Tag {
    tag: tag.to_string(),
    line_offset,
    ..Tag::default()
  };
  let mut rest = body.trim_start();
  if rest.starts_with('{') {
    match balanced(rest, '{', '}') {
      Some((typ, after)) => {
        out.typ = Some(typ.trim().to_string());
        rest = after.trim_start();
      }
      None => {
        // Unterminated; keep the text so the type parser reports it.
        out.typ = Some(rest[1..].trim().to_string());
        rest = "";
      }
    }
  }
  if takes_name(tag) && !rest.is_empty() {
    if rest.starts_with('[') {
      if let Some((inner, after)) = balanced(rest, '[', ']') {
        out.optional = true;
        match inner.split_once('=') {
          Some((name, default)) => {
            out.name = Some(name.trim().to_string());
            out.default = Some(default.trim().to_string());
          }
          None => out.name = Some(inner.trim().to_string()),
        }
        rest = after;
      }
    } else {
      let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
      out.name = Some(rest[..end].to_string());
      rest = &rest[end..];
    }
  }
  out.description = rest.trim().to_string();
  out
}

/// Splits the body of an annotation comment into its tags.
///
/// `value` is the text between `/*` and `*/`. A tag starts with `@` at the beginning
/// of a line; everything up to the next tag belongs to it.
pub fn parse_tags(value: &str) -> Vec<Tag> {
  let lines = strip_decoration(value);
  let mut tags = Vec::new();
  let mut current: Option<(&str, usize, String)> = None;
  for (line_no, line) in lines.iter().enumerate() {
    if let Some(stripped) = line.strip_prefix('@') {
      if let Some((tag, line_offset, body)) = current.take() {
        tags.push(parse_tag(tag, &body, line_offset));
      }
      let name_end = stripped
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(stripped.len());
      let (tag, body) = stripped.split_at(name_end);
      current = Some((tag, line_no, body.to_string()));
    } else if let Some((_, _, body)) = current.as_mut() {
      body.push('\n');
      body.push_str(line);
    }
  }
  if let Some((tag, line_offset, body)) = current {
    tags.push(parse_tag(tag, &body, line_offset));
  }
  tags
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_single_line_type_tag() {
    let tags = parse_tags("* @type {number} ");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].tag, "type");
    assert_eq!(tags[0].typ.as_deref(), Some("number"));
    assert_eq!(tags[0].name, None);
  }

  #[test]
  fn parses_params_and_returns() {
    let value = r#"*
     * Adds things.
     * @param {number} x the first
     * @param {string|undefined} y
     * @param {boolean} [z=true] optional flag
     *   that continues here
     * @returns {{a: number}} a record
     "#;
    let tags = parse_tags(value);
    let summary: Vec<_> = tags
      .iter()
      .map(|t| {
        (
          t.tag.as_str(),
          t.typ.as_deref(),
          t.name.as_deref(),
          t.optional,
        )
      })
      .collect();
    assert_eq!(summary, [
      ("param", Some("number"), Some("x"), false),
      ("param", Some("string|undefined"), Some("y"), false),
      ("param", Some("boolean"), Some("z"), true),
      ("returns", Some("{a: number}"), None, false),
    ]);
    assert_eq!(tags[0].description, "the first");
    assert_eq!(tags[2].default.as_deref(), Some("true"));
    assert_eq!(tags[2].description, "optional flag\nthat continues here");
    assert_eq!(tags[3].line_offset, 6);
  }

  #[test]
  fn parses_typedef_with_properties() {
    let value = "*\n * @typedef {object} Thing\n * @property {string} name\n * @property {number} [count]\n ";
    let tags = parse_tags(value);
    assert_eq!(tags[0].tag, "typedef");
    assert_eq!(tags[0].typ.as_deref(), Some("object"));
    assert_eq!(tags[0].name.as_deref(), Some("Thing"));
    assert_eq!(tags[2].name.as_deref(), Some("count"));
    assert!(tags[2].optional);
  }

  #[test]
  fn tolerates_untyped_and_unterminated_tags() {
    let tags = parse_tags("* @callback Handler\n * @module utils/io\n * @type {number");
    assert_eq!(tags[0].name.as_deref(), Some("Handler"));
    assert_eq!(tags[0].typ, None);
    assert_eq!(tags[1].name.as_deref(), Some("utils/io"));
    assert_eq!(tags[2].typ.as_deref(), Some("number"));
  }
}
