//! The type expression grammar found between the braces of a tag.
//!
//! This is the Closure-style subset: names (including `module:` paths), unions,
//! `T[]` and `Name.<T>` applications, `function(...)` types, record types,
//! `T=` optional and `?T` / `!T` nullability markers, `...T` rest markers and
//! `import('path').Name`. Literal types and `typeof` are rejected.
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
  /// `*`, or a lone `?`.
  Any,
  Name(String),
  Union(Vec<TypeExpr>),
  /// `T[]`.
  Array(Box<TypeExpr>),
  /// `Base.<A, B>` or `Base<A, B>`.
  Apply {
    base: String,
    args: Vec<TypeExpr>,
  },
  Function {
    params: Vec<TypeExpr>,
    rest: Option<Box<TypeExpr>>,
    ret: Option<Box<TypeExpr>>,
  },
  /// `{a: T, b}`; a key without a type is `None`.
  Record(Vec<(String, Option<TypeExpr>)>),
  /// `T=`.
  Optional(Box<TypeExpr>),
  /// `?T`.
  Nullable(Box<TypeExpr>),
  /// `!T`.
  NonNullable(Box<TypeExpr>),
  /// `...T` at the top of a parameter type.
  Rest(Box<TypeExpr>),
  Import {
    module: String,
    name: Option<String>,
  },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason} at offset {offset}")]
pub struct TypeExprError {
  pub offset: usize,
  pub reason: String,
}

type ExprResult<T> = Result<T, TypeExprError>;

fn is_name_start(c: char) -> bool {
  c.is_alphabetic() || c == '_' || c == '$'
}

fn is_name_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '~' | ':' | '/' | '-' | '#')
}

struct Parser<'t> {
  text: &'t str,
  pos: usize,
}

impl<'t> Parser<'t> {
  fn rest(&self) -> &'t str {
    &self.text[self.pos..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn skip_ws(&mut self) {
    let rest = self.rest();
    self.pos += rest.len() - rest.trim_start().len();
  }

  fn eat(&mut self, s: &str) -> bool {
    self.skip_ws();
    if self.rest().starts_with(s) {
      self.pos += s.len();
      true
    } else {
      false
    }
  }

  fn error<T>(&self, reason: impl Into<String>) -> ExprResult<T> {
    Err(TypeExprError {
      offset: self.pos,
      reason: reason.into(),
    })
  }

  fn unexpected<T>(&self) -> ExprResult<T> {
    match self.peek() {
      Some(c) => self.error(format!("unexpected `{c}`")),
      None => self.error("unexpected end of type"),
    }
  }

  fn expect(&mut self, s: &str) -> ExprResult<()> {
    if self.eat(s) {
      Ok(())
    } else {
      self.error(format!("expected `{s}`"))
    }
  }

  fn name(&mut self) -> &'t str {
    self.skip_ws();
    let rest = self.rest();
    let len = match rest.chars().next() {
      Some(c) if is_name_start(c) => rest
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len()),
      _ => 0,
    };
    self.pos += len;
    &rest[..len]
  }

  // A record key; unlike type names these stop at `:`.
  fn key(&mut self) -> &'t str {
    self.skip_ws();
    let rest = self.rest();
    let len = rest
      .char_indices()
      .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
      .map(|(i, _)| i)
      .unwrap_or(rest.len());
    self.pos += len;
    &rest[..len]
  }

  fn at_terminator(&mut self) -> bool {
    self.skip_ws();
    matches!(
      self.peek(),
      None | Some(',' | ')' | '}' | '|' | '=' | ']' | '>')
    )
  }

  fn union(&mut self) -> ExprResult<TypeExpr> {
    let mut members = vec![self.postfix()?];
    while self.eat("|") {
      members.push(self.postfix()?);
    }
    Ok(if members.len() == 1 {
      members.remove(0)
    } else {
      TypeExpr::Union(members)
    })
  }

  fn postfix(&mut self) -> ExprResult<TypeExpr> {
    let mut typ = self.prefix()?;
    loop {
      if self.eat("[]") {
        typ = TypeExpr::Array(Box::new(typ));
      } else if self.eat("=") {
        typ = TypeExpr::Optional(Box::new(typ));
      } else {
        return Ok(typ);
      }
    }
  }

  fn prefix(&mut self) -> ExprResult<TypeExpr> {
    self.skip_ws();
    match self.peek() {
      Some('?') => {
        self.pos += 1;
        if self.at_terminator() {
          Ok(TypeExpr::Any)
        } else {
          Ok(TypeExpr::Nullable(Box::new(self.prefix()?)))
        }
      }
      Some('!') => {
        self.pos += 1;
        Ok(TypeExpr::NonNullable(Box::new(self.prefix()?)))
      }
      Some('*') => {
        self.pos += 1;
        Ok(TypeExpr::Any)
      }
      Some('(') => {
        self.pos += 1;
        let inner = self.union()?;
        self.expect(")")?;
        Ok(inner)
      }
      Some('{') => {
        self.pos += 1;
        self.record()
      }
      Some('"' | '\'' | '`') => self.error("string literal types are not supported"),
      Some(c) if c.is_ascii_digit() || c == '-' => {
        self.error("numeric literal types are not supported")
      }
      _ => self.named(),
    }
  }

  fn named(&mut self) -> ExprResult<TypeExpr> {
    let start = self.pos;
    let name = self.name();
    if name.is_empty() {
      return self.unexpected();
    }
    match name {
      "typeof" | "keyof" => {
        self.pos = start;
        return self.error(format!("`{name}` types are not supported"));
      }
      "function" if self.eat("(") => return self.function(),
      "import" if self.eat("(") => return self.import(),
      _ => {}
    };
    if self.eat("<") {
      let base = name.strip_suffix('.').unwrap_or(name).to_string();
      let mut args = vec![self.union()?];
      while self.eat(",") {
        args.push(self.union()?);
      }
      self.expect(">")?;
      return Ok(TypeExpr::Apply { base, args });
    }
    if name.ends_with('.') {
      return self.unexpected();
    }
    Ok(TypeExpr::Name(name.to_string()))
  }

  // After `function(`.
  fn function(&mut self) -> ExprResult<TypeExpr> {
    let mut params = Vec::new();
    let mut rest = None;
    if !self.eat(")") {
      loop {
        self.skip_ws();
        let receiver = ["this:", "new:"]
          .into_iter()
          .find(|p| self.rest().starts_with(p));
        if let Some(receiver) = receiver {
          // The receiver is not a positional argument.
          self.pos += receiver.len();
          self.union()?;
        } else if self.eat("...") {
          let elem = if self.at_terminator() {
            TypeExpr::Any
          } else {
            self.union()?
          };
          rest = Some(Box::new(elem));
        } else {
          params.push(self.union()?);
        }
        if self.eat(")") {
          break;
        }
        self.expect(",")?;
      }
    }
    let ret = if self.eat(":") {
      Some(Box::new(self.postfix()?))
    } else {
      None
    };
    Ok(TypeExpr::Function { params, rest, ret })
  }

  // After `{`.
  fn record(&mut self) -> ExprResult<TypeExpr> {
    let mut props = Vec::new();
    if self.eat("}") {
      return Ok(TypeExpr::Record(props));
    }
    loop {
      self.skip_ws();
      let key = match self.peek() {
        Some(q @ ('"' | '\'')) => {
          self.pos += 1;
          let Some(len) = self.rest().find(q) else {
            return self.error("unterminated property name");
          };
          let key = self.rest()[..len].to_string();
          self.pos += len + 1;
          key
        }
        _ => self.key().to_string(),
      };
      if key.is_empty() {
        return self.unexpected();
      }
      let typ = if self.eat(":") {
        Some(self.union()?)
      } else {
        None
      };
      props.push((key, typ));
      if self.eat("}") {
        return Ok(TypeExpr::Record(props));
      }
      self.expect(",")?;
    }
  }

  // After `import(`.
  fn import(&mut self) -> ExprResult<TypeExpr> {
    self.skip_ws();
    let Some(q @ ('"' | '\'')) = self.peek() else {
      return self.error("expected a module path");
    };
    self.pos += 1;
    let Some(len) = self.rest().find(q) else {
      return self.error("unterminated module path");
    };
    let module = self.rest()[..len].to_string();
    self.pos += len + 1;
    self.expect(")")?;
    let name = if self.eat(".") {
      let name = self.name();
      if name.is_empty() {
        return self.unexpected();
      }
      Some(name.to_string())
    } else {
      None
    };
    Ok(TypeExpr::Import { module, name })
  }
}

/// Parses the text between a tag's braces.
pub fn parse_type_expr(text: &str) -> Result<TypeExpr, TypeExprError> {
  let mut parser = Parser { text, pos: 0 };
  if parser.at_terminator() && parser.peek().is_none() {
    return parser.error("empty type");
  }
  let typ = if parser.eat("...") {
    TypeExpr::Rest(Box::new(parser.union()?))
  } else {
    parser.union()?
  };
  parser.skip_ws();
  if parser.peek().is_some() {
    return parser.unexpected();
  }
  Ok(typ)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn name(n: &str) -> TypeExpr {
    TypeExpr::Name(n.to_string())
  }

  #[test]
  fn parses_unions_and_arrays() {
    assert_eq!(
      parse_type_expr("number|undefined").unwrap(),
      TypeExpr::Union(vec![name("number"), name("undefined")])
    );
    assert_eq!(
      parse_type_expr("(string | null)[]").unwrap(),
      TypeExpr::Array(Box::new(TypeExpr::Union(vec![
        name("string"),
        name("null")
      ])))
    );
    assert_eq!(
      parse_type_expr("Array.<number>").unwrap(),
      TypeExpr::Apply {
        base: "Array".to_string(),
        args: vec![name("number")],
      }
    );
    assert_eq!(
      parse_type_expr("Map<string, Node[]>").unwrap(),
      TypeExpr::Apply {
        base: "Map".to_string(),
        args: vec![name("string"), TypeExpr::Array(Box::new(name("Node")))],
      }
    );
  }

  #[test]
  fn parses_function_types() {
    assert_eq!(
      parse_type_expr("function(number,(string|undefined),boolean)").unwrap(),
      TypeExpr::Function {
        params: vec![
          name("number"),
          TypeExpr::Union(vec![name("string"), name("undefined")]),
          name("boolean"),
        ],
        rest: None,
        ret: None,
      }
    );
    assert_eq!(
      parse_type_expr("function(this:Foo, string=, ...number): boolean").unwrap(),
      TypeExpr::Function {
        params: vec![TypeExpr::Optional(Box::new(name("string")))],
        rest: Some(Box::new(name("number"))),
        ret: Some(Box::new(name("boolean"))),
      }
    );
    assert_eq!(
      parse_type_expr("function():string").unwrap(),
      TypeExpr::Function {
        params: vec![],
        rest: None,
        ret: Some(Box::new(name("string"))),
      }
    );
  }

  #[test]
  fn parses_records() {
    assert_eq!(
      parse_type_expr("{a: number, 'b-c': string[], d}").unwrap(),
      TypeExpr::Record(vec![
        ("a".to_string(), Some(name("number"))),
        (
          "b-c".to_string(),
          Some(TypeExpr::Array(Box::new(name("string"))))
        ),
        ("d".to_string(), None),
      ])
    );
    assert_eq!(parse_type_expr("{}").unwrap(), TypeExpr::Record(vec![]));
  }

  #[test]
  fn parses_markers() {
    assert_eq!(parse_type_expr("?").unwrap(), TypeExpr::Any);
    assert_eq!(parse_type_expr("*").unwrap(), TypeExpr::Any);
    assert_eq!(
      parse_type_expr("?number").unwrap(),
      TypeExpr::Nullable(Box::new(name("number")))
    );
    assert_eq!(
      parse_type_expr("!Object").unwrap(),
      TypeExpr::NonNullable(Box::new(name("Object")))
    );
    assert_eq!(
      parse_type_expr("...string").unwrap(),
      TypeExpr::Rest(Box::new(name("string")))
    );
    assert_eq!(
      parse_type_expr("boolean=").unwrap(),
      TypeExpr::Optional(Box::new(name("boolean")))
    );
  }

  #[test]
  fn parses_module_paths_and_imports() {
    assert_eq!(
      parse_type_expr("module:shapes/circle~Circle").unwrap(),
      name("module:shapes/circle~Circle")
    );
    assert_eq!(
      parse_type_expr("import('./types.js').Thing").unwrap(),
      TypeExpr::Import {
        module: "./types.js".to_string(),
        name: Some("Thing".to_string()),
      }
    );
  }

  #[test]
  fn rejects_unsupported_syntax() {
    let err = parse_type_expr("\"Block\"|\"Line\"").unwrap_err();
    assert_eq!(err.reason, "string literal types are not supported");
    assert_eq!(err.offset, 0);
    assert!(parse_type_expr("typeof foo").is_err());
    assert!(parse_type_expr("number|").is_err());
    assert!(parse_type_expr("{a: number").is_err());
    assert!(parse_type_expr("number string").is_err());
    assert!(parse_type_expr("").is_err());
  }
}
