use super::Parser;
use crate::ast::expr::Expr;
use crate::ast::import_export::ExportNames;
use crate::ast::import_export::ImportNames;
use crate::ast::stmt::decl::ExportMode;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::parse;
use crate::parse_with_comments;
use crate::token::TT;
use crate::util::test::assert_json_eq;
use crate::util::test::to_stripped_json;
use serde_json::json;

#[test]
fn test_parser() {
  let lexer = Lexer::new("let x = /a/ / 1;");
  let mut p = Parser::new(lexer);
  // Initial state.
  let cp = p.checkpoint();
  assert_eq!(p.next_tok_i, 0);

  // Peek the first token.
  let t = p.peek();
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);

  // Consume the first token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);

  // Consume the second token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 2);
  assert_eq!(p.buf.len(), 2);
  assert_eq!(t.typ, TT::Identifier);

  // Reset to a past point.
  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 2);

  // Peek using a different mode, which should truncate the buffer.
  let t = p.peek_with_mode(LexMode::SlashIsRegex);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);
}

#[test]
fn test_regex_after_operator() {
  let top = parse("let x = /a/ / 1;").unwrap();
  let Stmt::VarDecl(decl) = top.stx.body[0].stx.as_ref() else {
    panic!("expected a variable declaration");
  };
  let init = decl.stx.declarators[0].stx.initializer.as_ref().unwrap();
  let Expr::Binary(div) = init.stx.as_ref() else {
    panic!("expected a division");
  };
  assert!(matches!(div.stx.left.stx.as_ref(), Expr::LitRegex(_)));
}

#[test]
fn test_var_decl_tree() {
  let top = parse("const a = b(1, ...c), { d, e: [f] } = g;").unwrap();
  assert_json_eq(
    &to_stripped_json(&top),
    &json!({
      "body": [{
        "$t": "VarDecl",
        "export": false,
        "mode": "Const",
        "declarators": [
          {
            "pattern": { "pat": { "$t": "Id", "name": "a" } },
            "initializer": {
              "$t": "Call",
              "optional_chaining": false,
              "callee": { "$t": "Id", "name": "b" },
              "arguments": [
                { "spread": false, "value": { "$t": "LitNum", "value": 1.0 } },
                { "spread": true, "value": { "$t": "Id", "name": "c" } },
              ],
            },
          },
          {
            "pattern": { "pat": { "$t": "Obj", "rest": null, "properties": [
              {
                "key": { "Direct": { "key": "d", "tt": "Identifier" } },
                "target": { "$t": "Id", "name": "d" },
                "shorthand": true,
                "default_value": null,
              },
              {
                "key": { "Direct": { "key": "e", "tt": "Identifier" } },
                "target": { "$t": "Arr", "rest": null, "elements": [
                  { "target": { "$t": "Id", "name": "f" }, "default_value": null },
                ] },
                "shorthand": false,
                "default_value": null,
              },
            ] } },
            "initializer": { "$t": "Id", "name": "g" },
          },
        ],
      }],
    }),
  );
}

#[test]
fn test_asi() {
  let top = parse("let a = 1\nlet b = a\n++b\nfoo()\n").unwrap();
  let kinds: Vec<_> = top
    .stx
    .body
    .iter()
    .map(|s| match s.stx.as_ref() {
      Stmt::VarDecl(_) => "var",
      Stmt::Expr(_) => "expr",
      _ => "other",
    })
    .collect();
  assert_eq!(kinds, ["var", "var", "expr", "expr"]);
}

#[test]
fn test_arrow_functions_and_grouping() {
  let top = parse("f = (a, [b] = c) => a; g = (a, b); h = async x => x; i = async (y) => {};").unwrap();
  let rhs: Vec<_> = top
    .stx
    .body
    .iter()
    .map(|s| {
      let Stmt::Expr(e) = s.stx.as_ref() else {
        panic!("expected expression statement");
      };
      let Expr::Binary(assign) = e.stx.expr.stx.as_ref() else {
        panic!("expected assignment");
      };
      match assign.stx.right.stx.as_ref() {
        Expr::ArrowFunc(f) => (true, f.stx.func.stx.async_, f.stx.func.stx.parameters.len()),
        Expr::Binary(_) => (false, false, 0),
        _ => panic!("unexpected right side"),
      }
    })
    .collect();
  assert_eq!(rhs, [(true, false, 2), (false, false, 0), (true, true, 1), (true, true, 1)]);
}

#[test]
fn test_new_expr() {
  let top = parse("new a.B(1)(2); new C;").unwrap();
  let Stmt::Expr(first) = top.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  // The second argument list is a call on the constructed value.
  let Expr::Call(call) = first.stx.expr.stx.as_ref() else {
    panic!("expected call");
  };
  let Expr::New(new) = call.stx.callee.stx.as_ref() else {
    panic!("expected new");
  };
  assert!(matches!(new.stx.callee.stx.as_ref(), Expr::Member(_)));
  assert_eq!(new.stx.arguments.len(), 1);

  let Stmt::Expr(second) = top.stx.body[1].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::New(new) = second.stx.expr.stx.as_ref() else {
    panic!("expected new");
  };
  assert!(new.stx.arguments.is_empty());
}

#[test]
fn test_classes_and_object_members() {
  let src = r#"
    class A extends B {
      static x = 1;
      y
      get z() { return 1 }
      set z(v) {}
      async *gen() {}
      static() {}
    }
    const o = { get, set: 1, async a() {}, get b() { return 2 }, [c]: 3, "d": 4, ...e };
  "#;
  let top = parse(src).unwrap();
  let Stmt::ClassDecl(class) = top.stx.body[0].stx.as_ref() else {
    panic!("expected class");
  };
  let names: Vec<_> = class
    .stx
    .members
    .iter()
    .map(|m| (m.stx.key.static_name().unwrap().to_string(), m.stx.static_))
    .collect();
  assert_eq!(names, [
    ("x".to_string(), true),
    ("y".to_string(), false),
    ("z".to_string(), false),
    ("z".to_string(), false),
    ("gen".to_string(), false),
    ("static".to_string(), false),
  ]);
  let Stmt::VarDecl(decl) = top.stx.body[1].stx.as_ref() else {
    panic!("expected declaration");
  };
  let Expr::LitObj(obj) = decl.stx.declarators[0].stx.initializer.as_ref().unwrap().stx.as_ref()
  else {
    panic!("expected object literal");
  };
  assert_eq!(obj.stx.members.len(), 7);
}

#[test]
fn test_modules() {
  let src = r#"
    import def, { a as b, default as c } from "./x.js";
    import * as ns from "./y.js";
    import "./side-effect.js";
    export const d = 1;
    export function e() {}
    export default class {}
    export { b as f, c };
    export * from "./z.js";
  "#;
  let top = parse(src).unwrap();
  let kinds: Vec<_> = top
    .stx
    .body
    .iter()
    .map(|s| match s.stx.as_ref() {
      Stmt::Import(_) => "import",
      Stmt::VarDecl(d) if d.stx.export => "export var",
      Stmt::FunctionDecl(f) if f.stx.export == ExportMode::Named => "export function",
      Stmt::ClassDecl(c) if c.stx.export == ExportMode::Default => "export default class",
      Stmt::ExportList(_) => "export list",
      _ => "other",
    })
    .collect();
  assert_eq!(kinds, [
    "import",
    "import",
    "import",
    "export var",
    "export function",
    "export default class",
    "export list",
    "export list",
  ]);
}

#[test]
fn test_module_names() {
  let top = parse(
    "import { \"a-b\" as c, default as d } from './x.js';\nexport { c as \"e f\", d as default } from './y.js';\nexport default function () {}\n",
  )
  .unwrap();
  let Stmt::Import(import) = top.stx.body[0].stx.as_ref() else {
    panic!("expected import");
  };
  let Some(ImportNames::Specific(names)) = &import.stx.names else {
    panic!("expected named imports");
  };
  let importables: Vec<_> = names.iter().map(|n| n.stx.importable.as_str()).collect();
  assert_eq!(importables, ["a-b", "default"]);
  let Stmt::ExportList(list) = top.stx.body[1].stx.as_ref() else {
    panic!("expected export list");
  };
  let ExportNames::Specific(names) = &list.stx.names else {
    panic!("expected named exports");
  };
  let aliases: Vec<_> = names.iter().map(|n| n.stx.alias.stx.name.as_str()).collect();
  assert_eq!(aliases, ["e f", "default"]);
  let Stmt::FunctionDecl(func) = top.stx.body[2].stx.as_ref() else {
    panic!("expected function");
  };
  assert_eq!(func.stx.export, ExportMode::Default);
  assert!(func.stx.name.is_none());

  assert!(parse("function () {}").is_err());
  assert!(parse("export class {}").is_err());
}

#[test]
fn test_jsx() {
  let top = parse(r#"const el = <div class="a" {...rest}><Foo.Bar x={1} />text{y}</div>;"#).unwrap();
  let Stmt::VarDecl(decl) = top.stx.body[0].stx.as_ref() else {
    panic!("expected declaration");
  };
  let Expr::JsxElem(el) = decl.stx.declarators[0].stx.initializer.as_ref().unwrap().stx.as_ref()
  else {
    panic!("expected JSX");
  };
  assert_eq!(el.stx.attributes.len(), 2);
  assert_eq!(el.stx.children.len(), 3);

  let err = parse("<a></b>").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::JsxClosingTagMismatch);
}

#[test]
fn test_templates() {
  let top = parse("tag`a${b}c`; `x\\n${1 + 2}`;").unwrap();
  let Stmt::Expr(first) = top.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::TaggedTemplate(t) = first.stx.expr.stx.as_ref() else {
    panic!("expected tagged template");
  };
  assert_eq!(t.stx.parts.len(), 3);
  let Stmt::Expr(second) = top.stx.body[1].stx.as_ref() else {
    panic!("expected expression statement");
  };
  assert!(matches!(second.stx.expr.stx.as_ref(), Expr::LitTemplate(_)));
}

#[test]
fn test_for_loops() {
  let top = parse(
    "for (let i = 0; i < 1; i++) {} for (const k in o) x; for (v of list) {} for await (const w of s) {}",
  )
  .unwrap();
  let kinds: Vec<_> = top
    .stx
    .body
    .iter()
    .map(|s| match s.stx.as_ref() {
      Stmt::ForTriple(_) => "triple",
      Stmt::ForIn(_) => "in",
      Stmt::ForOf(f) if f.stx.await_ => "await of",
      Stmt::ForOf(_) => "of",
      _ => "other",
    })
    .collect();
  assert_eq!(kinds, ["triple", "in", "of", "await of"]);
}

#[test]
fn test_syntax_errors() {
  assert_eq!(
    parse("throw\nx").unwrap_err().typ,
    SyntaxErrorType::LineTerminatorAfterThrow
  );
  assert_eq!(
    parse("try {}").unwrap_err().typ,
    SyntaxErrorType::TryStatementHasNoCatchOrFinally
  );
  assert_eq!(
    parse("1 = 2").unwrap_err().typ,
    SyntaxErrorType::InvalidAssigmentTarget
  );
  assert_eq!(
    parse("let a = (b\n) => c").unwrap_err().typ,
    SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters
  );
}

#[test]
fn test_comments_are_kept() {
  let src = "/** @type {number} */\nlet a = 1; // trailing\nfunction f(/* inline */ x) {}";
  let (_, comments) = parse_with_comments(src).unwrap();
  assert_eq!(comments.len(), 3);
  assert!(comments[0].is_doc(src));
  assert!(!comments[1].is_doc(src));
  assert_eq!(&src[comments[0].loc.0..comments[0].loc.1], "/** @type {number} */");
}
