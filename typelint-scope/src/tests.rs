use crate::bind_module;
use crate::Decl;
use crate::Imported;
use crate::ModuleBindings;
use crate::PatStep;
use crate::SymbolId;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use typelint_parse::ast::expr::Expr;
use typelint_parse::ast::expr::IdExpr;
use typelint_parse::ast::node::Node;
use typelint_parse::ast::stmt::Stmt;
use typelint_parse::loc::Loc;
use typelint_parse::parse;

#[derive(Default, Visitor)]
#[visitor(IdExprNode(enter))]
struct Collect {
  id_exprs: Vec<(String, Loc)>,
}

type IdExprNode = Node<IdExpr>;

impl Collect {
  fn enter_id_expr_node(&mut self, node: &IdExprNode) {
    self.id_exprs.push((node.stx.name.clone(), node.loc));
  }
}

fn uses(bindings: &ModuleBindings, collect: &Collect) -> Vec<Option<SymbolId>> {
  collect
    .id_exprs
    .iter()
    .map(|(_, loc)| bindings.symbol_at(*loc))
    .collect()
}

fn symbol_named(bindings: &ModuleBindings, name: &str) -> Vec<SymbolId> {
  bindings
    .symbols()
    .filter(|(_, s)| s.name == name)
    .map(|(id, _)| id)
    .collect()
}

#[test]
fn shadowing_prefers_inner_bindings() {
  let ast = parse("let a = 1; { let a = 2; a; } a;").unwrap();
  let bindings = bind_module(&ast);
  let mut collect = Collect::default();
  ast.drive(&mut collect);

  let decls = symbol_named(&bindings, "a");
  assert_eq!(decls.len(), 2);
  assert_eq!(uses(&bindings, &collect), [Some(decls[1]), Some(decls[0])]);
}

#[test]
fn function_expression_name_is_local() {
  let ast = parse("const x = function foo() { return foo; }; foo;").unwrap();
  let bindings = bind_module(&ast);
  let mut collect = Collect::default();
  ast.drive(&mut collect);

  let resolved = uses(&bindings, &collect);
  assert_eq!(resolved.len(), 2);
  let inner = resolved[0].unwrap();
  assert!(matches!(
    bindings.symbol(inner).decl,
    Decl::FunctionExprName(_)
  ));
  assert_eq!(resolved[1], None);
  assert_eq!(bindings.unresolved().len(), 1);
  assert_eq!(bindings.unresolved()[0].0, "foo");
}

#[test]
fn var_hoists_to_nearest_function() {
  let ast = parse("function f() { { var x = 1; } return x; } x;").unwrap();
  let bindings = bind_module(&ast);
  let mut collect = Collect::default();
  ast.drive(&mut collect);

  let x = symbol_named(&bindings, "x");
  assert_eq!(x.len(), 1);
  assert_eq!(uses(&bindings, &collect), [Some(x[0]), None]);
}

#[test]
fn function_declarations_are_visible_before_their_position() {
  let ast = parse("g(1); function g(a) { return a; }").unwrap();
  let bindings = bind_module(&ast);
  let mut collect = Collect::default();
  ast.drive(&mut collect);

  let resolved = uses(&bindings, &collect);
  let g = resolved[0].unwrap();
  assert!(matches!(bindings.symbol(g).decl, Decl::Function(_)));
  let a = resolved[1].unwrap();
  assert!(matches!(
    bindings.symbol(a).decl,
    Decl::Param { index: 0, rest: false, .. }
  ));
  assert_eq!(bindings.top_level_symbol("g"), Some(g));
  assert_eq!(bindings.top_level_symbol("a"), None);
}

#[test]
fn destructured_parameters_record_their_path() {
  let ast = parse("function f(a, { b: [, c] }, ...d) {}").unwrap();
  let bindings = bind_module(&ast);

  let c = symbol_named(&bindings, "c")[0];
  let Decl::Param { index, path, .. } = &bindings.symbol(c).decl else {
    panic!("expected parameter");
  };
  assert_eq!(*index, 1);
  assert_eq!(path, &[PatStep::Prop("b".to_string()), PatStep::Index(1)]);

  let d = symbol_named(&bindings, "d")[0];
  assert!(matches!(
    bindings.symbol(d).decl,
    Decl::Param { index: 2, rest: true, .. }
  ));
}

#[test]
fn imports_declare_module_symbols() {
  let ast = parse(
    r#"
      import a, { b, c as d, default as e } from "./m.js";
      import * as ns from "./n.js";
    "#,
  )
  .unwrap();
  let bindings = bind_module(&ast);
  let imported = |name: &str| {
    let id = bindings.top_level_symbol(name).unwrap();
    match &bindings.symbol(id).decl {
      Decl::Import { module, imported } => (module.to_string(), imported.clone()),
      _ => panic!("expected import"),
    }
  };
  assert_eq!(imported("a"), ("./m.js".to_string(), Imported::Default));
  assert_eq!(
    imported("b"),
    ("./m.js".to_string(), Imported::Named("b".to_string()))
  );
  assert_eq!(
    imported("d"),
    ("./m.js".to_string(), Imported::Named("c".to_string()))
  );
  assert_eq!(imported("e"), ("./m.js".to_string(), Imported::Default));
  assert_eq!(imported("ns"), ("./n.js".to_string(), Imported::Namespace));
}

#[test]
fn destructuring_assignment_resolves_existing_symbol() {
  let ast = parse("let a; ({a} = obj);").unwrap();
  let bindings = bind_module(&ast);
  let a = bindings.top_level_symbol("a").unwrap();
  let symbols: Vec<_> = bindings.symbols().map(|(id, _)| id).collect();
  assert_eq!(symbols, [a]);
  // `a` is both declared and used as a target; `obj` is unknown.
  assert_eq!(bindings.unresolved().len(), 1);
  assert_eq!(bindings.unresolved()[0].0, "obj");
}

#[test]
fn block_scoped_bindings_do_not_leak() {
  let ast = parse(
    "try {} catch (err) { err; } for (const k of list) { k; } for (let i = 0; i < 1; i++) {} err; k; i;",
  )
  .unwrap();
  let bindings = bind_module(&ast);
  let unresolved: Vec<_> = bindings
    .unresolved()
    .iter()
    .map(|(name, _)| name.as_str())
    .collect();
  assert_eq!(unresolved, ["list", "err", "k", "i"]);
  let err = symbol_named(&bindings, "err")[0];
  assert!(matches!(bindings.symbol(err).decl, Decl::CatchParam));
  let k = symbol_named(&bindings, "k")[0];
  assert!(matches!(bindings.symbol(k).decl, Decl::ForBinding(_)));
}

#[test]
fn function_values_are_attached_to_their_declaration() {
  let src = "export const f = (x) => { return x; }, g = function () {};\nfunction h() {}";
  let ast = parse(src).unwrap();
  let bindings = bind_module(&ast);

  let Stmt::VarDecl(decl) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected declaration");
  };
  let func_loc = |i: usize| match decl.stx.declarators[i]
    .stx
    .initializer
    .as_ref()
    .unwrap()
    .stx
    .as_ref()
  {
    Expr::ArrowFunc(a) => a.stx.func.loc,
    Expr::Func(f) => f.stx.func.loc,
    _ => panic!("expected function"),
  };
  assert_eq!(bindings.func_site(func_loc(0)), decl.loc);
  assert_eq!(src.as_bytes()[decl.loc.0], b'e');
  assert_eq!(
    bindings.func_site(func_loc(1)),
    decl.stx.declarators[1].loc
  );

  let Stmt::FunctionDecl(h) = ast.stx.body[1].stx.as_ref() else {
    panic!("expected function");
  };
  assert_eq!(bindings.func_site(h.stx.function.loc), ast.stx.body[1].loc);
}
