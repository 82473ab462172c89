use typelint::is_of_type;
use typelint::is_supertype_of;
use typelint::AnalysisSession;
use typelint::FatalError;
use typelint::FileKey;
use typelint::FunctionType;
use typelint::LintOptions;
use typelint::MemoryHost;
use typelint::TypeId;
use typelint::TypeKind;
use typelint::TypeStore;

fn check_with(host: MemoryHost, root: &str, options: LintOptions) -> Vec<String> {
  let mut session = AnalysisSession::new(host, options);
  session
    .check(&FileKey::new(root))
    .expect("analysis succeeds")
    .into_iter()
    .map(|d| d.message)
    .collect()
}

fn check_source(source: &str) -> Vec<String> {
  check_with(
    MemoryHost::new().with_file("main.js", source),
    "main.js",
    LintOptions::default(),
  )
}

const RECORDS: &str = r#"
/**
 * @typedef {object} Record
 * @property {string} name
 * @property {number} value
 */

/**
 * @typedef {object} ExtendedRecord
 * @property {Record} data
 * @property {string} department
 */
"#;

#[test]
fn reassigning_a_number_with_a_boolean() {
  assert_eq!(
    check_source("/** @type {number} */ let x = 3; const y = true; x = y;\n"),
    vec!["can't assign type boolean to variable of type number"]
  );
}

#[test]
fn unannotated_functions_still_count_arguments() {
  assert_eq!(
    check_source("function foo(x, y, z) {}\nfoo(1, 2);\nfoo(1, 2, 3);\n"),
    vec!["function foo expects 3 arguments but was called with 2"]
  );
}

#[test]
fn nested_records_match_typedefs() {
  let source = format!(
    "{RECORDS}\n/** @type {{ExtendedRecord}} */\nconst r = {{ data: {{ name: 'alice', value: 123 }}, department: 'finance' }};\n"
  );
  assert!(check_source(&source).is_empty());
}

#[test]
fn nested_records_reject_undefined_properties() {
  let source = format!(
    "{RECORDS}\n/** @type {{ExtendedRecord}} */\nconst r = {{ data: {{ name: 'alice', value: undefined }}, department: 'finance' }};\n"
  );
  assert_eq!(
    check_source(&source),
    vec!["can't initialize variable of type ExtendedRecord with value of type (object literal)"]
  );
}

#[test]
fn implicit_undefined_returns_depend_on_options() {
  let source = "/** @return {number} */\nfunction f() {\n  return;\n}\n";
  assert_eq!(
    check_source(source),
    vec!["returning an implicit undefined from a function declared to return number"]
  );
  let lenient = LintOptions {
    allow_implicit_undefineds: true,
    ..LintOptions::default()
  };
  assert!(check_with(MemoryHost::new().with_file("main.js", source), "main.js", lenient).is_empty());
}

#[test]
fn call_results_take_the_declared_return_type() {
  let source = r#"
/**
 * @param {boolean} myBool
 * @return {string}
 */
function booleanIsTrue(myBool) {
  return myBool ? "yes" : "no";
}

/** @type {number} */
const x = booleanIsTrue(true);

/** @type {string} */
const y = booleanIsTrue(true);
"#;
  assert_eq!(
    check_source(source),
    vec!["can't initialize variable of type number with value of type string"]
  );
}

#[test]
fn typedefs_and_functions_cross_files() {
  let host = MemoryHost::new()
    .with_file(
      "app/main.js",
      r#"import { makeRecord } from './lib/index.js';
import label from './lib/label.js';

/** @type {Record} */
const ok = makeRecord('bob');
/** @type {string} */
const wrong = makeRecord('bob');
/** @type {number} */
const text = label();
makeRecord(1);
"#,
    )
    .with_file("app/lib/index.js", "export * from './records.js';\n")
    .with_file(
      "app/lib/records.js",
      &format!(
        "{RECORDS}\n/**\n * @param {{string}} name\n * @return {{Record}}\n */\nexport function makeRecord(name) {{\n  return {{ name, value: 0 }};\n}}\n"
      ),
    )
    .with_file(
      "app/lib/label.js",
      "/** @return {string} */\nexport default function label() {\n  return 'x';\n}\n",
    );
  assert_eq!(
    check_with(host, "app/main.js", LintOptions::default()),
    vec![
      "can't initialize variable of type string with value of type Record",
      "can't initialize variable of type number with value of type string",
      "type string expected for argument 0 in call to makeRecord but number provided",
    ]
  );
}

#[test]
fn import_cycles_do_not_hang() {
  let host = MemoryHost::new()
    .with_file(
      "a.js",
      "import { b } from './b.js';\nexport const a = b;\n/** @type {number} */\nconst n = a;\n",
    )
    .with_file("b.js", "import { a } from './a.js';\nexport const b = a;\n");
  assert!(check_with(host, "a.js", LintOptions::default()).is_empty());
}

#[test]
fn typedef_names_are_global_and_unique() {
  let host = MemoryHost::new()
    .with_file(
      "a.js",
      "import { b } from './b.js';\n/** @typedef {number} Id */\n",
    )
    .with_file("b.js", "/** @typedef {string} Id */\nexport const b = '';\n");
  let mut session = AnalysisSession::new(host, LintOptions::default());
  let err = session.check(&FileKey::new("a.js")).unwrap_err();
  assert!(matches!(err, FatalError::DuplicateTypedef { ref name, .. } if name == "Id"));
}

#[test]
fn unsupported_annotations_are_fatal() {
  let host = MemoryHost::new().with_file("a.js", "/** @type {'a'|'b'} */\nconst mode = 'a';\n");
  let mut session = AnalysisSession::new(host, LintOptions::default());
  let err = session.check(&FileKey::new("a.js")).unwrap_err();
  assert!(matches!(err, FatalError::UnsupportedTypeSyntax { line: 1, .. }));
}

#[test]
fn declared_types_render_in_annotation_syntax() {
  let host = MemoryHost::new().with_file(
    "a.js",
    "/** @type {number|undefined} */\nlet a;\n/** @type {Array<string>} */\nlet b;\n",
  );
  let mut session = AnalysisSession::new(host, LintOptions::default());
  let key = FileKey::new("a.js");
  session.load(&key).unwrap();
  assert_eq!(
    session.declared_type_on_line(&key, 2).as_deref(),
    Some("number|undefined")
  );
  assert_eq!(session.declared_type_on_line(&key, 4).as_deref(), Some("string[]"));
}

fn sample_types(store: &mut TypeStore) -> Vec<TypeId> {
  let n = store.number();
  let s = store.string();
  let u = store.undefined();
  let any = store.any();
  let invalid = store.invalid();
  let object = store.primitive("object");
  let ns = store.union([n, s]);
  let nu = store.union([n, u]);
  let numbers = store.array(n);
  let point = store.record(vec![("x".to_string(), n), ("y".to_string(), n)]);
  let named = store.record(vec![("x".to_string(), n)]);
  let takes_any = store.function(FunctionType {
    ret: n,
    args: vec![any],
    rest: None,
    params: Vec::new(),
  });
  let takes_number = store.function(FunctionType {
    ret: n,
    args: vec![n],
    rest: None,
    params: Vec::new(),
  });
  let alias = store.alias("Point");
  store.bind_alias(alias, point);
  vec![
    n, s, u, any, invalid, object, ns, nu, numbers, point, named, takes_any, takes_number,
    alias,
  ]
}

#[test]
fn every_type_is_of_itself() {
  let mut store = TypeStore::new();
  for t in sample_types(&mut store) {
    assert!(is_of_type(&store, t, t), "{}", store.display(t));
  }
}

#[test]
fn primitive_compatibility_is_symmetric_equality() {
  let mut store = TypeStore::new();
  let names = ["number", "string", "boolean", "undefined", "null", "object"];
  let prims: Vec<TypeId> = names.iter().map(|name| store.primitive(name)).collect();
  for (i, &p) in prims.iter().enumerate() {
    for (j, &q) in prims.iter().enumerate() {
      assert_eq!(is_of_type(&store, p, q), i == j);
      assert_eq!(is_of_type(&store, q, p), i == j);
    }
  }
}

#[test]
fn unions_distribute_over_both_predicates() {
  let mut store = TypeStore::new();
  let samples = sample_types(&mut store);
  // Unions compared against unions short-circuit on identity before distributing.
  let targets: Vec<TypeId> = samples
    .iter()
    .copied()
    .filter(|&t| !matches!(store.kind(t), TypeKind::Union(_)))
    .collect();
  let pairs: Vec<(TypeId, TypeId)> = samples
    .iter()
    .flat_map(|&a| samples.iter().map(move |&b| (a, b)))
    .filter(|(a, b)| a != b)
    .collect();
  for (a, b) in pairs {
    let union = store.union([a, b]);
    for &t in targets.iter() {
      assert_eq!(
        is_of_type(&store, union, t),
        is_of_type(&store, a, t) && is_of_type(&store, b, t),
        "{} of {}",
        store.display(union),
        store.display(t)
      );
      assert_eq!(
        is_supertype_of(&store, union, t),
        is_supertype_of(&store, a, t) || is_supertype_of(&store, b, t),
        "{} above {}",
        store.display(union),
        store.display(t)
      );
    }
  }
}
