use serde::Serialize;
use serde_json::to_string_pretty;
use serde_json::Value;
use similar::ChangeTag;
use similar::TextDiff;

// Drops `loc` fields and collapses `{ "stx": ... }` wrappers, so expectations can be written as
// plain syntax trees.
fn strip_locs(value: &mut Value) {
  match value {
    Value::Object(map) => {
      map.remove("loc");
      if let Some(mut stx) = map.remove("stx") {
        strip_locs(&mut stx);
        if map.is_empty() {
          *value = stx;
          return;
        }
        match stx {
          Value::Object(stx_map) => {
            for (k, v) in stx_map {
              map.entry(k).or_insert(v);
            }
          }
          other => {
            map.insert("stx".to_string(), other);
          }
        }
      }
      for v in map.values_mut() {
        strip_locs(v);
      }
    }
    Value::Array(items) => {
      for item in items {
        strip_locs(item);
      }
    }
    _ => {}
  }
}

pub fn to_stripped_json<T: Serialize>(node: &T) -> Value {
  let mut value = serde_json::to_value(node).unwrap();
  strip_locs(&mut value);
  value
}

/// Panics with a line diff if the two trees differ.
pub fn assert_json_eq(actual: &Value, expected: &Value) {
  if actual == expected {
    return;
  }
  let actual = to_string_pretty(actual).unwrap();
  let expected = to_string_pretty(expected).unwrap();
  let mut out = String::new();
  for change in TextDiff::from_lines(&expected, &actual).iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    out.push_str(sign);
    out.push_str(change.as_str().unwrap_or_default());
  }
  panic!("syntax tree mismatch (-expected +actual):\n{out}");
}
