use core::hash::Hash;
use core::hash::Hasher;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

// This provides Eq for f64.
#[derive(Copy, Clone, Debug)]
pub struct JsNumber(pub f64);

impl JsNumber {
  /// Parses the raw source of a number literal token, including radix prefixes and numeric
  /// separators. Returns None for malformed literals such as a trailing separator.
  pub fn from_literal(raw: &str) -> Option<JsNumber> {
    let (radix, digits) = match raw.get(..2) {
      Some("0b" | "0B") => (2, &raw[2..]),
      Some("0o" | "0O") => (8, &raw[2..]),
      Some("0x" | "0X") => (16, &raw[2..]),
      _ => (10, raw),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__")
    {
      return None;
    }
    let clean = digits.replace('_', "");
    if radix == 10 {
      return clean.parse::<f64>().ok().map(JsNumber);
    }
    let mut value = 0f64;
    for c in clean.chars() {
      value = value * radix as f64 + c.to_digit(radix)? as f64;
    }
    Some(JsNumber(value))
  }
}

impl Display for JsNumber {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl PartialEq for JsNumber {
  fn eq(&self, other: &Self) -> bool {
    if self.0.is_nan() {
      return other.0.is_nan();
    };
    self.0.eq(&other.0)
  }
}

impl Eq for JsNumber {}

impl Ord for JsNumber {
  fn cmp(&self, other: &Self) -> Ordering {
    // Only NaNs cannot be compared, and we treat them as equal.
    self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
  }
}

impl PartialOrd for JsNumber {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Hash for JsNumber {
  fn hash<H: Hasher>(&self, state: &mut H) {
    if !self.0.is_nan() {
      self.0.to_bits().hash(state);
    };
  }
}

impl Serialize for JsNumber {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::JsNumber;

  #[test]
  fn parses_literal_forms() {
    assert_eq!(JsNumber::from_literal("1_000"), Some(JsNumber(1000.0)));
    assert_eq!(JsNumber::from_literal(".5"), Some(JsNumber(0.5)));
    assert_eq!(JsNumber::from_literal("1e3"), Some(JsNumber(1000.0)));
    assert_eq!(JsNumber::from_literal("0xff"), Some(JsNumber(255.0)));
    assert_eq!(JsNumber::from_literal("0b101"), Some(JsNumber(5.0)));
    assert_eq!(JsNumber::from_literal("0o17"), Some(JsNumber(15.0)));
    assert_eq!(JsNumber::from_literal("1_"), None);
    assert_eq!(JsNumber::from_literal("0x"), None);
  }
}
