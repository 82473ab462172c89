use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A check run over every file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
  AssignmentTypesMustMatch,
  FunctionArgsLengthMustMatch,
  FunctionArgsTypesMustMatch,
  FunctionReturnTypeMustMatch,
}

impl Rule {
  pub const ALL: [Rule; 4] = [
    Rule::AssignmentTypesMustMatch,
    Rule::FunctionArgsLengthMustMatch,
    Rule::FunctionArgsTypesMustMatch,
    Rule::FunctionReturnTypeMustMatch,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Rule::AssignmentTypesMustMatch => "assignment-types-must-match",
      Rule::FunctionArgsLengthMustMatch => "function-args-length-must-match",
      Rule::FunctionArgsTypesMustMatch => "function-args-types-must-match",
      Rule::FunctionReturnTypeMustMatch => "function-return-type-must-match",
    }
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Rule {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Rule::ALL
      .into_iter()
      .find(|rule| rule.name() == s)
      .ok_or_else(|| format!("unknown rule `{s}`"))
  }
}

/// Options recognised in a config file's top level, in camelCase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LintOptions {
  /// Don't report arguments omitted from the end of a call.
  pub ignore_trailing_undefineds: bool,
  /// Don't report a bare `return;` in a function declared to return something.
  pub allow_implicit_undefineds: bool,
  pub rules: BTreeSet<Rule>,
}

impl Default for LintOptions {
  fn default() -> Self {
    LintOptions {
      ignore_trailing_undefineds: false,
      allow_implicit_undefineds: false,
      rules: Rule::ALL.into_iter().collect(),
    }
  }
}

impl LintOptions {
  pub fn is_enabled(&self, rule: Rule) -> bool {
    self.rules.contains(&rule)
  }

  /// Options with only `rules` enabled.
  pub fn only(rules: impl IntoIterator<Item = Rule>) -> Self {
    LintOptions {
      rules: rules.into_iter().collect(),
      ..LintOptions::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserializes_camel_case_options() {
    let options: LintOptions = serde_json::from_str(
      r#"{"ignoreTrailingUndefineds": true, "rules": ["function-args-types-must-match"]}"#,
    )
    .unwrap();
    assert!(options.ignore_trailing_undefineds);
    assert!(!options.allow_implicit_undefineds);
    assert!(options.is_enabled(Rule::FunctionArgsTypesMustMatch));
    assert!(!options.is_enabled(Rule::AssignmentTypesMustMatch));

    let defaults: LintOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, LintOptions::default());
    assert_eq!(defaults.rules.len(), 4);
  }

  #[test]
  fn parses_rule_names() {
    assert_eq!(
      "function-return-type-must-match".parse::<Rule>(),
      Ok(Rule::FunctionReturnTypeMustMatch)
    );
    assert!("no-such-rule".parse::<Rule>().is_err());
  }
}
