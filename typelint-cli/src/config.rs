use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use typelint::LintOptions;
use walkdir::WalkDir;

/// Names tried when looking for a config file next to the checked paths.
const CONFIG_NAMES: [&str; 2] = ["typelint.json", ".typelintrc.json"];

/// Extensions of files checked when a directory is given.
const SOURCE_EXTENSIONS: [&str; 3] = ["js", "mjs", "jsx"];

/// A config file: [`LintOptions`] at the top level, plus directories to skip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
  #[serde(flatten)]
  pub options: LintOptions,
  /// Directory names skipped while collecting files.
  #[serde(default)]
  pub exclude: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<ProjectConfig, String> {
  let text = fs::read_to_string(path)
    .map_err(|err| format!("failed to read config {}: {err}", path.display()))?;
  serde_json::from_str(&text).map_err(|err| format!("invalid config {}: {err}", path.display()))
}

/// The first config file found in `dir` or one of its ancestors.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
  dir.ancestors().find_map(|dir| {
    CONFIG_NAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|candidate| candidate.is_file())
  })
}

fn is_source(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Expands directories into the source files beneath them, sorted by path.
pub fn collect_files(paths: &[PathBuf], exclude: &[String]) -> Result<Vec<PathBuf>, String> {
  let mut files = Vec::new();
  for path in paths {
    if path.is_file() {
      files.push(path.clone());
      continue;
    }
    if !path.is_dir() {
      return Err(format!("no such file or directory: {}", path.display()));
    }
    let walker = WalkDir::new(path).into_iter().filter_entry(|entry| {
      let name = entry.file_name().to_string_lossy();
      entry.depth() == 0
        || !(name == "node_modules" || exclude.iter().any(|excluded| name == excluded.as_str()))
    });
    for entry in walker {
      let entry = entry.map_err(|err| format!("failed to walk {}: {err}", path.display()))?;
      if entry.file_type().is_file() && is_source(entry.path()) {
        files.push(entry.into_path());
      }
    }
  }
  files.sort();
  files.dedup();
  Ok(files)
}

#[cfg(test)]
mod tests {
  use super::*;
  use typelint::Rule;

  #[test]
  fn options_and_excludes_share_the_top_level() {
    let config: ProjectConfig = serde_json::from_str(
      r#"{"allowImplicitUndefineds": true, "rules": ["function-args-length-must-match"], "exclude": ["dist"]}"#,
    )
    .unwrap();
    assert!(config.options.allow_implicit_undefineds);
    assert!(!config.options.ignore_trailing_undefineds);
    assert!(config.options.is_enabled(Rule::FunctionArgsLengthMustMatch));
    assert!(!config.options.is_enabled(Rule::AssignmentTypesMustMatch));
    assert_eq!(config.exclude, vec!["dist".to_string()]);

    let empty: ProjectConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(empty.options, LintOptions::default());
    assert!(empty.exclude.is_empty());
  }

  #[test]
  fn unknown_rules_are_rejected() {
    let result = serde_json::from_str::<ProjectConfig>(r#"{"rules": ["no-such-rule"]}"#);
    assert!(result.is_err());
  }
}
