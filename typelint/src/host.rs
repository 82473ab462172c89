use crate::error::HostError;
use ahash::HashMap;
use ahash::HashMapExt;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::sync::Arc;

/// Canonical identity of a source file, as chosen by the [`Host`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileKey(pub Arc<str>);

impl FileKey {
  pub fn new(key: impl Into<Arc<str>>) -> Self {
    FileKey(key.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for FileKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("FileKey").field(&self.0).finish()
  }
}

impl fmt::Display for FileKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for FileKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

/// Source of file contents and module resolution for an analysis session.
pub trait Host: Send + Sync + 'static {
  /// Return the full text for a file.
  fn file_text(&self, file: &FileKey) -> Result<Arc<str>, HostError>;
  /// Resolve an import specifier relative to `from`.
  fn resolve(&self, from: &FileKey, specifier: &str) -> Option<FileKey>;
}

/// In-memory host keyed by slash-separated paths.
///
/// Relative specifiers are joined onto the importing file's directory, trying the
/// specifier as written, then with `.js` appended, then as a directory `index.js`.
#[derive(Default, Clone)]
pub struct MemoryHost {
  files: HashMap<FileKey, Arc<str>>,
}

impl MemoryHost {
  pub fn new() -> Self {
    MemoryHost {
      files: HashMap::new(),
    }
  }

  pub fn with_file(mut self, key: &str, text: &str) -> Self {
    self.insert(key, text);
    self
  }

  pub fn insert(&mut self, key: &str, text: &str) {
    self.files.insert(FileKey::new(key), Arc::from(text));
  }
}

fn join(from: &str, specifier: &str) -> String {
  let mut parts: Vec<&str> = from.split('/').collect();
  // Drop the importing file's own name.
  parts.pop();
  for segment in specifier.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        parts.pop();
      }
      s => parts.push(s),
    }
  }
  parts.join("/")
}

impl Host for MemoryHost {
  fn file_text(&self, file: &FileKey) -> Result<Arc<str>, HostError> {
    self
      .files
      .get(file)
      .cloned()
      .ok_or_else(|| HostError::MissingFileText { file: file.clone() })
  }

  fn resolve(&self, from: &FileKey, specifier: &str) -> Option<FileKey> {
    if !specifier.starts_with('.') {
      return None;
    }
    let base = join(from.as_str(), specifier);
    [
      base.clone(),
      format!("{base}.js"),
      format!("{base}/index.js"),
    ]
    .into_iter()
    .map(FileKey::new)
    .find(|key| self.files.contains_key(key))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_relative_specifiers() {
    let host = MemoryHost::new()
      .with_file("src/a.js", "")
      .with_file("src/lib/b.js", "")
      .with_file("src/lib/index.js", "")
      .with_file("c.js", "");
    let from = FileKey::new("src/a.js");
    assert_eq!(host.resolve(&from, "./lib/b.js"), Some(FileKey::new("src/lib/b.js")));
    assert_eq!(host.resolve(&from, "./lib/b"), Some(FileKey::new("src/lib/b.js")));
    assert_eq!(host.resolve(&from, "./lib"), Some(FileKey::new("src/lib/index.js")));
    assert_eq!(host.resolve(&from, "../c"), Some(FileKey::new("c.js")));
    assert_eq!(host.resolve(&from, "lodash"), None);
    assert_eq!(host.resolve(&from, "./missing"), None);
  }

  #[test]
  fn missing_file_is_a_host_error() {
    let host = MemoryHost::new();
    let err = host.file_text(&FileKey::new("nope.js")).unwrap_err();
    assert_eq!(err.to_string(), "missing text for file nope.js");
  }
}
