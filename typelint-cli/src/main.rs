use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use typelint::AnalysisSession;
use typelint::Diagnostic;
use typelint::FatalError;
use typelint::FileKey;
use typelint::Host;
use typelint::HostError;
use typelint::LintOptions;
use typelint::Rule;

mod config;

#[derive(Parser)]
#[command(author, version, about = "Type check JavaScript against its JSDoc annotations")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check files, or every JavaScript file under the given directories.
  Check(CheckArgs),
  /// Print the typedefs and declared types found in a file and its imports.
  Types(TypesArgs),
}

#[derive(Args)]
struct CheckArgs {
  #[arg(required = true)]
  paths: Vec<PathBuf>,

  /// Emit diagnostics as JSON.
  #[arg(long)]
  json: bool,

  /// Config file. Defaults to the nearest typelint.json above the first path.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Don't report arguments omitted from the end of a call.
  #[arg(long)]
  ignore_trailing_undefineds: bool,

  /// Don't report bare `return;` in functions declared to return a value.
  #[arg(long)]
  allow_implicit_undefineds: bool,

  /// Run only these rules. May be repeated.
  #[arg(long = "rule")]
  rules: Vec<Rule>,

  /// Emit tracing spans (JSON) to stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Args)]
struct TypesArgs {
  file: PathBuf,

  /// Emit JSON.
  #[arg(long)]
  json: bool,

  /// Emit tracing spans (JSON) to stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Serialize)]
struct CheckOutput {
  files: usize,
  diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct TypesOutput {
  file: String,
  declarations: Vec<DeclarationJson>,
  typedefs: Vec<TypedefJson>,
}

#[derive(Serialize)]
struct DeclarationJson {
  line: usize,
  #[serde(rename = "type")]
  typ: String,
}

#[derive(Serialize)]
struct TypedefJson {
  name: String,
  file: String,
  line: usize,
  #[serde(rename = "type")]
  typ: String,
}

/// Reads files from disk. Keys are canonical paths.
struct DiskHost;

fn canonicalize_path(path: &Path) -> std::io::Result<PathBuf> {
  let absolute = if path.is_absolute() {
    path.to_path_buf()
  } else {
    std::env::current_dir()?.join(path)
  };
  absolute.canonicalize()
}

fn key_for(path: &Path) -> Result<FileKey, String> {
  let canonical = canonicalize_path(path)
    .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
  canonical
    .to_str()
    .map(FileKey::new)
    .ok_or_else(|| format!("path is not valid UTF-8: {}", canonical.display()))
}

fn candidate_paths(base: &Path) -> Vec<PathBuf> {
  let mut candidates = vec![base.to_path_buf()];
  for ext in ["js", "mjs", "jsx"] {
    let mut with_ext = base.as_os_str().to_owned();
    with_ext.push(".");
    with_ext.push(ext);
    candidates.push(PathBuf::from(with_ext));
  }
  candidates.push(base.join("index.js"));
  candidates
}

impl Host for DiskHost {
  fn file_text(&self, file: &FileKey) -> Result<Arc<str>, HostError> {
    fs::read_to_string(file.as_str())
      .map(Arc::from)
      .map_err(|err| HostError::Io {
        file: file.clone(),
        message: err.to_string(),
      })
  }

  fn resolve(&self, from: &FileKey, specifier: &str) -> Option<FileKey> {
    if !(specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/'))
    {
      return None;
    }
    let base_dir = Path::new(from.as_str()).parent()?;
    let joined = base_dir.join(specifier);
    candidate_paths(&joined)
      .into_iter()
      .find(|candidate| candidate.is_file())
      .and_then(|found| key_for(&found).ok())
  }
}

fn init_tracing(enabled: bool) {
  if !enabled {
    return;
  }
  let _ = tracing_subscriber::fmt()
    .with_span_events(FmtSpan::CLOSE)
    .with_max_level(Level::DEBUG)
    .with_writer(std::io::stderr)
    .json()
    .with_ansi(false)
    .try_init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  match cli.command {
    Commands::Check(args) => run_check(args),
    Commands::Types(args) => run_types(args),
  }
}

fn fatal(err: FatalError) -> ExitCode {
  eprintln!("error: {err}");
  ExitCode::from(2)
}

fn build_options(args: &CheckArgs) -> Result<(LintOptions, Vec<String>), String> {
  let config_path = match &args.config {
    Some(path) => Some(path.clone()),
    None => {
      let first = args.paths.first().map(|p| p.as_path()).unwrap_or(Path::new("."));
      let dir = if first.is_dir() {
        first.to_path_buf()
      } else {
        first.parent().map(Path::to_path_buf).unwrap_or_default()
      };
      let dir = canonicalize_path(&dir).unwrap_or(dir);
      config::find_config(&dir)
    }
  };
  let project = match config_path {
    Some(path) => config::load_config(&path)?,
    None => config::ProjectConfig::default(),
  };
  let mut options = project.options;
  if args.ignore_trailing_undefineds {
    options.ignore_trailing_undefineds = true;
  }
  if args.allow_implicit_undefineds {
    options.allow_implicit_undefineds = true;
  }
  if !args.rules.is_empty() {
    options.rules = args.rules.iter().copied().collect();
  }
  Ok((options, project.exclude))
}

fn run_check(args: CheckArgs) -> ExitCode {
  init_tracing(args.trace);

  let (options, exclude) = match build_options(&args) {
    Ok(res) => res,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };
  let files = match config::collect_files(&args.paths, &exclude) {
    Ok(files) => files,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };

  let mut session = AnalysisSession::new(DiskHost, options);
  let mut diagnostics = Vec::new();
  for path in files.iter() {
    let key = match key_for(path) {
      Ok(key) => key,
      Err(err) => {
        eprintln!("{err}");
        return ExitCode::FAILURE;
      }
    };
    match session.check(&key) {
      Ok(found) => diagnostics.extend(found),
      Err(err) => return fatal(err),
    }
  }

  if args.json {
    let output = CheckOutput {
      files: files.len(),
      diagnostics,
    };
    match serde_json::to_string_pretty(&output) {
      Ok(serialized) => println!("{serialized}"),
      Err(err) => {
        eprintln!("failed to serialize JSON: {err}");
        return ExitCode::FAILURE;
      }
    }
    return if output.diagnostics.is_empty() {
      ExitCode::SUCCESS
    } else {
      ExitCode::FAILURE
    };
  }

  for diagnostic in diagnostics.iter() {
    println!("{diagnostic}");
  }
  if diagnostics.is_empty() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}

fn run_types(args: TypesArgs) -> ExitCode {
  init_tracing(args.trace);

  let key = match key_for(&args.file) {
    Ok(key) => key,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };
  let mut session = AnalysisSession::new(DiskHost, LintOptions::default());
  if let Err(err) = session.load(&key) {
    return fatal(err);
  }
  let Some(info) = session.file(&key) else {
    return fatal(FatalError::NotLoaded { file: key });
  };

  let store = session.store();
  let output = TypesOutput {
    file: key.to_string(),
    declarations: info
      .declared_lines()
      .map(|(line, typ)| DeclarationJson {
        line,
        typ: store.display(typ).to_string(),
      })
      .collect(),
    typedefs: session
      .typedefs()
      .entries()
      .into_iter()
      .map(|(name, entry)| TypedefJson {
        name: name.to_string(),
        file: entry.file.to_string(),
        line: entry.line,
        typ: store.display(store.resolve(entry.alias)).to_string(),
      })
      .collect(),
  };

  if args.json {
    match serde_json::to_string_pretty(&output) {
      Ok(serialized) => println!("{serialized}"),
      Err(err) => {
        eprintln!("failed to serialize JSON: {err}");
        return ExitCode::FAILURE;
      }
    }
    return ExitCode::SUCCESS;
  }

  for typedef in output.typedefs.iter() {
    println!(
      "typedef {} = {} ({}:{})",
      typedef.name, typedef.typ, typedef.file, typedef.line
    );
  }
  for declaration in output.declarations.iter() {
    println!("line {}: {}", declaration.line, declaration.typ);
  }
  ExitCode::SUCCESS
}
