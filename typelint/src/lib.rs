//! Structural type checking of JavaScript from JSDoc annotations.
//!
//! An [`AnalysisSession`] loads a file and everything it imports, builds the types
//! declared by `@type`, `@param`, `@return` and `@typedef` comments, and checks
//! assignments, call arguments and returns against them. Mismatches are reported as
//! [`Diagnostic`]s. Annotations outside the supported grammar abort the run with a
//! [`FatalError`] instead, since any verdict built on them would be a guess.
//!
//! Code without annotations is not rejected: anything the checker cannot type is
//! `any`, which is never reported.

mod builder;
mod diagnostics;
mod error;
mod host;
mod jsdoc;
mod options;
mod relate;
mod resolve;
mod rules;
mod session;
mod types;

pub use builder::DocComment;
pub use builder::DocScope;
pub use builder::TypedefEntry;
pub use builder::TypedefTable;
pub use diagnostics::Diagnostic;
pub use diagnostics::SYNTAX_ERROR;
pub use error::FatalError;
pub use error::HostError;
pub use host::FileKey;
pub use host::Host;
pub use host::MemoryHost;
pub use jsdoc::Tag;
pub use options::LintOptions;
pub use options::Rule;
pub use relate::is_of_type;
pub use relate::is_supertype_of;
pub use resolve::BindingLookup;
pub use resolve::Bindings;
pub use resolve::Resolver;
pub use session::AnalysisSession;
pub use session::ExportedDecl;
pub use session::FileInfo;
pub use session::FileStatus;
pub use session::ImportedRef;
pub use types::FunctionType;
pub use types::TypeId;
pub use types::TypeKind;
pub use types::TypeStore;
