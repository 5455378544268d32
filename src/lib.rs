// routegen - template registry generator
// Turns a directory tree of compiled templ components into a Go registry
// of route patterns, opaque keys and template functions.

pub mod alias;
pub mod cli;
pub mod config;
pub mod dataservice;
pub mod emit;
pub mod error;
pub mod keys;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod route;
pub mod scanner;
pub mod symbols;
pub mod validate;
pub mod watch;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use alias::ImportGroup;
pub use config::{GeneratorConfig, ProjectConfig};
pub use dataservice::{DataDescriptor, DataServiceDetector, NoDataServices, SuffixHeuristic};
pub use error::{ConfigError, GenResult, GenerateError, SourceError};
pub use keys::KeyStrategy;
pub use naming::{NamingViolation, ScanWarning};
pub use pipeline::{GenerateReport, Generator};
pub use scanner::TemplateEntry;
pub use symbols::{GoSymbolSource, Selection, SymbolSource};
