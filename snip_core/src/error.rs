use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SnipError {
	#[error(transparent)]
	#[diagnostic(code(snip::io_error))]
	Io(#[from] std::io::Error),

	#[error("failure to load markdown: {0}")]
	#[diagnostic(code(snip::markdown))]
	Markdown(String),

	#[error("malformed directive on line {line}: {reason}")]
	#[diagnostic(
		code(snip::parse_error),
		help("directives look like `@snip \"path/to/File.ext:tagName\"`")
	)]
	Parse { line: usize, reason: String },

	#[error("invalid configuration: {0}")]
	#[diagnostic(code(snip::configuration))]
	Configuration(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(snip::config_parse),
		help("check that snip.toml is valid TOML with [sources], [documents], [links] and/or [comments] sections")
	)]
	ConfigParse(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(snip::file_too_large),
		help("increase `max_file_size` in snip.toml or exclude this document")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(snip::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type SnipResult<T> = Result<T, SnipError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
