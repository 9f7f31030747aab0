//! `snip_core` is the core library for the `snip` documentation assembler.
//! It inlines fragments of source files into markdown documents through
//! transclusion directives and validates every reference before anything is
//! written.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Parser (splits lines into literal, directive, and fence blocks)
//!   → Validator (resolves every directive and link, collecting failures)
//!   → Assembler (replaces directives with fragment text)
//!   → Project (walks the docs root and writes rendered output)
//! ```
//!
//! ## Directives
//!
//! A directive is a line of its own, optionally inside a fenced code block:
//!
//! ````markdown
//! ```java
//! @snip "booking/BookingTools.java:getBooking"
//! ```
//! ````
//!
//! The region after `:` is either a tag delimited in the source file by
//! comment markers (`// getBooking:start` … `// getBooking:end`) or a line
//! range such as `12-20`. Without a region the whole file is inserted.
//!
//! ## Modules
//!
//! - [`config`]: configuration loading from `snip.toml`, including the
//!   sentinel, extra source roots, document patterns, and comment syntax per
//!   extension.
//! - [`project`]: document discovery under a docs root, whole-project
//!   validation and rendering, and output writing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::path::PathBuf;
//!
//! use snip_core::SnipConfig;
//! use snip_core::project::ScanOptions;
//! use snip_core::project::build_locator;
//! use snip_core::project::load_project;
//! use snip_core::project::write_rendered;
//!
//! let config = SnipConfig::default();
//! let options = ScanOptions::from_config(&config).unwrap();
//! let project = load_project(Path::new("docs"), &config, &options).unwrap();
//! let locator = build_locator(&[PathBuf::from("src")], &config).unwrap();
//!
//! let outcome = project.render(&locator).unwrap();
//! if outcome.is_ok() {
//!     write_rendered(Path::new("out"), &outcome.rendered).unwrap();
//! } else {
//!     eprintln!("{} broken reference(s)", outcome.report.len());
//! }
//! ```

pub use assembler::*;
pub use config::*;
pub use document::*;
pub use error::*;
pub use links::*;
pub use locator::*;
pub use parser::*;
pub use report::*;
pub use validator::*;

mod assembler;
pub mod config;
mod document;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod links;
mod locator;
mod parser;
pub mod project;
mod report;
mod validator;

#[cfg(test)]
mod __fixtures;
