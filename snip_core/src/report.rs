use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use serde::Serialize;

/// The kind of a non-fatal failure recorded in a [`ValidationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
	/// The directive's source path does not exist under any source root.
	FileNotFound,
	/// The tag or line range is absent, or its markers are mismatched.
	RegionNotFound,
	/// A directive line is malformed.
	#[serde(rename = "parse_error")]
	Parse,
	/// A cross-document link points at a missing target.
	DanglingLink,
}

impl ErrorKind {
	/// Stable diagnostic code, e.g. `snip::file_not_found`.
	pub fn code(self) -> &'static str {
		match self {
			Self::FileNotFound => "snip::file_not_found",
			Self::RegionNotFound => "snip::region_not_found",
			Self::Parse => "snip::parse_error",
			Self::DanglingLink => "snip::dangling_link",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::FileNotFound => write!(f, "file not found"),
			Self::RegionNotFound => write!(f, "region not found"),
			Self::Parse => write!(f, "parse error"),
			Self::DanglingLink => write!(f, "dangling link"),
		}
	}
}

/// A single failure: where it happened, what kind it is, and the details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
	/// Document path, relative to the docs root.
	pub document: PathBuf,
	/// 1-indexed line in the document.
	pub line: usize,
	pub kind: ErrorKind,
	pub detail: String,
}

/// Every failure found during a run. An empty report means success.
#[derive(Debug, Clone, Default, Deref, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
	entries: Vec<ReportEntry>,
}

impl ValidationReport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, entry: ReportEntry) {
		self.entries.push(entry);
	}

	pub fn is_ok(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of distinct documents with at least one entry.
	pub fn document_count(&self) -> usize {
		self.by_document().len()
	}

	/// Order entries by document, then line, then kind.
	pub fn sort(&mut self) {
		self.entries.sort_by(|a, b| {
			a.document
				.cmp(&b.document)
				.then_with(|| a.line.cmp(&b.line))
				.then_with(|| a.kind.cmp(&b.kind))
		});
	}

	/// Entries grouped by document, documents in path order and entries in
	/// their original order.
	pub fn by_document(&self) -> BTreeMap<&Path, Vec<&ReportEntry>> {
		let mut groups: BTreeMap<&Path, Vec<&ReportEntry>> = BTreeMap::new();
		for entry in &self.entries {
			groups
				.entry(entry.document.as_path())
				.or_default()
				.push(entry);
		}
		groups
	}

	pub fn into_entries(self) -> Vec<ReportEntry> {
		self.entries
	}
}

impl Extend<ReportEntry> for ValidationReport {
	fn extend<T: IntoIterator<Item = ReportEntry>>(&mut self, iter: T) {
		self.entries.extend(iter);
	}
}

impl FromIterator<ReportEntry> for ValidationReport {
	fn from_iter<T: IntoIterator<Item = ReportEntry>>(iter: T) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}
