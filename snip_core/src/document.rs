use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// A parsed markdown document: an ordered sequence of [`Block`]s.
///
/// Concatenating the blocks reproduces the input byte for byte, line
/// endings included, see [`Document::source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	/// Path of the document, relative to the docs root.
	pub path: PathBuf,
	pub blocks: Vec<Block>,
}

impl Document {
	pub fn new(path: impl Into<PathBuf>, blocks: Vec<Block>) -> Self {
		Self {
			path: path.into(),
			blocks,
		}
	}

	/// Every directive in document order, including those inside fences.
	pub fn directives(&self) -> Vec<&Directive> {
		let mut directives = Vec::new();
		collect_directives(&self.blocks, &mut directives);
		directives
	}

	/// The verbatim text the document was parsed from.
	pub fn source(&self) -> String {
		let mut source = String::new();
		for block in &self.blocks {
			block.write_source(&mut source);
		}
		source
	}
}

fn collect_directives<'a>(blocks: &'a [Block], directives: &mut Vec<&'a Directive>) {
	for block in blocks {
		match block {
			Block::Directive(directive) => directives.push(directive),
			Block::Fence(fence) => collect_directives(&fence.body, directives),
			Block::Literal(_) => {}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Block {
	/// Verbatim text made of one or more whole lines.
	Literal(Literal),
	/// A single transclusion directive line.
	Directive(Directive),
	/// A fenced code block whose body may contain directives.
	Fence(Fence),
}

impl Block {
	fn write_source(&self, out: &mut String) {
		match self {
			Self::Literal(literal) => out.push_str(&literal.text),
			Self::Directive(directive) => out.push_str(&directive.raw),
			Self::Fence(fence) => {
				out.push_str(&fence.opening);
				for block in &fence.body {
					block.write_source(out);
				}
				if let Some(closing) = &fence.closing {
					out.push_str(closing);
				}
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
	pub text: String,
	/// 1-indexed line of the first line in `text`.
	pub line: usize,
}

/// A fenced code block. The fence lines are kept verbatim, including their
/// trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fence {
	pub opening: String,
	pub body: Vec<Block>,
	/// `None` when the fence is still open at the end of the document.
	pub closing: Option<String>,
	/// 1-indexed line of the opening fence.
	pub line: usize,
}

/// A transclusion directive: insert the selected region of `source_path`
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
	/// Path relative to a source root, exactly as written.
	pub source_path: String,
	pub region: Option<RegionSelector>,
	/// Leading whitespace of the directive line, applied to every inserted
	/// line.
	pub indent: String,
	/// The verbatim directive line including its line ending, if any.
	pub raw: String,
	/// 1-indexed line number in the document.
	pub line: usize,
}

impl Directive {
	/// Human readable reference, e.g. `Booking.java:fragmentA`.
	pub fn reference(&self) -> String {
		match &self.region {
			Some(region) => format!("{}:{region}", self.source_path),
			None => self.source_path.clone(),
		}
	}

	pub fn source_path(&self) -> &Path {
		Path::new(&self.source_path)
	}
}

/// Which part of a source file a directive selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RegionSelector {
	/// A region delimited by `tag:start` and `tag:end` markers.
	Tag(String),
	/// An inclusive, 1-indexed line range.
	Lines(LineRange),
}

impl fmt::Display for RegionSelector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tag(tag) => write!(f, "{tag}"),
			Self::Lines(range) => write!(f, "{range}"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
	/// First line, 1-indexed.
	pub start: usize,
	/// Last line, inclusive. `None` runs to the end of the file.
	pub end: Option<usize>,
}

impl fmt::Display for LineRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.end {
			Some(end) if end == self.start => write!(f, "{}", self.start),
			Some(end) => write!(f, "{}-{end}", self.start),
			None => write!(f, "{}-", self.start),
		}
	}
}

/// A document with every resolvable directive replaced by literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
	/// Path relative to the docs root; also the relative output path.
	pub path: PathBuf,
	pub content: String,
}
