use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use crate::CommentStyle;
use crate::CommentTable;
use crate::Directive;
use crate::ErrorKind;
use crate::LineRange;
use crate::RegionSelector;
use crate::lexer::is_tag_name;
use crate::parser::normalize_line_endings;

/// Why a reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LocateError {
	#[error("source file `{path}` not found: {reason}")]
	FileNotFound { path: String, reason: String },

	#[error("region `{region}` not found in `{path}`: {reason}")]
	RegionNotFound {
		path: String,
		region: String,
		reason: String,
	},
}

impl LocateError {
	/// The report kind for this failure.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::FileNotFound { .. } => ErrorKind::FileNotFound,
			Self::RegionNotFound { .. } => ErrorKind::RegionNotFound,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FragmentKey {
	source_path: String,
	region: Option<RegionSelector>,
}

#[derive(Debug)]
struct SourceFile {
	path: PathBuf,
	content: String,
}

/// Resolves directive references to literal text from one or more source
/// roots.
///
/// Source trees are assumed not to change during a run, so both file
/// contents and extracted fragments are cached for the lifetime of the
/// locator. The cache is not thread safe; use one locator per run.
#[derive(Debug)]
pub struct FragmentLocator {
	roots: Vec<PathBuf>,
	comments: CommentTable,
	files: RefCell<HashMap<String, Result<Rc<SourceFile>, LocateError>>>,
	fragments: RefCell<HashMap<FragmentKey, Result<String, LocateError>>>,
}

impl FragmentLocator {
	/// Create a locator searching `roots` in order.
	pub fn new(roots: Vec<PathBuf>, comments: CommentTable) -> Self {
		Self {
			roots,
			comments,
			files: RefCell::new(HashMap::new()),
			fragments: RefCell::new(HashMap::new()),
		}
	}

	pub fn roots(&self) -> &[PathBuf] {
		&self.roots
	}

	/// Resolve a parsed directive.
	pub fn resolve(&self, directive: &Directive) -> Result<String, LocateError> {
		self.locate(&directive.source_path, directive.region.as_ref())
	}

	/// Return the text of `source_path`, or of the selected region of it.
	///
	/// The text is the selected lines joined by `\n`, without a final
	/// terminator. A trailing `\n` therefore means a trailing blank line.
	pub fn locate(
		&self,
		source_path: &str,
		region: Option<&RegionSelector>,
	) -> Result<String, LocateError> {
		let key = FragmentKey {
			source_path: source_path.to_string(),
			region: region.cloned(),
		};

		if let Some(cached) = self.fragments.borrow().get(&key) {
			tracing::trace!(source_path, "fragment cache hit");
			return cached.clone();
		}

		let result = self.load(source_path).and_then(|file| {
			let extracted = match region {
				None => Ok(file.content.lines().collect::<Vec<_>>().join("\n")),
				Some(RegionSelector::Tag(tag)) => {
					let styles = match self.comments.style_for(&file.path) {
						Some(style) => std::slice::from_ref(style),
						None => self.comments.fallback(),
					};
					extract_region(&file.content, tag, styles)
				}
				Some(RegionSelector::Lines(range)) => extract_lines(&file.content, *range),
			};

			extracted.map_err(|reason| {
				LocateError::RegionNotFound {
					path: source_path.to_string(),
					region: region.map(ToString::to_string).unwrap_or_default(),
					reason,
				}
			})
		});

		tracing::debug!(source_path, ok = result.is_ok(), "resolved fragment");
		self.fragments.borrow_mut().insert(key, result.clone());
		result
	}

	fn load(&self, source_path: &str) -> Result<Rc<SourceFile>, LocateError> {
		if let Some(cached) = self.files.borrow().get(source_path) {
			return cached.clone();
		}

		let result = self.find_file(source_path).and_then(|path| {
			let raw = std::fs::read_to_string(&path).map_err(|e| {
				LocateError::FileNotFound {
					path: source_path.to_string(),
					reason: format!("unreadable: {e}"),
				}
			})?;

			Ok(Rc::new(SourceFile {
				content: normalize_line_endings(&raw),
				path,
			}))
		});

		self.files
			.borrow_mut()
			.insert(source_path.to_string(), result.clone());
		result
	}

	/// Search the roots in order. The first root containing the file wins.
	fn find_file(&self, source_path: &str) -> Result<PathBuf, LocateError> {
		let not_found = |reason: String| {
			LocateError::FileNotFound {
				path: source_path.to_string(),
				reason,
			}
		};

		let relative = Path::new(source_path);
		if relative.is_absolute() || relative.has_root() {
			return Err(not_found("absolute paths are not allowed".to_string()));
		}

		if self.roots.is_empty() {
			return Err(not_found("no source roots configured".to_string()));
		}

		for root in &self.roots {
			let candidate = root.join(relative);
			if !candidate.is_file() {
				continue;
			}

			let (Ok(canonical_root), Ok(canonical)) = (root.canonicalize(), candidate.canonicalize())
			else {
				continue;
			};

			if !canonical.starts_with(&canonical_root) {
				return Err(not_found(format!(
					"path escapes source root `{}`",
					root.display()
				)));
			}

			return Ok(candidate);
		}

		let searched = self
			.roots
			.iter()
			.map(|root| format!("`{}`", root.display()))
			.collect::<Vec<_>>()
			.join(", ");
		Err(not_found(format!("no such file under {searched}")))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
	Start,
	End,
}

struct Marker<'a> {
	tag: &'a str,
	kind: MarkerKind,
}

/// Recognise a `tag:start` / `tag:end` comment line in any of `styles`.
fn parse_marker<'a>(line: &'a str, styles: &[CommentStyle]) -> Option<Marker<'a>> {
	let trimmed = line.trim();

	styles.iter().find_map(|style| {
		let (open, close) = style.delimiters();
		let inner = trimmed.strip_prefix(open)?;
		let inner = if close.is_empty() {
			inner
		} else {
			inner.strip_suffix(close)?
		};

		let (tag, kind) = inner.trim().rsplit_once(':')?;
		let kind = match kind {
			"start" => MarkerKind::Start,
			"end" => MarkerKind::End,
			_ => return None,
		};

		is_tag_name(tag).then_some(Marker { tag, kind })
	})
}

/// Extract every region named `tag` from `content`.
///
/// Disjoint regions with the same tag are concatenated in file order and
/// marker lines of other tags are dropped. The result is dedented with
/// [`dedent`].
pub fn extract_region(content: &str, tag: &str, styles: &[CommentStyle]) -> Result<String, String> {
	let mut inside = false;
	let mut regions = 0usize;
	let mut lines = Vec::new();

	for (index, line) in content.lines().enumerate() {
		match parse_marker(line, styles) {
			Some(marker) if marker.tag == tag => {
				match (marker.kind, inside) {
					(MarkerKind::Start, false) => inside = true,
					(MarkerKind::Start, true) => {
						return Err(format!(
							"`{tag}:start` on line {} opens a region that is already open",
							index + 1
						));
					}
					(MarkerKind::End, true) => {
						inside = false;
						regions += 1;
					}
					(MarkerKind::End, false) => {
						return Err(format!(
							"`{tag}:end` on line {} has no matching `{tag}:start`",
							index + 1
						));
					}
				}
			}
			Some(_) => {}
			None => {
				if inside {
					lines.push(line);
				}
			}
		}
	}

	if inside {
		return Err(format!("`{tag}:start` has no matching `{tag}:end`"));
	}

	if regions == 0 {
		return Err(format!("no `{tag}:start` marker"));
	}

	Ok(dedent(&lines))
}

/// Extract an inclusive, 1-indexed line range from `content`, dedented.
pub fn extract_lines(content: &str, range: LineRange) -> Result<String, String> {
	let lines: Vec<&str> = content.lines().collect();
	let end = range.end.unwrap_or(lines.len());

	if range.start == 0 {
		return Err(format!("line range {range} must start at line 1 or later"));
	}

	if range.end.is_some_and(|end| end < range.start) {
		return Err(format!("line range {range} ends before it starts"));
	}

	if range.start > lines.len() || end > lines.len() {
		return Err(format!(
			"line range {range} is outside the file ({} lines)",
			lines.len()
		));
	}

	Ok(dedent(&lines[range.start - 1..end]))
}

/// Strip the leading whitespace shared by every non-blank line, and nothing
/// more. Whitespace-only lines become empty.
pub fn dedent(lines: &[&str]) -> String {
	let prefix = lines
		.iter()
		.filter(|line| !line.trim().is_empty())
		.map(|line| &line[..line.len() - line.trim_start().len()])
		.reduce(common_prefix)
		.unwrap_or("");

	lines
		.iter()
		.map(|line| {
			if line.trim().is_empty() {
				""
			} else {
				&line[prefix.len()..]
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
	let len = a
		.char_indices()
		.zip(b.chars())
		.take_while(|((_, x), y)| x == y)
		.last()
		.map_or(0, |((index, c), _)| index + c.len_utf8());
	&a[..len]
}
