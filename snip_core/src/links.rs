use std::collections::BTreeSet;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use markdown::ParseOptions;
use markdown::mdast::Node;
use markdown::to_mdast;

use crate::SnipError;
use crate::SnipResult;

/// The set of documents taking part in a run, used to validate
/// cross-document links.
#[derive(Debug, Clone)]
pub struct DocumentSet {
	root: PathBuf,
	documents: BTreeSet<PathBuf>,
}

impl DocumentSet {
	/// `documents` are paths relative to `root`.
	pub fn new(root: impl Into<PathBuf>, documents: impl IntoIterator<Item = PathBuf>) -> Self {
		Self {
			root: root.into(),
			documents: documents.into_iter().collect(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn contains(&self, relative: &Path) -> bool {
		self.documents.contains(relative)
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Path> {
		self.documents.iter().map(PathBuf::as_path)
	}

	/// Check a link found in the document at `from` (relative to the root).
	/// Returns a description of the problem for dangling links.
	pub fn check_link(&self, from: &Path, url: &str) -> Result<(), String> {
		if is_external(url) {
			return Ok(());
		}

		let target = url.split(['#', '?']).next().unwrap_or_default();
		if target.is_empty() {
			return Ok(());
		}

		let decoded = target.replace("%20", " ");
		let joined = match decoded.strip_prefix('/') {
			Some(rooted) => PathBuf::from(rooted),
			None => {
				from.parent()
					.unwrap_or_else(|| Path::new(""))
					.join(&decoded)
			}
		};

		let Some(resolved) = normalize(&joined) else {
			return Err(format!("`{url}` points outside the docs root"));
		};

		let extension = resolved
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or_default()
			.to_ascii_lowercase();

		let exists = match extension.as_str() {
			"md" | "markdown" => self.contains(&resolved),
			"html" | "htm" => {
				self.contains(&resolved.with_extension("md"))
					|| self.contains(&resolved.with_extension("markdown"))
					|| self.root.join(&resolved).exists()
			}
			_ => self.root.join(&resolved).exists(),
		};

		if exists {
			Ok(())
		} else {
			Err(format!(
				"`{url}` points to missing target `{}`",
				resolved.display()
			))
		}
	}
}

/// A link, image, or reference definition found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
	pub url: String,
	/// 1-indexed line of the link in the document.
	pub line: usize,
}

/// Collect every link destination in markdown `content`. Code spans and
/// fenced code blocks never contain links.
pub fn extract_links(content: &str) -> SnipResult<Vec<Link>> {
	let options = ParseOptions::gfm();
	let mdast = to_mdast(content, &options).map_err(|e| SnipError::Markdown(e.to_string()))?;
	let mut links = Vec::new();
	collect_links(&mdast, &mut links);

	Ok(links)
}

fn collect_links(node: &Node, links: &mut Vec<Link>) {
	let destination = match node {
		Node::Link(link) => Some((&link.url, link.position.as_ref())),
		Node::Image(image) => Some((&image.url, image.position.as_ref())),
		Node::Definition(definition) => Some((&definition.url, definition.position.as_ref())),
		_ => None,
	};

	if let Some((url, position)) = destination {
		links.push(Link {
			url: url.clone(),
			line: position.map_or(1, |position| position.start.line),
		});
	}

	if let Some(children) = node.children() {
		for child in children {
			collect_links(child, links);
		}
	}
}

/// `https:`, `mailto:`, protocol-relative `//host`, and similar.
fn is_external(url: &str) -> bool {
	if url.starts_with("//") {
		return true;
	}

	let Some((scheme, _)) = url.split_once(':') else {
		return false;
	};

	let mut chars = scheme.chars();
	chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Lexically resolve `.` and `..`. Returns `None` when the path climbs
/// above its starting point.
fn normalize(path: &Path) -> Option<PathBuf> {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::Normal(part) => normalized.push(part),
			Component::CurDir => {}
			Component::ParentDir => {
				if !normalized.pop() {
					return None;
				}
			}
			Component::RootDir | Component::Prefix(_) => return None,
		}
	}

	Some(normalized)
}
