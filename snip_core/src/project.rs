use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Serialize;

use crate::Document;
use crate::DocumentSet;
use crate::FragmentLocator;
use crate::ParseDiagnostic;
use crate::RenderedDocument;
use crate::SnipConfig;
use crate::SnipError;
use crate::SnipResult;
use crate::ValidationReport;
use crate::assemble;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::parse_entries;
use crate::parse_with_diagnostics;
use crate::validate_document;

/// Options controlling which files under the docs root are documents.
///
/// Use [`ScanOptions::from_config`] to construct from a [`SnipConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Glob patterns, relative to the docs root, selecting documents.
	pub patterns: GlobSet,
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Directories skipped entirely, typically the output directory.
	pub excluded_dirs: Vec<PathBuf>,
	/// Maximum document size in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self::from_config(&SnipConfig::default()).unwrap_or_else(|_| {
			Self {
				patterns: GlobSet::empty(),
				exclude_patterns: Vec::new(),
				excluded_dirs: Vec::new(),
				max_file_size: DEFAULT_MAX_FILE_SIZE,
				disable_gitignore: false,
			}
		})
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from a [`SnipConfig`]. Invalid glob patterns
	/// are configuration errors.
	pub fn from_config(config: &SnipConfig) -> SnipResult<Self> {
		Ok(Self {
			patterns: build_glob_set(&config.documents.patterns)?,
			exclude_patterns: config.documents.exclude.clone(),
			excluded_dirs: Vec::new(),
			max_file_size: config.max_file_size,
			disable_gitignore: config.disable_gitignore,
		})
	}

	/// Skip `dir` during discovery.
	#[must_use]
	pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
		self.excluded_dirs.push(dir.into());
		self
	}
}

/// A document together with the malformed directive lines found while
/// parsing it.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
	pub document: Document,
	pub diagnostics: Vec<ParseDiagnostic>,
}

/// Every document under a docs root, parsed and ready for validation and
/// assembly.
#[derive(Debug, Clone)]
pub struct Project {
	pub docs_root: PathBuf,
	pub documents: Vec<ParsedDocument>,
	pub document_set: DocumentSet,
	/// Whether internal links are validated.
	pub check_links: bool,
}

/// The result of validating and assembling a project.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
	pub report: ValidationReport,
	pub rendered: Vec<RenderedDocument>,
}

impl RenderOutcome {
	pub fn is_ok(&self) -> bool {
		self.report.is_ok()
	}
}

/// An output file that does not match what rendering would produce.
#[derive(Debug, Clone, Serialize)]
pub struct StaleOutput {
	/// Path relative to the output directory.
	pub path: PathBuf,
	/// Current content, `None` when the file is missing.
	pub current: Option<String>,
	pub expected: String,
}

impl Project {
	/// Number of directives across all documents.
	pub fn directive_count(&self) -> usize {
		self.documents
			.iter()
			.map(|parsed| parsed.document.directives().len())
			.sum()
	}

	/// Resolve every directive and link in every document. Failures are
	/// collected, never raised; only I/O-level faults return `Err`.
	pub fn validate(&self, locator: &FragmentLocator) -> SnipResult<ValidationReport> {
		let documents = self.check_links.then_some(&self.document_set);
		let mut report = ValidationReport::new();

		for parsed in &self.documents {
			report.extend(parse_entries(&parsed.document, &parsed.diagnostics));
			report.extend(validate_document(&parsed.document, locator, documents)?);
		}

		report.sort();
		Ok(report)
	}

	/// Render every document.
	pub fn assemble(&self, locator: &FragmentLocator) -> Vec<RenderedDocument> {
		self.documents
			.iter()
			.map(|parsed| assemble(&parsed.document, locator))
			.collect()
	}

	/// Validate then assemble.
	pub fn render(&self, locator: &FragmentLocator) -> SnipResult<RenderOutcome> {
		let report = self.validate(locator)?;
		let rendered = self.assemble(locator);

		Ok(RenderOutcome { report, rendered })
	}
}

/// Discover and parse every document under `docs_root`.
///
/// A missing docs root is a configuration error and aborts immediately.
pub fn load_project(
	docs_root: &Path,
	config: &SnipConfig,
	options: &ScanOptions,
) -> SnipResult<Project> {
	if !docs_root.is_dir() {
		return Err(SnipError::Configuration(format!(
			"docs root `{}` does not exist or is not a directory",
			docs_root.display()
		)));
	}

	let canonical_root = docs_root.canonicalize()?;
	if options
		.excluded_dirs
		.iter()
		.any(|dir| dir.canonicalize().is_ok_and(|dir| dir == canonical_root))
	{
		return Err(SnipError::Configuration(format!(
			"output directory must not be the docs root `{}`",
			docs_root.display()
		)));
	}

	let files = collect_documents(docs_root, options)?;
	let mut documents = Vec::with_capacity(files.len());

	for file in &files {
		let metadata = std::fs::metadata(file)?;
		if metadata.len() > options.max_file_size {
			return Err(SnipError::FileTooLarge {
				path: file.display().to_string(),
				size: metadata.len(),
				limit: options.max_file_size,
			});
		}

		let content = std::fs::read_to_string(file)?;
		let relative = file.strip_prefix(docs_root).unwrap_or(file).to_path_buf();
		let (document, diagnostics) = parse_with_diagnostics(relative, &content, &config.sentinel);

		tracing::debug!(
			document = %document.path.display(),
			directives = document.directives().len(),
			malformed = diagnostics.len(),
			"parsed document"
		);

		documents.push(ParsedDocument {
			document,
			diagnostics,
		});
	}

	let document_set = DocumentSet::new(
		docs_root,
		documents
			.iter()
			.map(|parsed| parsed.document.path.clone()),
	);

	Ok(Project {
		docs_root: docs_root.to_path_buf(),
		documents,
		document_set,
		check_links: config.links.check,
	})
}

/// Build a locator over `source_roots` followed by any roots from the
/// config. Every root must be an existing directory.
pub fn build_locator(source_roots: &[PathBuf], config: &SnipConfig) -> SnipResult<FragmentLocator> {
	let mut roots = Vec::new();

	for root in source_roots.iter().chain(&config.sources.roots) {
		if !root.is_dir() {
			return Err(SnipError::Configuration(format!(
				"source root `{}` does not exist or is not a directory",
				root.display()
			)));
		}
		if !roots.contains(root) {
			roots.push(root.clone());
		}
	}

	Ok(FragmentLocator::new(roots, config.comment_table()))
}

/// Write rendered documents beneath `out_dir`, mirroring their relative
/// paths. Returns the number of files written.
pub fn write_rendered(out_dir: &Path, rendered: &[RenderedDocument]) -> SnipResult<usize> {
	for document in rendered {
		let target = out_dir.join(&document.path);
		if let Some(parent) = target.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&target, &document.content)?;
		tracing::debug!(path = %target.display(), "wrote rendered document");
	}

	Ok(rendered.len())
}

/// Compare rendered documents against the files already in `out_dir`.
pub fn find_stale_outputs(
	out_dir: &Path,
	rendered: &[RenderedDocument],
) -> SnipResult<Vec<StaleOutput>> {
	let mut stale = Vec::new();

	for document in rendered {
		let target = out_dir.join(&document.path);
		let current = if target.is_file() {
			Some(std::fs::read_to_string(&target)?)
		} else {
			None
		};

		if current.as_deref() != Some(document.content.as_str()) {
			stale.push(StaleOutput {
				path: document.path.clone(),
				current,
				expected: document.content.clone(),
			});
		}
	}

	Ok(stale)
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> SnipResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			SnipError::Configuration(format!("invalid document pattern `{pattern}`: {e}"))
		})?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| SnipError::Configuration(format!("failed to build document patterns: {e}")))
}

/// Build a `Gitignore` matcher from `[documents] exclude` patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> SnipResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			SnipError::Configuration(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| SnipError::Configuration(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the docs root's `.gitignore` file (if
/// any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Collect every document under `root`, sorted by path.
pub fn collect_documents(root: &Path, options: &ScanOptions) -> SnipResult<Vec<PathBuf>> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let excluded_dirs: Vec<PathBuf> = options
		.excluded_dirs
		.iter()
		.filter_map(|dir| dir.canonicalize().ok())
		.collect();

	let walker = Walker {
		root,
		options,
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
		excluded_dirs: &excluded_dirs,
	};

	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();
	walker.walk(root, &mut files, &mut visited_dirs)?;

	// Sort for deterministic ordering.
	files.sort();
	Ok(files)
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

struct Walker<'a> {
	root: &'a Path,
	options: &'a ScanOptions,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	excluded_dirs: &'a [PathBuf],
}

impl Walker<'_> {
	fn walk(
		&self,
		dir: &Path,
		files: &mut Vec<PathBuf>,
		visited_dirs: &mut HashSet<PathBuf>,
	) -> SnipResult<()> {
		// Detect symlink cycles by tracking canonical paths.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited_dirs.insert(canonical.clone()) {
			return Err(SnipError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		if self.excluded_dirs.contains(&canonical) {
			return Ok(());
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();

			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if is_ignored_directory_name(name) {
					continue;
				}
			}

			let is_dir = path.is_dir();

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk(&path, files, visited_dirs)?;
			} else if path
				.strip_prefix(self.root)
				.is_ok_and(|relative| self.options.patterns.is_match(relative))
			{
				files.push(path);
			}
		}

		Ok(())
	}
}
