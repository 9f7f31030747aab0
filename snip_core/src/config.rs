use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SnipError;
use crate::SnipResult;

/// Default maximum document size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default token that starts a directive line.
pub const DEFAULT_SENTINEL: &str = "@snip";

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["snip.toml", ".snip.toml", ".config/snip.toml"];

/// Configuration loaded from a `snip.toml` file.
///
/// ```toml
/// sentinel = "@snip"
///
/// [sources]
/// roots = ["../src"]
///
/// [documents]
/// patterns = ["**/*.md"]
/// exclude = ["drafts/"]
///
/// [links]
/// check = true
///
/// [comments]
/// java = "//"
/// html = ["<!--", "-->"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SnipConfig {
	/// Token that starts a directive line.
	#[serde(default = "default_sentinel")]
	pub sentinel: String,
	/// Additional source roots searched after the ones given on the command
	/// line.
	#[serde(default)]
	pub sources: SourcesConfig,
	/// Which files under the docs root are documents.
	#[serde(default)]
	pub documents: DocumentsConfig,
	/// Cross-document link validation.
	#[serde(default)]
	pub links: LinksConfig,
	/// Comment syntax per file extension, merged over the built-in table.
	#[serde(default)]
	pub comments: HashMap<String, CommentStyle>,
	/// Maximum document size in bytes. Larger documents abort the run.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files under the docs root are not used for
	/// filtering documents.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl Default for SnipConfig {
	fn default() -> Self {
		Self {
			sentinel: default_sentinel(),
			sources: SourcesConfig::default(),
			documents: DocumentsConfig::default(),
			links: LinksConfig::default(),
			comments: HashMap::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

fn default_sentinel() -> String {
	DEFAULT_SENTINEL.to_string()
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

fn default_document_patterns() -> Vec<String> {
	vec!["**/*.md".to_string(), "**/*.markdown".to_string()]
}

fn default_true() -> bool {
	true
}

/// Extra source roots. Relative paths are resolved against the directory
/// containing the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
	#[serde(default)]
	pub roots: Vec<PathBuf>,
}

/// Document discovery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
	/// Glob patterns, relative to the docs root, selecting documents.
	#[serde(default = "default_document_patterns")]
	pub patterns: Vec<String>,
	/// Gitignore-style patterns for files and directories to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl Default for DocumentsConfig {
	fn default() -> Self {
		Self {
			patterns: default_document_patterns(),
			exclude: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
	/// Whether internal links are validated.
	#[serde(default = "default_true")]
	pub check: bool,
}

impl Default for LinksConfig {
	fn default() -> Self {
		Self { check: true }
	}
}

/// Comment syntax used by region markers in a source language.
///
/// A bare string is a line comment opener (`"//"`), a two element array is
/// an opener and closer pair (`["<!--", "-->"]`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum CommentStyle {
	Line(String),
	Pair(String, String),
}

impl CommentStyle {
	pub fn line(open: impl Into<String>) -> Self {
		Self::Line(open.into())
	}

	pub fn pair(open: impl Into<String>, close: impl Into<String>) -> Self {
		Self::Pair(open.into(), close.into())
	}

	/// The opening and closing delimiters. Line comments have an empty
	/// closer.
	pub fn delimiters(&self) -> (&str, &str) {
		match self {
			Self::Line(open) => (open.as_str(), ""),
			Self::Pair(open, close) => (open.as_str(), close.as_str()),
		}
	}
}

const BUILTIN_COMMENT_STYLES: &[(&[&str], &str, &str)] = &[
	(
		&[
			"rs", "java", "kt", "kts", "scala", "groovy", "gradle", "swift", "go", "c", "h", "cc",
			"cpp", "hpp", "cs", "js", "jsx", "mjs", "cjs", "ts", "tsx", "dart", "php", "proto",
			"src",
		],
		"//",
		"",
	),
	(
		&[
			"py", "rb", "sh", "bash", "zsh", "yaml", "yml", "toml", "properties", "pl", "r",
			"ps1", "dockerfile", "cfg", "conf",
		],
		"#",
		"",
	),
	(&["sql", "lua", "hs"], "--", ""),
	(&["ini", "clj", "lisp", "el", "asm"], ";", ""),
	(&["tex", "erl"], "%", ""),
	(
		&["html", "htm", "xml", "md", "markdown", "vue", "svelte"],
		"<!--",
		"-->",
	),
	(&["css", "scss", "less"], "/*", "*/"),
];

/// Lookup table from file extension to [`CommentStyle`].
#[derive(Debug, Clone)]
pub struct CommentTable {
	styles: HashMap<String, CommentStyle>,
	fallback: Vec<CommentStyle>,
}

impl Default for CommentTable {
	fn default() -> Self {
		Self::with_overrides(&HashMap::new())
	}
}

impl CommentTable {
	/// The built-in table with `overrides` merged on top. Extension keys are
	/// matched case-insensitively and may be written with a leading dot.
	#[allow(clippy::implicit_hasher)]
	pub fn with_overrides(overrides: &HashMap<String, CommentStyle>) -> Self {
		let mut styles = HashMap::new();

		for (extensions, open, close) in BUILTIN_COMMENT_STYLES {
			let style = if close.is_empty() {
				CommentStyle::line(*open)
			} else {
				CommentStyle::pair(*open, *close)
			};
			for extension in *extensions {
				styles.insert((*extension).to_string(), style.clone());
			}
		}

		for (extension, style) in overrides {
			styles.insert(normalize_extension(extension), style.clone());
		}

		let fallback = styles
			.values()
			.cloned()
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect();

		Self { styles, fallback }
	}

	/// The comment style registered for `path`'s extension.
	pub fn style_for(&self, path: &Path) -> Option<&CommentStyle> {
		let extension = path.extension().and_then(|e| e.to_str())?;
		self.styles.get(&normalize_extension(extension))
	}

	/// Every distinct known style, used for files with unknown extensions.
	pub fn fallback(&self) -> &[CommentStyle] {
		&self.fallback
	}
}

fn normalize_extension(extension: &str) -> String {
	extension.trim_start_matches('.').to_ascii_lowercase()
}

impl SnipConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> SnipResult<Option<SnipConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit file path.
	pub fn load_file(path: &Path) -> SnipResult<SnipConfig> {
		let content = std::fs::read_to_string(path)?;
		let mut config = Self::from_toml(&content)?;

		let base = path.parent().unwrap_or_else(|| Path::new("."));
		config.sources.roots = config
			.sources
			.roots
			.iter()
			.map(|root| base.join(root))
			.collect();

		tracing::debug!(path = %path.display(), "loaded config");
		Ok(config)
	}

	/// Parse and validate config text. Relative source roots are left
	/// untouched.
	pub fn from_toml(content: &str) -> SnipResult<SnipConfig> {
		let config: SnipConfig =
			toml::from_str(content).map_err(|e| SnipError::ConfigParse(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Check invariants that serde cannot express.
	pub fn validate(&self) -> SnipResult<()> {
		if self.sentinel.is_empty() {
			return Err(SnipError::Configuration(
				"`sentinel` must not be empty".to_string(),
			));
		}

		if self.sentinel.chars().any(char::is_whitespace) {
			return Err(SnipError::Configuration(format!(
				"`sentinel` must not contain whitespace: `{}`",
				self.sentinel
			)));
		}

		if self.sentinel.contains('"') {
			return Err(SnipError::Configuration(format!(
				"`sentinel` must not contain quotes: `{}`",
				self.sentinel
			)));
		}

		for (extension, style) in &self.comments {
			if style.delimiters().0.trim().is_empty() {
				return Err(SnipError::Configuration(format!(
					"comment opener for `{extension}` must not be empty"
				)));
			}
		}

		Ok(())
	}

	/// The comment table with this config's overrides applied.
	pub fn comment_table(&self) -> CommentTable {
		CommentTable::with_overrides(&self.comments)
	}
}
