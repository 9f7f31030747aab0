use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Inline source fragments into markdown docs and catch broken references before they \
	         ship.",
	long_about = "snip assembles documentation from markdown files and live source code.\n\nA \
	              directive such as `@snip \"booking/BookingTools.java:getBooking\"` on a line of \
	              its own is replaced by the region of the source file between the \
	              `getBooking:start` and `getBooking:end` comment markers. Every directive and \
	              internal link is validated before anything is written.\n\nQuick start:\n  snip \
	              init                     Create a snip.toml\n  snip check docs src          \
	              Validate every reference\n  snip render docs src out     Write the assembled \
	              docs\n  snip list docs               Show every directive"
)]
pub struct SnipCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to a `snip.toml` file. Defaults to `snip.toml`, `.snip.toml` or
	/// `.config/snip.toml` in the current directory.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Enable verbose output. Raises the log level to `debug` unless
	/// `SNIP_LOG` is set.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Validate every directive and link, then write the assembled documents.
	///
	/// Each document under the docs root is written to the same relative path
	/// under the output directory. When any reference is broken the report is
	/// printed grouped by document and nothing is written, unless `--force`
	/// is given.
	Render {
		/// Directory containing the markdown documents.
		docs_root: PathBuf,

		/// Directory that directive paths are resolved against.
		source_root: PathBuf,

		/// Directory the assembled documents are written to.
		out_dir: PathBuf,

		/// Additional source roots, searched in order after the first one.
		#[arg(long = "source", value_name = "DIR")]
		sources: Vec<PathBuf>,

		/// Compare against the existing output instead of writing. Exits
		/// with a non-zero status code when any output file is stale or
		/// missing.
		#[arg(long, default_value_t = false)]
		check: bool,

		/// Show a unified diff for each stale output file. Only meaningful
		/// with `--check`.
		#[arg(long, default_value_t = false, requires = "check")]
		diff: bool,

		/// Write the output even when validation fails. Unresolved directives
		/// are left in place.
		#[arg(long, default_value_t = false, conflicts_with = "check")]
		force: bool,
	},
	/// Validate every directive and link without writing anything.
	///
	/// Exits with a non-zero status code when any reference is broken. Ideal
	/// for CI pipelines; use `--format github` for inline pull request
	/// annotations.
	Check {
		/// Directory containing the markdown documents.
		docs_root: PathBuf,

		/// Directory that directive paths are resolved against.
		source_root: PathBuf,

		/// Additional source roots, searched in order after the first one.
		#[arg(long = "source", value_name = "DIR")]
		sources: Vec<PathBuf>,

		/// Output format for the report. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List every directive in every document.
	List {
		/// Directory containing the markdown documents.
		docs_root: PathBuf,
	},
	/// Create a sample `snip.toml` in the current directory.
	///
	/// If the file already exists, this command is a no-op and exits
	/// successfully.
	Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors, grouped by document.
	Text,
	/// JSON output for programmatic consumption. Each entry includes the
	/// document, line, kind and detail.
	Json,
	/// GitHub Actions annotation format. Emits one `::error` annotation per
	/// entry.
	Github,
}
