use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use snip_cli::Commands;
use snip_cli::OutputFormat;
use snip_cli::SnipCli;
use snip_core::AnyError;
use snip_core::SnipConfig;
use snip_core::SnipError;
use snip_core::ValidationReport;
use snip_core::project::Project;
use snip_core::project::ScanOptions;
use snip_core::project::build_locator;
use snip_core::project::find_stale_outputs;
use snip_core::project::load_project;
use snip_core::project::write_rendered;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SnipCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Render {
			docs_root,
			source_root,
			out_dir,
			sources,
			check,
			diff,
			force,
		}) => {
			let roots = source_roots(source_root, sources);
			let options = RenderOptions {
				check: *check,
				diff: *diff,
				force: *force,
			};
			run_render(&args, docs_root, &roots, out_dir, options)
		}
		Some(Commands::Check {
			docs_root,
			source_root,
			sources,
			format,
		}) => run_check(&args, docs_root, &source_roots(source_root, sources), *format),
		Some(Commands::List { docs_root }) => run_list(&args, docs_root),
		Some(Commands::Init) => run_init(&args),
		None => {
			eprintln!("No subcommand specified. Run `snip --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<SnipError>() {
			Ok(snip_err) => {
				let report: miette::Report = (*snip_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `SNIP_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env("SNIP_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_ansi(use_color)
				.with_target(false),
		)
		.try_init();
}

fn source_roots(first: &Path, rest: &[PathBuf]) -> Vec<PathBuf> {
	std::iter::once(first.to_path_buf())
		.chain(rest.iter().cloned())
		.collect()
}

fn load_config(args: &SnipCli) -> Result<SnipConfig, AnyError> {
	let config = match &args.config {
		Some(path) => SnipConfig::load_file(path)?,
		None => SnipConfig::load(&std::env::current_dir()?)?.unwrap_or_default(),
	};

	tracing::debug!(sentinel = %config.sentinel, "configuration ready");
	Ok(config)
}

fn load(
	args: &SnipCli,
	docs_root: &Path,
	out_dir: Option<&Path>,
) -> Result<(SnipConfig, Project), AnyError> {
	let config = load_config(args)?;
	let mut options = ScanOptions::from_config(&config)?;
	if let Some(out_dir) = out_dir {
		options = options.excluding(out_dir);
	}

	let project = load_project(docs_root, &config, &options)?;
	Ok((config, project))
}

#[derive(Debug, Clone, Copy)]
struct RenderOptions {
	check: bool,
	diff: bool,
	force: bool,
}

fn run_render(
	args: &SnipCli,
	docs_root: &Path,
	source_roots: &[PathBuf],
	out_dir: &Path,
	options: RenderOptions,
) -> Result<(), AnyError> {
	let (config, project) = load(args, docs_root, Some(out_dir))?;
	let locator = build_locator(source_roots, &config)?;
	let report = project.validate(&locator)?;

	if !report.is_ok() {
		print_report(&report);
		if !options.force {
			eprintln!("Nothing was written. Use `--force` to write anyway.");
			process::exit(1);
		}
	}

	let rendered = project.assemble(&locator);

	if options.check {
		let stale = find_stale_outputs(out_dir, &rendered)?;
		if stale.is_empty() {
			println!(
				"Check passed: all {} document(s) in {} are up to date.",
				rendered.len(),
				out_dir.display()
			);
			return Ok(());
		}

		eprintln!("Check failed: {} output file(s) are out of date.", stale.len());
		for entry in &stale {
			let status = if entry.current.is_some() {
				"stale"
			} else {
				"missing"
			};
			eprintln!(
				"  {} [{}]",
				out_dir.join(&entry.path).display(),
				colored!(status, yellow)
			);

			if options.diff {
				print_diff(entry.current.as_deref().unwrap_or_default(), &entry.expected);
			}
		}
		process::exit(1);
	}

	let written = write_rendered(out_dir, &rendered)?;
	println!(
		"Rendered {written} document(s) with {} directive(s) into {}.",
		project.directive_count(),
		out_dir.display()
	);

	// Forced output still fails the run.
	if !report.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn run_check(
	args: &SnipCli,
	docs_root: &Path,
	source_roots: &[PathBuf],
	format: OutputFormat,
) -> Result<(), AnyError> {
	let (config, project) = load(args, docs_root, None)?;
	let locator = build_locator(source_roots, &config)?;
	let report = project.validate(&locator)?;

	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"ok": report.is_ok(),
				"documents": project.documents.len(),
				"directives": project.directive_count(),
				"errors": report,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for entry in report.iter() {
				println!(
					"::error file={},line={},title={}::{}",
					docs_root.join(&entry.document).display(),
					entry.line,
					entry.kind,
					entry.detail
				);
			}
			eprintln!("{}", report_summary(&report, &project));
		}
		OutputFormat::Text => {
			if report.is_ok() {
				println!("{}", report_summary(&report, &project));
			} else {
				eprintln!("Check failed.");
				eprintln!();
				print_report(&report);
			}
		}
	}

	if !report.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn run_list(args: &SnipCli, docs_root: &Path) -> Result<(), AnyError> {
	let (_, project) = load(args, docs_root, None)?;

	let mut listed = 0;
	for parsed in &project.documents {
		let directives = parsed.document.directives();
		if directives.is_empty() && parsed.diagnostics.is_empty() {
			continue;
		}

		if listed > 0 {
			println!();
		}
		listed += 1;

		println!("{}", colored!(parsed.document.path.display(), bold));
		for directive in directives {
			println!("  {:>4}  {}", directive.line, directive.reference());
		}
		for diagnostic in &parsed.diagnostics {
			println!(
				"  {:>4}  {} {}",
				diagnostic.line,
				colored!("malformed:", yellow),
				diagnostic.reason
			);
		}
	}

	if listed == 0 {
		println!("No directives found.");
		return Ok(());
	}

	println!(
		"\n{} directive(s) in {} document(s)",
		project.directive_count(),
		listed
	);

	Ok(())
}

const SAMPLE_CONFIG: &str = r#"# snip configuration

# Token that starts a directive line.
# sentinel = "@snip"

# Extra source roots, relative to this file. Searched after the roots given
# on the command line.
# [sources]
# roots = ["../src"]

# Which files under the docs root are documents.
# [documents]
# patterns = ["**/*.md", "**/*.markdown"]
# exclude = ["drafts/"]

# Validate cross-document links, images and reference definitions.
# [links]
# check = true

# Comment syntax for region markers, per file extension.
# [comments]
# zig = "//"
# vue = ["<!--", "-->"]
"#;

fn run_init(args: &SnipCli) -> Result<(), AnyError> {
	let config_path = args
		.config
		.clone()
		.unwrap_or_else(|| PathBuf::from("snip.toml"));

	if config_path.exists() {
		println!("Config file already exists: {}", config_path.display());
		return Ok(());
	}

	if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());

	println!();
	println!("Next steps:");
	println!("  1. Mark a region in a source file:");
	println!("     // getBooking:start");
	println!("     // getBooking:end");
	println!("  2. Reference it from a markdown document:");
	println!("     @snip \"booking/BookingTools.java:getBooking\"");
	println!("  3. Run `snip render docs src out` to assemble the docs");

	Ok(())
}

/// Print every entry grouped by document, one line per error.
fn print_report(report: &ValidationReport) {
	for (document, entries) in report.by_document() {
		eprintln!("{}", colored!(document.display(), bold));
		for entry in entries {
			eprintln!(
				"  {}:{}: {} {}",
				document.display(),
				entry.line,
				colored!(format!("{}:", entry.kind), red),
				entry.detail
			);
		}
	}

	eprintln!();
	eprintln!(
		"{} error(s) in {} document(s)",
		report.len(),
		report.document_count()
	);
}

fn report_summary(report: &ValidationReport, project: &Project) -> String {
	if report.is_ok() {
		return format!(
			"Check passed: {} directive(s) in {} document(s) resolved.",
			project.directive_count(),
			project.documents.len()
		);
	}

	format!(
		"Check failed: {} error(s) in {} document(s).",
		report.len(),
		report.document_count()
	)
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
