mod common;

use clap::Parser;
use rstest::rstest;
use serde_json::Value;
use snip_cli::Commands;
use snip_cli::OutputFormat;
use snip_cli::SnipCli;
use snip_core::AnyEmptyResult;

#[test]
fn check_passes_when_references_resolve() -> AnyEmptyResult {
	let tmp = common::project()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["check", "docs", "src"])
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: 2 directive(s) in 2 document(s) resolved.",
		));

	assert!(!tmp.path().join("out").exists());

	Ok(())
}

#[test]
fn check_groups_failures_by_document() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(
		tmp.path(),
		"docs/api.md",
		"@snip \"booking/BookingTools.java:cancel\"\n\n[setup](guide/install.md)\n",
	)?;
	common::write(tmp.path(), "docs/zeta.md", "@snip booking\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["check", "docs", "src"])
		.assert()
		.code(1)
		.stderr(predicates::str::contains("api.md:1: region not found:"))
		.stderr(predicates::str::contains("api.md:3: dangling link:"))
		.stderr(predicates::str::contains("zeta.md:1: parse error:"))
		.stderr(predicates::str::contains("3 error(s) in 2 document(s)"));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(
		tmp.path(),
		"docs/broken.md",
		"@snip \"booking/Nonexistent.java:getBooking\"\n",
	)?;

	let assert = common::snip_cmd()
		.current_dir(tmp.path())
		.args(["check", "docs", "src", "--format", "json"])
		.assert()
		.code(1);

	let output: Value = serde_json::from_slice(&assert.get_output().stdout)?;
	assert_eq!(output["ok"], Value::Bool(false));
	assert_eq!(output["documents"], 3);
	assert_eq!(output["errors"][0]["document"], "broken.md");
	assert_eq!(output["errors"][0]["line"], 1);
	assert_eq!(output["errors"][0]["kind"], "file_not_found");

	Ok(())
}

#[test]
fn check_github_annotations() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(tmp.path(), "docs/broken.md", "\n[gone](gone.md)\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["check", "docs", "src", "--format", "github"])
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"::error file=docs/broken.md,line=2,title=dangling link::",
		));

	Ok(())
}

#[test]
fn check_without_link_validation() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(tmp.path(), "docs/broken.md", "[gone](gone.md)\n")?;
	common::write(tmp.path(), "snip.toml", "[links]\ncheck = false\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["check", "docs", "src"])
		.assert()
		.success();

	Ok(())
}

#[rstest]
#[case::default(&["snip", "check", "docs", "src"], 0)]
#[case::extra_sources(&["snip", "check", "docs", "src", "--source", "a", "--source", "b"], 2)]
fn parse_check_command(#[case] argv: &[&str], #[case] extra_sources: usize) {
	let cli = SnipCli::parse_from(argv);
	match cli.command {
		Some(Commands::Check {
			sources, format, ..
		}) => {
			assert_eq!(sources.len(), extra_sources);
			assert!(matches!(format, OutputFormat::Text));
		}
		_ => panic!("expected Check command"),
	}
}

#[test]
fn parse_render_flags() {
	let cli = SnipCli::parse_from(["snip", "render", "docs", "src", "out", "--check", "--diff"]);
	match cli.command {
		Some(Commands::Render {
			check, diff, force, ..
		}) => {
			assert!(check);
			assert!(diff);
			assert!(!force);
		}
		_ => panic!("expected Render command"),
	}

	assert!(SnipCli::try_parse_from(["snip", "render", "docs", "src", "out", "--diff"]).is_err());
	assert!(
		SnipCli::try_parse_from(["snip", "render", "docs", "src", "out", "--check", "--force"])
			.is_err()
	);
	assert!(SnipCli::try_parse_from(["snip", "render", "docs", "src"]).is_err());
}
