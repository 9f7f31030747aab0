mod common;

use predicates::prelude::PredicateBooleanExt;
use similar_asserts::assert_eq;
use snip_core::AnyEmptyResult;

#[test]
fn render_writes_documents() -> AnyEmptyResult {
	let tmp = common::project()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out"])
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Rendered 2 document(s) with 2 directive(s)",
		));

	let index = std::fs::read_to_string(tmp.path().join("out/index.md"))?;
	assert_eq!(index, common::RENDERED_INDEX);

	let setup = std::fs::read_to_string(tmp.path().join("out/guide/setup.md"))?;
	assert_eq!(setup, "# Setup\n\npackage booking;\n\n[home](../index.md)\n");

	Ok(())
}

#[test]
fn render_fails_without_writing() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(
		tmp.path(),
		"docs/broken.md",
		"# Broken\n\n@snip \"booking/Nonexistent.java:getBooking\"\n@snip \"booking/BookingTools.java:getBooking\"\n",
	)?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out"])
		.assert()
		.code(1)
		.stderr(predicates::str::contains("broken.md:3: file not found:"))
		.stderr(predicates::str::contains("booking/Nonexistent.java"))
		.stderr(predicates::str::contains("1 error(s) in 1 document(s)"))
		.stderr(predicates::str::contains("Nothing was written"));

	assert!(!tmp.path().join("out").exists());

	Ok(())
}

#[test]
fn render_force_writes_despite_failures() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(
		tmp.path(),
		"docs/broken.md",
		"@snip \"booking/BookingTools.java:missing\"\n",
	)?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out", "--force"])
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Rendered 3 document(s)"))
		.stderr(predicates::str::contains("region not found"));

	let broken = std::fs::read_to_string(tmp.path().join("out/broken.md"))?;
	assert_eq!(broken, "@snip \"booking/BookingTools.java:missing\"\n");

	Ok(())
}

#[test]
fn render_check_detects_stale_output() -> AnyEmptyResult {
	let tmp = common::project()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out", "--check"])
		.assert()
		.code(1)
		.stderr(predicates::str::contains("[missing]"));

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out"])
		.assert()
		.success();

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out", "--check"])
		.assert()
		.success()
		.stdout(predicates::str::contains("up to date"));

	std::fs::write(tmp.path().join("out/index.md"), "edited by hand\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out", "--check", "--diff"])
		.assert()
		.code(1)
		.stderr(predicates::str::contains("[stale]"))
		.stderr(predicates::str::contains("-edited by hand"))
		.stderr(predicates::str::contains("+# Home"));

	Ok(())
}

#[test]
fn render_skips_output_inside_docs_root() -> AnyEmptyResult {
	let tmp = common::project()?;

	for _ in 0..2 {
		common::snip_cmd()
			.current_dir(tmp.path())
			.args(["render", "docs", "src", "docs/_site"])
			.assert()
			.success()
			.stdout(predicates::str::contains("Rendered 2 document(s)"));
	}

	assert!(!tmp.path().join("docs/_site/_site").exists());

	Ok(())
}

#[test]
fn render_rejects_docs_root_as_output() -> AnyEmptyResult {
	let tmp = common::project()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "docs"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("must not be the docs root"));

	let index = std::fs::read_to_string(tmp.path().join("docs/index.md"))?;
	assert_eq!(index, common::INDEX_DOC);

	Ok(())
}

#[test]
fn render_preserves_crlf_documents() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(tmp.path(), "docs/windows.md", "# Windows\r\n\r\nplain text\r\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out"])
		.assert()
		.success();

	let windows = std::fs::read_to_string(tmp.path().join("out/windows.md"))?;
	assert_eq!(windows, "# Windows\r\n\r\nplain text\r\n");

	Ok(())
}

#[test]
fn render_with_additional_source_roots() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(
		tmp.path(),
		"shared/setup.sh",
		"#!/bin/sh\n# install:start\ncargo install snip\n# install:end\n",
	)?;
	common::write(
		tmp.path(),
		"docs/install.md",
		"```sh\n@snip \"setup.sh:install\"\n```\n",
	)?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out", "--source", "shared"])
		.assert()
		.success();

	let install = std::fs::read_to_string(tmp.path().join("out/install.md"))?;
	assert_eq!(install, "```sh\ncargo install snip\n```\n");

	Ok(())
}

#[test]
fn render_with_config_file() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(
		tmp.path(),
		"config/snip.toml",
		"sentinel = \"!include\"\n\n[sources]\nroots = [\"../shared\"]\n",
	)?;
	common::write(tmp.path(), "shared/greeting.txt", "hello\n")?;
	common::write(tmp.path(), "docs/greeting.md", "!include \"greeting.txt\"\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out", "--config", "config/snip.toml"])
		.assert()
		.success();

	let greeting = std::fs::read_to_string(tmp.path().join("out/greeting.md"))?;
	assert_eq!(greeting, "hello\n");

	// `@snip` is plain text with a custom sentinel.
	let index = std::fs::read_to_string(tmp.path().join("out/index.md"))?;
	assert_eq!(index, common::INDEX_DOC);

	Ok(())
}

#[test]
fn render_reports_fatal_errors() -> AnyEmptyResult {
	let tmp = common::project()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "missing-src", "out"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("missing-src").and(predicates::str::contains("does not exist")));

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "missing-docs", "src", "out"])
		.assert()
		.code(2);

	common::write(tmp.path(), "snip.toml", "sentinel = \"\"\n")?;
	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["render", "docs", "src", "out"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("sentinel"));

	Ok(())
}
