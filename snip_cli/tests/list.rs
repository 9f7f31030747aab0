mod common;

use predicates::prelude::PredicateBooleanExt;
use snip_core::AnyEmptyResult;

#[test]
fn list_shows_directives_per_document() -> AnyEmptyResult {
	let tmp = common::project()?;
	common::write(tmp.path(), "docs/plain.md", "# No directives here\n")?;
	common::write(tmp.path(), "docs/typo.md", "@snip booking\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["list", "docs"])
		.assert()
		.success()
		.stdout(predicates::str::contains("guide/setup.md\n     3  booking/BookingTools.java:1"))
		.stdout(predicates::str::contains("index.md\n     4  booking/BookingTools.java:getBooking"))
		.stdout(predicates::str::contains("typo.md\n     1  malformed:"))
		.stdout(predicates::str::contains("plain.md").not())
		.stdout(predicates::str::contains("2 directive(s) in 3 document(s)"));

	Ok(())
}

#[test]
fn list_without_directives() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "docs/readme.md", "# Readme\n")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["list", "docs"])
		.assert()
		.success()
		.stdout(predicates::str::contains("No directives found."));

	Ok(())
}
