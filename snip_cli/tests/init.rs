mod common;

use snip_core::AnyEmptyResult;
use snip_core::SnipConfig;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicates::str::contains("Created snip.toml"))
		.stdout(predicates::str::contains("Next steps:"));

	let config_path = tmp.path().join("snip.toml");
	let content = std::fs::read_to_string(&config_path)?;
	assert!(content.contains("[sources]"));
	assert!(content.contains("[comments]"));

	// The sample is valid and only holds defaults.
	let config = SnipConfig::load_file(&config_path)?;
	assert_eq!(config.sentinel, "@snip");

	Ok(())
}

#[test]
fn init_at_custom_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.args(["init", "--config", ".config/snip.toml"])
		.assert()
		.success();

	assert!(tmp.path().join(".config/snip.toml").is_file());

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config_path = tmp.path().join("snip.toml");
	std::fs::write(&config_path, "existing config")?;

	common::snip_cmd()
		.current_dir(tmp.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	let content = std::fs::read_to_string(&config_path)?;
	assert_eq!(content, "existing config");

	Ok(())
}
