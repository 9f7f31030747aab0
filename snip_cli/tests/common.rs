#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;
use snip_core::AnyResult;
use tempfile::TempDir;

pub const BOOKING_SOURCE: &str = "package booking;

class BookingTools {
    // getBooking:start
    public Booking getBooking(String number) {
        return repository.find(number);
    }
    // getBooking:end
}
";

pub const INDEX_DOC: &str = "# Home

```java
@snip \"booking/BookingTools.java:getBooking\"
```

See [the guide](guide/setup.md).
";

pub const RENDERED_INDEX: &str = "# Home

```java
public Booking getBooking(String number) {
    return repository.find(number);
}
```

See [the guide](guide/setup.md).
";

pub fn snip_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("snip"));
	cmd.env("NO_COLOR", "1").env_remove("SNIP_LOG");
	cmd
}

pub fn write(root: &Path, relative: &str, content: &str) -> AnyResult<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;
	Ok(())
}

/// A project with `docs/` and `src/` that renders cleanly.
pub fn project() -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	write(tmp.path(), "src/booking/BookingTools.java", BOOKING_SOURCE)?;
	write(tmp.path(), "docs/index.md", INDEX_DOC)?;
	write(
		tmp.path(),
		"docs/guide/setup.md",
		"# Setup\n\n@snip \"booking/BookingTools.java:1\"\n\n[home](../index.md)\n",
	)?;
	Ok(tmp)
}
