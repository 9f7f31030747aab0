use std::path::Path;
use std::path::PathBuf;

use rstest::fixture;
use tempfile::TempDir;

use crate::CommentTable;
use crate::FragmentLocator;

pub(crate) const BOOKING_SOURCE: &str = "package booking;

public class BookingTools {

    // getBooking:start
    @Tool(\"Get booking details\")
    public Booking getBooking(String number) {
        return repository.find(number);
    }
    // getBooking:end

    // cancel:start
    @Tool(\"Cancel a booking\")
    public void cancel(String number) {
        // audit:start
        audit.log(number);
        // audit:end
        repository.cancel(number);
    }
    // cancel:end
}
";

/// A throwaway directory tree for source roots and docs roots.
pub(crate) struct Tree {
	dir: TempDir,
}

impl Tree {
	pub(crate) fn new() -> Self {
		Self {
			dir: tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create tempdir: {e}")),
		}
	}

	pub(crate) fn with_file(self, relative: &str, content: &str) -> Self {
		self.write(relative, content);
		self
	}

	pub(crate) fn write(&self, relative: &str, content: &str) {
		let path = self.dir.path().join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
		}
		std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {relative}: {e}"));
	}

	pub(crate) fn root(&self) -> &Path {
		self.dir.path()
	}

	pub(crate) fn path(&self, relative: &str) -> PathBuf {
		self.dir.path().join(relative)
	}

	pub(crate) fn locator(&self) -> FragmentLocator {
		FragmentLocator::new(vec![self.root().to_path_buf()], CommentTable::default())
	}
}

#[fixture]
pub(crate) fn booking_tree() -> Tree {
	Tree::new()
		.with_file("booking/BookingTools.java", BOOKING_SOURCE)
		.with_file(
			"Booking.src",
			"// fragmentA:start\nint x;\n// fragmentA:end\n",
		)
		.with_file(
			"web/index.html",
			"<body>\n  <!-- nav:start -->\n  <nav>home</nav>\n  <!-- nav:end -->\n</body>\n",
		)
		.with_file(
			"scripts/setup.py",
			"import os\n\ndef main():\n    # env:start\n    os.environ[\"MODE\"] = \"demo\"\n    # env:end\n",
		)
		.with_file("notes.txt", "intro\n# todo:start\n  - write docs\n# todo:end\n")
}

/// A locator with no source roots; every directive fails to resolve.
#[fixture]
pub(crate) fn empty_locator() -> FragmentLocator {
	FragmentLocator::new(Vec::new(), CommentTable::default())
}
