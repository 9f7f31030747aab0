use std::path::Path;

use crate::Block;
use crate::Directive;
use crate::Document;
use crate::FragmentLocator;
use crate::RenderedDocument;
use crate::parser::line_ending;

/// Replace every directive in `document` with the text the locator returns
/// for it.
///
/// Blocks are emitted in input order. Fence lines and literal text are
/// copied verbatim. A directive that cannot be resolved is left in place
/// unchanged; the [`validator`](crate::validate_directives) is responsible
/// for reporting it.
pub fn assemble(document: &Document, locator: &FragmentLocator) -> RenderedDocument {
	let mut content = String::new();
	render_blocks(&document.path, &document.blocks, locator, &mut content);

	RenderedDocument {
		path: document.path.clone(),
		content,
	}
}

fn render_blocks(path: &Path, blocks: &[Block], locator: &FragmentLocator, out: &mut String) {
	for block in blocks {
		match block {
			Block::Literal(literal) => out.push_str(&literal.text),
			Block::Directive(directive) => render_directive(path, directive, locator, out),
			Block::Fence(fence) => {
				out.push_str(&fence.opening);
				render_blocks(path, &fence.body, locator, out);
				if let Some(closing) = &fence.closing {
					out.push_str(closing);
				}
			}
		}
	}
}

fn render_directive(path: &Path, directive: &Directive, locator: &FragmentLocator, out: &mut String) {
	match locator.resolve(directive) {
		Ok(text) => {
			write_fragment(out, &directive.indent, &text, line_ending(&directive.raw));
		}
		Err(error) => {
			tracing::warn!(
				document = %path.display(),
				line = directive.line,
				%error,
				"leaving unresolved directive in place"
			);
			out.push_str(&directive.raw);
		}
	}
}

/// Write `text` with every non-empty line prefixed by `indent`.
///
/// Lines are joined with the directive's own line ending, so fragments in a
/// CRLF document use CRLF. The output ends with a line ending only when the
/// directive line did. `text` is a `\n`-joined list of lines, so a trailing
/// `\n` is a trailing blank line and is written out.
fn write_fragment(out: &mut String, indent: &str, text: &str, ending: &str) {
	if text.is_empty() {
		return;
	}

	let separator = if ending.is_empty() { "\n" } else { ending };
	let mut lines = text.split('\n').peekable();

	while let Some(line) = lines.next() {
		if !line.is_empty() {
			out.push_str(indent);
			out.push_str(line);
		}

		out.push_str(if lines.peek().is_some() { separator } else { ending });
	}
}
