use std::path::PathBuf;

use serde::Serialize;

use crate::Block;
use crate::Directive;
use crate::Document;
use crate::Fence;
use crate::Literal;
use crate::SnipError;
use crate::SnipResult;
use crate::lexer::lex_directive;

/// A malformed directive line found while parsing. The line is kept as
/// literal text in the parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
	/// 1-indexed line number.
	pub line: usize,
	/// Why the line was rejected.
	pub reason: String,
	/// The offending line without its newline.
	pub text: String,
}

/// Parse a document and fail on the first malformed directive line.
pub fn parse(
	path: impl Into<PathBuf>,
	content: impl AsRef<str>,
	sentinel: &str,
) -> SnipResult<Document> {
	let (document, diagnostics) = parse_with_diagnostics(path, content, sentinel);

	if let Some(diagnostic) = diagnostics.into_iter().next() {
		return Err(SnipError::Parse {
			line: diagnostic.line,
			reason: diagnostic.reason,
		});
	}

	Ok(document)
}

/// Parse a document, collecting malformed directive lines as diagnostics
/// instead of failing. Malformed lines are kept verbatim as literal text.
pub fn parse_with_diagnostics(
	path: impl Into<PathBuf>,
	content: impl AsRef<str>,
	sentinel: &str,
) -> (Document, Vec<ParseDiagnostic>) {
	let mut builder = BlockBuilder::default();
	let mut fence: Option<FenceBuilder> = None;
	let mut diagnostics = Vec::new();

	// Raw lines keep their terminator so CRLF documents round-trip.
	for (index, raw_line) in content.as_ref().split_inclusive('\n').enumerate() {
		let line_number = index + 1;
		let line = strip_line_ending(raw_line);

		if fence
			.as_ref()
			.is_some_and(|open| open.marker.is_closed_by(line))
		{
			if let Some(open) = fence.take() {
				builder.blocks.push(open.finish(Some(raw_line.to_string())));
			}
			continue;
		}

		if fence.is_none() {
			if let Some(marker) = FenceMarker::opening(line) {
				builder.flush();
				fence = Some(FenceBuilder {
					opening: raw_line.to_string(),
					marker,
					line: line_number,
					body: BlockBuilder::default(),
				});
				continue;
			}
		}

		let target = match &mut fence {
			Some(open) => &mut open.body,
			None => &mut builder,
		};

		match lex_directive(line, sentinel) {
			Some(Ok(args)) => {
				target.flush();
				target.blocks.push(Block::Directive(Directive {
					source_path: args.path,
					region: args.region,
					indent: leading_whitespace(line).to_string(),
					raw: raw_line.to_string(),
					line: line_number,
				}));
			}
			Some(Err(reason)) => {
				diagnostics.push(ParseDiagnostic {
					line: line_number,
					reason,
					text: line.to_string(),
				});
				target.push_literal(raw_line, line_number);
			}
			None => target.push_literal(raw_line, line_number),
		}
	}

	// A fence left open runs to the end of the document.
	if let Some(open) = fence.take() {
		builder.blocks.push(open.finish(None));
	}
	builder.flush();

	(Document::new(path, builder.blocks), diagnostics)
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// The terminator of `raw_line`: `"\r\n"`, `"\n"` or `""` for a final line
/// without one.
pub fn line_ending(raw_line: &str) -> &str {
	if raw_line.ends_with("\r\n") {
		"\r\n"
	} else if raw_line.ends_with('\n') {
		"\n"
	} else {
		""
	}
}

fn strip_line_ending(raw_line: &str) -> &str {
	&raw_line[..raw_line.len() - line_ending(raw_line).len()]
}

fn leading_whitespace(line: &str) -> &str {
	&line[..line.len() - line.trim_start().len()]
}

/// Accumulates literal lines until a directive or fence boundary flushes
/// them into a block.
#[derive(Default)]
struct BlockBuilder {
	blocks: Vec<Block>,
	literal: String,
	literal_line: usize,
}

impl BlockBuilder {
	fn push_literal(&mut self, raw_line: &str, line_number: usize) {
		if self.literal.is_empty() {
			self.literal_line = line_number;
		}
		self.literal.push_str(raw_line);
	}

	fn flush(&mut self) {
		if self.literal.is_empty() {
			return;
		}

		self.blocks.push(Block::Literal(Literal {
			text: std::mem::take(&mut self.literal),
			line: self.literal_line,
		}));
	}
}

struct FenceBuilder {
	opening: String,
	marker: FenceMarker,
	line: usize,
	body: BlockBuilder,
}

impl FenceBuilder {
	fn finish(mut self, closing: Option<String>) -> Block {
		self.body.flush();
		Block::Fence(Fence {
			opening: self.opening,
			body: self.body.blocks,
			closing,
			line: self.line,
		})
	}
}

/// The character and length of an opening code fence.
#[derive(Debug, Clone, Copy)]
struct FenceMarker {
	fence_char: char,
	fence_len: usize,
}

impl FenceMarker {
	/// Detect an opening fence: 3+ backticks or tildes. A backtick fence's
	/// info string may not contain backticks.
	fn opening(line: &str) -> Option<Self> {
		let stripped = line.trim_start();
		let backtick_len = stripped.chars().take_while(|&c| c == '`').count();
		let tilde_len = stripped.chars().take_while(|&c| c == '~').count();

		if backtick_len >= 3 {
			let info_string = &stripped[backtick_len..];
			if info_string.contains('`') {
				return None;
			}
			return Some(Self {
				fence_char: '`',
				fence_len: backtick_len,
			});
		}

		if tilde_len >= 3 {
			return Some(Self {
				fence_char: '~',
				fence_len: tilde_len,
			});
		}

		None
	}

	/// Closing fence: same char, at least the same length, no info string.
	fn is_closed_by(&self, line: &str) -> bool {
		let stripped = line.trim_start();
		let closing_len = stripped
			.chars()
			.take_while(|&c| c == self.fence_char)
			.count();
		let after_fence = &stripped[closing_len * self.fence_char.len_utf8()..];

		closing_len >= self.fence_len && after_fence.trim().is_empty()
	}
}
