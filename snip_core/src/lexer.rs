use std::iter::Peekable;
use std::ops::Range;

use logos::Logos;
use logos::SpannedIter;
use snailquote::unescape;

use crate::LineRange;
use crate::RegionSelector;

/// Raw tokens produced by logos for the text following the sentinel on a
/// directive line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[regex(r"[ \t]+")]
	Whitespace,
	#[regex(r#""([^"\\]|\\.)*""#)]
	QuotedString,
	#[token(":")]
	Colon,
	#[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
	Tag,
	#[regex(r"[0-9]+(-[0-9]*)?")]
	Lines,
}

type TokenStream<'a> = Peekable<SpannedIter<'a, RawToken>>;

/// The arguments of a directive line once the sentinel has been stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveArgs {
	pub path: String,
	pub region: Option<RegionSelector>,
}

/// Lex a single line.
///
/// Returns `None` when the line is not a directive at all, and `Some(Err)`
/// with a human readable reason when it starts with the sentinel but the
/// rest of the line is malformed.
pub(crate) fn lex_directive(line: &str, sentinel: &str) -> Option<Result<DirectiveArgs, String>> {
	let rest = line.trim_start().strip_prefix(sentinel)?;

	// `@snippet` is prose, not a malformed `@snip`.
	if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
		return None;
	}

	Some(lex_arguments(rest))
}

fn lex_arguments(source: &str) -> Result<DirectiveArgs, String> {
	let mut iter: TokenStream<'_> = RawToken::lexer(source).spanned().peekable();

	skip_whitespace(&mut iter);

	let quoted = match iter.next() {
		None => return Err("missing source path".to_string()),
		Some((Ok(RawToken::QuotedString), span)) => &source[span],
		Some((Err(()), span)) if source[span.start..].starts_with('"') => {
			return Err("unterminated quote in source path".to_string());
		}
		Some((_, span)) => {
			return Err(format!(
				"source path must be double-quoted, found `{}`",
				remainder(source, &span)
			));
		}
	};

	let unquoted = unescape(quoted).map_err(|e| format!("invalid escape in source path: {e}"))?;
	let (path, mut region) = split_inline_region(&unquoted)?;

	if path.is_empty() {
		return Err("empty source path".to_string());
	}

	if let Some((Ok(RawToken::Colon), _)) = iter.peek() {
		iter.next();
		if region.is_some() {
			return Err("region given both inside and after the quoted path".to_string());
		}

		region = match iter.next() {
			Some((Ok(RawToken::Tag | RawToken::Lines), span)) => Some(parse_selector(&source[span])?),
			Some((Ok(RawToken::Whitespace), _)) | None => {
				return Err("empty region after `:`".to_string());
			}
			Some((_, span)) => {
				return Err(format!("invalid region `{}`", remainder(source, &span)));
			}
		};
	}

	skip_whitespace(&mut iter);

	if let Some((_, span)) = iter.next() {
		return Err(format!(
			"unexpected `{}` after source path",
			remainder(source, &span)
		));
	}

	Ok(DirectiveArgs {
		path: path.to_string(),
		region,
	})
}

fn skip_whitespace(iter: &mut TokenStream<'_>) {
	while let Some((Ok(RawToken::Whitespace), _)) = iter.peek() {
		iter.next();
	}
}

fn remainder<'a>(source: &'a str, span: &Range<usize>) -> &'a str {
	source[span.start..].trim_end()
}

/// Split `path:region` written inside the quotes. The region is the text
/// after the last `:`; a suffix containing a path separator belongs to the
/// path.
fn split_inline_region(unquoted: &str) -> Result<(&str, Option<RegionSelector>), String> {
	let Some((path, region)) = unquoted.rsplit_once(':') else {
		return Ok((unquoted, None));
	};

	if region.contains(['/', '\\']) {
		return Ok((unquoted, None));
	}

	if region.is_empty() {
		return Err("empty region after `:`".to_string());
	}

	Ok((path, Some(parse_selector(region)?)))
}

/// Parse a tag name or a line range.
pub(crate) fn parse_selector(text: &str) -> Result<RegionSelector, String> {
	if text.starts_with(|c: char| c.is_ascii_digit()) {
		return parse_line_range(text).map(RegionSelector::Lines);
	}

	if is_tag_name(text) {
		return Ok(RegionSelector::Tag(text.to_string()));
	}

	Err(format!("invalid region `{text}`"))
}

/// Whether `text` is a valid region tag name.
pub(crate) fn is_tag_name(text: &str) -> bool {
	let mut chars = text.chars();
	chars
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_line_range(text: &str) -> Result<LineRange, String> {
	let invalid = || format!("invalid line range `{text}`");
	let parse = |value: &str| value.parse::<usize>().map_err(|_| invalid());

	let range = match text.split_once('-') {
		Some((start, "")) => {
			LineRange {
				start: parse(start)?,
				end: None,
			}
		}
		Some((start, end)) => {
			LineRange {
				start: parse(start)?,
				end: Some(parse(end)?),
			}
		}
		None => {
			let line = parse(text)?;
			LineRange {
				start: line,
				end: Some(line),
			}
		}
	};

	if range.start == 0 {
		return Err(format!("invalid line range `{text}`: lines start at 1"));
	}

	if range.end.is_some_and(|end| end < range.start) {
		return Err(format!("invalid line range `{text}`: end is before start"));
	}

	Ok(range)
}
