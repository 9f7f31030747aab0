use crate::Document;
use crate::DocumentSet;
use crate::ErrorKind;
use crate::FragmentLocator;
use crate::ParseDiagnostic;
use crate::ReportEntry;
use crate::SnipResult;
use crate::links::extract_links;

/// Attempt to resolve every directive in `document`, returning one entry
/// per failure. Processing never stops at the first failure.
pub fn validate_directives(document: &Document, locator: &FragmentLocator) -> Vec<ReportEntry> {
	document
		.directives()
		.into_iter()
		.filter_map(|directive| {
			let error = locator.resolve(directive).err()?;
			Some(ReportEntry {
				document: document.path.clone(),
				line: directive.line,
				kind: error.kind(),
				detail: error.to_string(),
			})
		})
		.collect()
}

/// Check every internal link, image, and reference definition in
/// `document` against `documents`.
pub fn validate_links(document: &Document, documents: &DocumentSet) -> SnipResult<Vec<ReportEntry>> {
	let links = extract_links(&document.source())?;

	Ok(links
		.into_iter()
		.filter_map(|link| {
			let detail = documents.check_link(&document.path, &link.url).err()?;
			Some(ReportEntry {
				document: document.path.clone(),
				line: link.line,
				kind: ErrorKind::DanglingLink,
				detail,
			})
		})
		.collect())
}

/// Directive and link validation for one document.
pub fn validate_document(
	document: &Document,
	locator: &FragmentLocator,
	documents: Option<&DocumentSet>,
) -> SnipResult<Vec<ReportEntry>> {
	let mut entries = validate_directives(document, locator);

	if let Some(documents) = documents {
		entries.extend(validate_links(document, documents)?);
	}

	Ok(entries)
}

/// Convert parser diagnostics for `document` into report entries.
pub fn parse_entries(document: &Document, diagnostics: &[ParseDiagnostic]) -> Vec<ReportEntry> {
	diagnostics
		.iter()
		.map(|diagnostic| {
			ReportEntry {
				document: document.path.clone(),
				line: diagnostic.line,
				kind: ErrorKind::Parse,
				detail: format!("{}: `{}`", diagnostic.reason, diagnostic.text.trim()),
			}
		})
		.collect()
}
