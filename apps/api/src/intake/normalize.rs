/// Appended when extracted text is cut to the configured length.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Cleans text pulled out of a PDF: trims, collapses every whitespace run
/// (including line breaks) to a single space, and truncates to `max_chars`
/// characters followed by [`TRUNCATION_MARKER`].
pub fn normalize_pdf_text(raw: &str, max_chars: usize) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &collapsed[..cut]),
        None => collapsed,
    }
}
