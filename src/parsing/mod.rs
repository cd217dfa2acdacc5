//! Completion output parsing.
//!
//! Turns raw completion text into the shapes the pipeline stores: a trimmed
//! string, or an ordered list of labels.

/// Double-quote characters removed from list responses before splitting.
/// Apostrophes are kept so labels like "Xing's Economy" survive.
const QUOTE_CHARS: [char; 3] = ['"', '\u{201c}', '\u{201d}'];

/// Trims leading and trailing whitespace.
#[must_use]
pub fn parse_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parses a comma-separated list.
///
/// Strips double-quote characters, splits on commas, trims each element, and drops
/// empty ones. Order is preserved.
///
/// `requested_max` is only the bound that was asked of the model. The result
/// is never truncated to it; a response with more elements is returned whole.
///
/// # Examples
///
/// ```
/// use wikisynth::parsing::parse_list;
///
/// assert_eq!(parse_list(r#""A","B","C""#, 5), ["A", "B", "C"]);
/// assert_eq!(parse_list(r#""A","B","C","D""#, 2).len(), 4);
/// ```
#[must_use]
pub fn parse_list(raw: &str, requested_max: usize) -> Vec<String> {
    let cleaned: String = raw.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    let items: Vec<String> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    if items.len() > requested_max {
        tracing::debug!(
            requested_max,
            returned = items.len(),
            "list response exceeds requested bound"
        );
    }

    items
}
