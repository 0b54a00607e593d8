//! Text sanitization for extracted article fields
//!
//! Element text from the document tree already has entities decoded; what is
//! left is invisible characters and irregular whitespace from the page markup.

use crate::utils::normalize_whitespace;

/// Clean one extracted text fragment into a single trimmed line
///
/// Applies, in order: zero-width removal, control character removal, and
/// whitespace collapsing (newlines included).
///
/// # Examples
///
/// ```
/// use kabar::parser::sanitize::sanitize_text;
///
/// let dirty = "  Jakarta,\u{200B} KOMPAS.com\n\n  - Harga  emas ";
/// assert_eq!(sanitize_text(dirty), "Jakarta, KOMPAS.com - Harga emas");
/// ```
pub fn sanitize_text(text: &str) -> String {
    let result = remove_zero_width(text);
    let result = remove_control_chars(&result);
    normalize_whitespace(&result)
}

/// Remove zero-width spaces and similar invisible characters
///
/// Removes U+200B..=U+200F, U+2028..=U+202F and the byte order mark.
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2028}'..='\u{202F}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Check if text contains meaningful content
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}
