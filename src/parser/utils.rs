//! Label escaping for Newick output.
//!
//! Leaf identifiers coming from the strain store are usually numeric ids,
//! but support labels written as `100/95` and names imported from flat files
//! can contain characters with a meaning in Newick, so they are quoted when
//! written.

/// Characters that terminate an unquoted Newick label.
const SPECIAL_CHARS: &[char] = &[
    ' ', ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\'',
];

/// Checks whether `label` can be written verbatim as an unquoted Newick label.
///
/// # Examples
/// ```
/// # use fungphy::parser::utils::is_plain_label;
/// assert!(is_plain_label("1042"));
/// assert!(is_plain_label("Aspergillus_niger"));
/// assert!(!is_plain_label("CBS 513.88"));
/// assert!(!is_plain_label(""));
/// ```
pub fn is_plain_label(label: &str) -> bool {
    !label.is_empty() && !label.contains(SPECIAL_CHARS)
}

/// Escapes a label for safe use in Newick strings.
///
/// Labels containing special characters are wrapped in single quotes, with
/// internal single quotes doubled. Plain labels are returned as-is.
///
/// # Examples
/// ```
/// # use fungphy::parser::utils::escape_label;
/// assert_eq!(escape_label("1042"), "1042");
/// assert_eq!(escape_label("100/95"), "100/95");
/// assert_eq!(escape_label("CBS 513.88"), "'CBS 513.88'");
/// assert_eq!(escape_label("O'Donnell"), "'O''Donnell'");
/// ```
pub fn escape_label(label: &str) -> String {
    if is_plain_label(label) {
        label.to_string()
    } else {
        format!("'{}'", label.replace('\'', "''"))
    }
}
