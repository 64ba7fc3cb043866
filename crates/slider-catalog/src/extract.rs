//! Locating the catalog JSON inside its script wrapper.
//!
//! The published document is a JavaScript assignment of the form
//! `var json_file = {...};`. The payload runs from the first `{` through
//! the closing brace of the LAST `};` in the document.
//!
//! This is textual matching, not a lexer. It breaks if the wrapper holds a
//! stray `{` before the payload or a `};` inside a string literal after it.

use crate::error::ExtractError;

const START_DELIMITER: u8 = b'{';
const END_DELIMITER: &[u8] = b"};";

/// Return the embedded JSON object, closing brace included, semicolon excluded.
pub fn extract_json_object(document: &[u8]) -> Result<&[u8], ExtractError> {
    let start = document.iter().position(|&b| b == START_DELIMITER);
    let end = document
        .windows(END_DELIMITER.len())
        .rposition(|window| window == END_DELIMITER);

    let start = start.ok_or(ExtractError::StartNotFound)?;
    let end = end.ok_or(ExtractError::EndNotFound)?;

    if end < start {
        return Err(ExtractError::EndBeforeStart { start, end });
    }

    Ok(&document[start..=end])
}
