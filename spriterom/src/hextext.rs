//! Line tokenizer for hand-written hex text files.
//!
//! Palette files and `hex2bin` inputs share one convention: everything after
//! `//` is a comment, tokens are separated by any run of spaces or tabs and
//! each token is a base-16 number.

use std::num::ParseIntError;

const LINE_COMMENT: &str = "//";

/// Remove a trailing `//` comment from a line
pub fn strip_comment(line: &str) -> &str {
    match line.find(LINE_COMMENT) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Iterate over the non-blank lines of `text` as `(line_number, tokens)`.
///
/// Line numbers are 1-based so they can be quoted in warnings.
pub fn token_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let tokens: Vec<&str> = strip_comment(line).split_whitespace().collect();
        (!tokens.is_empty()).then_some((i + 1, tokens))
    })
}

fn digits(token: &str) -> &str {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token)
}

/// Parse one token as a byte
pub fn parse_byte(token: &str) -> Result<u8, ParseIntError> {
    u8::from_str_radix(digits(token), 16)
}

/// Parse every token of a line as a byte, failing on the first bad token
pub fn parse_bytes(tokens: &[&str]) -> Result<Vec<u8>, ParseIntError> {
    tokens.iter().map(|token| parse_byte(token)).collect()
}
