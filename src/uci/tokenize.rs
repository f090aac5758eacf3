//! Line tokenization for the UCI protocol.
//!
//! UCI commands are whitespace-delimited; runs of arbitrary whitespace
//! (spaces, tabs) separate tokens and carry no meaning of their own.

/// Split a protocol line into whitespace-delimited tokens.
///
/// Runs of whitespace collapse, so no empty tokens are ever produced; an
/// empty or all-whitespace line yields an empty vector.
#[must_use]
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Check whether a token is a non-negative decimal integer literal.
///
/// Accepts only non-empty runs of ASCII digits: no sign, no whitespace,
/// no radix prefixes.
#[must_use]
pub fn is_integer(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
