//! Charset presets and alphabet resolution for brute-force generation.

use crate::error::CrackError;

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Named presets, in the order they are listed by the CLI.
pub const PRESET_NAMES: [&str; 6] = ["MiniASCII", "lower", "upper", "letters", "alphanum", "all"];

/// Characters of a named preset, or None if `name` is not a preset (names are case-sensitive).
pub fn preset(name: &str) -> Option<String> {
    let chars = match name {
        "MiniASCII" => [LOWER, DIGITS].concat(),
        "lower" => LOWER.to_string(),
        "upper" => UPPER.to_string(),
        "letters" => [LOWER, UPPER].concat(),
        "alphanum" => [LOWER, UPPER, DIGITS].concat(),
        "all" => [LOWER, UPPER, DIGITS, PUNCTUATION].concat(),
        _ => return None,
    };
    Some(chars)
}

/// Resolve a charset spec to an ordered alphabet: a preset name, or the string itself used verbatim.
/// Duplicates in a literal are kept.
pub fn resolve_charset(spec: &str) -> Result<Vec<char>, CrackError> {
    let alphabet: Vec<char> = match preset(spec) {
        Some(chars) => chars.chars().collect(),
        None => spec.chars().collect(),
    };
    if alphabet.is_empty() {
        return Err(CrackError::InvalidCharset);
    }
    Ok(alphabet)
}

/// Σ_{i=1..max_length} alphabet_len^i, or [`CrackError::Overflow`] when it does not fit in u128.
pub fn combination_count(alphabet_len: usize, max_length: usize) -> Result<u128, CrackError> {
    if max_length == 0 {
        return Err(CrackError::InvalidLength(max_length));
    }
    if alphabet_len == 0 {
        return Err(CrackError::InvalidCharset);
    }
    let base = alphabet_len as u128;
    let mut total: u128 = 0;
    let mut power: u128 = 1;
    for _ in 0..max_length {
        power = power.checked_mul(base).ok_or(CrackError::Overflow)?;
        total = total.checked_add(power).ok_or(CrackError::Overflow)?;
    }
    Ok(total)
}

/// Number of candidates brute force over `charset` up to `max_length` will produce.
pub fn estimate_count(max_length: usize, charset: &str) -> Result<u128, CrackError> {
    if max_length == 0 {
        return Err(CrackError::InvalidLength(max_length));
    }
    let alphabet = resolve_charset(charset)?;
    combination_count(alphabet.len(), max_length)
}
