//! Type token normalization.
//!
//! Turns a free-text component type into a short uppercase token. Known
//! French labels map through the type table; anything else is condensed from
//! its own letters.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::tables::LabelCode;

/// Width of the type segment.
pub const TYPE_CODE_WIDTH: usize = 6;

const FILLER: char = 'X';
const UNKNOWN_TOKEN: &str = "UNKN";
const VOWELS: &str = "AEIOUY";

/// Removes diacritics: "Pièces Découpées" becomes "Pieces Decoupees".
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Comparison form for table labels: no diacritics, uppercase, no whitespace.
pub fn fold(text: &str) -> String {
    strip_diacritics(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Uppercase ASCII alphanumerics only, with digits that read like letters
/// swapped out.
fn condense(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| match c.to_ascii_uppercase() {
            '0' => '2',
            '1' => '3',
            '9' => '8',
            other => other,
        })
        .collect()
}

fn pad(token: &str) -> String {
    let mut padded: String = token.chars().take(TYPE_CODE_WIDTH).collect();
    while padded.chars().count() < TYPE_CODE_WIDTH {
        padded.push(FILLER);
    }
    padded
}

/// Produces the type token for `component_type`. Never fails.
pub fn normalize_type(component_type: &str, types: &[LabelCode]) -> String {
    let folded = fold(component_type);

    if !folded.is_empty() {
        let known = types.iter().find(|entry| {
            let label = fold(&entry.label);
            !label.is_empty() && folded.contains(&label)
        });
        if let Some(entry) = known {
            return entry.code.chars().take(TYPE_CODE_WIDTH).collect();
        }
    }

    let plain = strip_diacritics(component_type);
    let condensed = condense(&plain);

    if condensed.is_empty() {
        return pad(UNKNOWN_TOKEN);
    }
    if condensed.len() <= TYPE_CODE_WIDTH {
        return pad(&condensed);
    }

    // Initials of the significant words.
    let initials: String = plain
        .split_whitespace()
        .map(condense)
        .filter(|word| word.len() > 2)
        .filter_map(|word| word.chars().next())
        .collect();
    if initials.len() >= TYPE_CODE_WIDTH {
        return initials[..TYPE_CODE_WIDTH].to_string();
    }

    // Consonants read better than vowels.
    let consonants = condensed.chars().filter(|c| !VOWELS.contains(*c));
    let vowels = condensed.chars().filter(|c| VOWELS.contains(*c));
    consonants.chain(vowels).take(TYPE_CODE_WIDTH).collect()
}
