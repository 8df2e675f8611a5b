//! Deterministic checkpoint name normalization.
//!
//! The pipeline mirrors what the ingest side applies when checkpoint
//! catalogs are imported, so stored names and scanned names compare
//! equal:
//! 1. Uppercase
//! 2. Fold Latin diacritics to ASCII (`Ñ` → `N`)
//! 3. Strip punctuation (`.`, `,`, `#`, `'`, `/`, `\`, `-`, `(`, `)`)
//! 4. Expand known truncated tokens (`DASMA` → `DASMARINAS`)
//! 5. Collapse whitespace and trim

use regex::Regex;
use std::sync::LazyLock;

use crate::expansions;

/// Punctuation characters that do not contribute to name matching.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,#'/\\\-()]+").expect("valid regex"));

/// Collapses runs of whitespace into a single space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Folds an uppercase Latin character with a diacritic to its ASCII base.
///
/// Covers the accented characters that occur in Philippine place names
/// (Spanish-derived spellings). Characters outside the table pass through
/// unchanged.
const fn fold_diacritic(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        other => other,
    }
}

/// Normalizes a checkpoint name for comparison and storage keys.
#[must_use]
pub fn normalize(input: &str) -> String {
    let upper: String = input
        .to_uppercase()
        .chars()
        .map(fold_diacritic)
        .collect();

    let no_punct = PUNCTUATION_RE.replace_all(&upper, " ");

    let expanded: Vec<&str> = no_punct
        .split_whitespace()
        .map(expansions::expand_token)
        .collect();

    let joined = expanded.join(" ");
    WHITESPACE_RE.replace_all(&joined, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_folds_diacritics() {
        assert_eq!(normalize("SM Dasmariñas"), "SM DASMARINAS");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(normalize("Pala-Pala Jct."), "PALA PALA JUNCTION");
    }

    #[test]
    fn expands_truncated_tokens() {
        assert_eq!(normalize("Sta. Lucia"), "SANTA LUCIA");
        assert_eq!(normalize("SM Dasma"), "SM DASMARINAS");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  SM   Epza  "), "SM EPZA");
    }

    #[test]
    fn plain_ascii_names_pass_through() {
        assert_eq!(normalize("Robinsons Pala-Pala"), "ROBINSONS PALA PALA");
    }
}
