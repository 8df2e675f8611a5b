#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Checkpoint name normalization and alias equivalence.
//!
//! Checkpoint names arrive from QR payloads, booking forms, and admin
//! imports in many variants of the same place name:
//! - Diacritics: `"SM Dasmariñas"` vs `"SM Dasmarinas"`
//! - Truncations: `"SM Dasma"`, `"Sta Lucia"`
//! - Punctuation and casing: `"PALA-PALA"`, `"pala pala"`
//!
//! This crate provides one deterministic pipeline consulted by both the
//! booking and the completion logic, so a trip booked against one variant
//! completes when the driver scans another. The pipeline is applied
//! symmetrically to stored names and incoming names; additional aliases
//! are data (rows in `checkpoint_aliases`) merged in at call time, not
//! code changes.

mod expansions;
mod normalize;

pub use normalize::normalize;

use std::collections::BTreeMap;

/// Builds a lookup table from raw `(alias, canonical)` pairs.
///
/// Both sides are normalized so rows loaded from `checkpoint_aliases`
/// match regardless of how they were typed when inserted.
#[must_use]
pub fn build_alias_map(pairs: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(alias, canonical)| (normalize(&alias), normalize(&canonical)))
        .collect()
}

/// Reduces a checkpoint name to its canonical comparison key.
///
/// Applies [`normalize`] (uppercase, diacritic fold, punctuation strip,
/// truncated-token expansion), then consults `aliases` — a whole-name
/// alias table keyed by normalized alias — for a final mapping.
#[must_use]
pub fn canonical(name: &str, aliases: &BTreeMap<String, String>) -> String {
    let normalized = normalize(name);
    aliases
        .get(&normalized)
        .map_or(normalized, |canonical| normalize(canonical))
}

/// Returns `true` when two checkpoint names refer to the same place.
///
/// Equivalence means equal canonical keys. Arbitrary prefixes are NOT
/// equivalent — only truncations present in the expansion table or the
/// alias table match, so `"SM Epza"` never collides with `"SM Dasma"`.
#[must_use]
pub fn names_equivalent(a: &str, b: &str, aliases: &BTreeMap<String, String>) -> bool {
    canonical(a, aliases) == canonical(b, aliases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_aliases() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn diacritic_variants_are_equivalent() {
        assert!(names_equivalent(
            "SM Dasmariñas",
            "SM DASMARINAS",
            &no_aliases()
        ));
    }

    #[test]
    fn truncated_variant_matches_full_name() {
        assert!(names_equivalent(
            "SM Dasma",
            "SM Dasmariñas",
            &no_aliases()
        ));
    }

    #[test]
    fn unrelated_names_do_not_match() {
        assert!(!names_equivalent("SM Epza", "SM Dasmariñas", &no_aliases()));
    }

    #[test]
    fn shared_word_prefix_is_not_equivalence() {
        // Both start with "SM" but are different places.
        assert!(!names_equivalent("SM Epza", "SM Bacoor", &no_aliases()));
    }

    #[test]
    fn alias_table_entries_apply_after_normalization() {
        let mut aliases = BTreeMap::new();
        aliases.insert("PALA PALA".to_string(), "PALAPALA".to_string());
        assert!(names_equivalent("Pala-Pala", "Palapala", &aliases));
    }

    #[test]
    fn build_alias_map_normalizes_both_sides() {
        let map = build_alias_map([("Pala-Pala".to_string(), "palapala".to_string())]);
        assert_eq!(map.get("PALA PALA").map(String::as_str), Some("PALAPALA"));
    }

    #[test]
    fn canonical_is_stable_under_reapplication() {
        let aliases = no_aliases();
        let once = canonical("SM Dasmariñas", &aliases);
        let twice = canonical(&once, &aliases);
        assert_eq!(once, twice);
    }
}
