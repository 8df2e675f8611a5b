//! Truncated-token expansion table.
//!
//! Maps the short forms that appear on QR signage and in booking input to
//! their canonical full tokens. Applied symmetrically at catalog-import
//! time and at scan time so `"SM Dasma"` matches `"SM Dasmariñas"`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Known truncations and abbreviations in checkpoint names.
static TRUNCATIONS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("DASMA", "DASMARINAS"),
        ("STA", "SANTA"),
        ("STO", "SANTO"),
        ("GEN", "GENERAL"),
        ("BRGY", "BARANGAY"),
        ("BGY", "BARANGAY"),
        ("JCT", "JUNCTION"),
        ("TERM", "TERMINAL"),
        ("XING", "CROSSING"),
        ("NATL", "NATIONAL"),
        ("MKT", "MARKET"),
        ("ELEM", "ELEMENTARY"),
        ("BLVD", "BOULEVARD"),
        ("HWY", "HIGHWAY"),
    ])
});

/// Expands a single normalized token, or returns it unchanged.
#[must_use]
pub fn expand_token(token: &str) -> &str {
    TRUNCATIONS.get(token).copied().unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_truncations() {
        assert_eq!(expand_token("DASMA"), "DASMARINAS");
        assert_eq!(expand_token("STA"), "SANTA");
        assert_eq!(expand_token("HWY"), "HIGHWAY");
    }

    #[test]
    fn passes_unknown_tokens_through() {
        assert_eq!(expand_token("EPZA"), "EPZA");
        assert_eq!(expand_token("SM"), "SM");
    }
}
