//! Display-name canonicalization.
//!
//! Material and person names are matched case-insensitively and with the
//! German umlauts and sharp s folded to their two-letter spellings, so that
//! "Müller", "MÜLLER" and "mueller" all denote the same entry.

/// Returns the canonical matching key for a display name.
///
/// Lowercases first, then expands `ä`, `ö`, `ü` and `ß`. Total and idempotent.
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut out = String::with_capacity(lower.len());

    for c in lower.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            other => out.push(other),
        }
    }

    out
}
