//! Class candidate extraction from content files.
//!
//! Any template, script or markup file is treated as plain text: every run of
//! class-name characters is a candidate. Most candidates will not name a
//! utility and are simply ignored by the generator.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Longest candidate worth considering.
const MAX_CANDIDATE_LEN: usize = 128;

/// Extract candidates from `text` into `into`.
pub fn extract_into(text: &str, into: &mut BTreeSet<String>) {
    static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
        // Bracketed arbitrary values may contain anything but whitespace, quotes
        // and braces.
        Regex::new(r#"(?:[A-Za-z0-9_\-:/.#%!]|\[[^\[\]\s"'`<>{}]*\])+"#).expect("valid regex")
    });

    for m in CANDIDATE_RE.find_iter(text) {
        let candidate = m.as_str().trim_end_matches(['.', ':']);
        if candidate.is_empty()
            || candidate.len() > MAX_CANDIDATE_LEN
            || !candidate.bytes().any(|b| b.is_ascii_alphabetic())
        {
            continue;
        }
        into.insert(candidate.to_string());
    }
}

/// Extract the distinct candidates of a single text.
pub fn extract(text: &str) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    extract_into(text, &mut set);
    set
}
