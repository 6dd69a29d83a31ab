//! Transcript text normalization.
//!
//! Applied to transcript text at ingestion time so that embeddings are
//! computed over consistent input. Queries are deliberately not normalized;
//! filter extraction needs their original form.

use unicode_normalization::UnicodeNormalization;

/// Normalize raw transcript text.
///
/// Applies NFKC Unicode normalization, collapses runs of whitespace
/// (including newlines and tabs) to single spaces, and trims the ends.
/// Total and idempotent.
pub fn normalize(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    let mut out = String::with_capacity(composed.len());
    let mut in_whitespace = false;
    for ch in composed.chars() {
        if ch.is_whitespace() {
            in_whitespace = true;
        } else {
            if in_whitespace && !out.is_empty() {
                out.push(' ');
            }
            in_whitespace = false;
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  hello \t world \n again  "), "hello world again");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_nfkc_composition() {
        // U+0065 U+0301 (e + combining acute) composes to U+00E9
        assert_eq!(normalize("caf\u{0065}\u{0301}"), "caf\u{00e9}");
        // Full-width digits fold to ASCII under NFKC
        assert_eq!(normalize("\u{ff12}\u{ff10}\u{ff14}"), "204");
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["  a  b c ", "già\u{0300} fatto", "plain", "\u{ff21}  x"];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
