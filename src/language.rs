//! Language code registry.
//!
//! A fixed, closed mapping between the short codes stored in chunk metadata
//! and full language names, used during ingestion, filter extraction, and
//! result annotation. The two directions are deliberately asymmetric: an
//! unknown code passes through unchanged at display time so it never
//! disappears, while an unknown name produces no filter constraint.

/// Sentinel for records with no applicable language.
pub const NOT_APPLICABLE: &str = "N/A";

/// The supported transcript languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Hindi,
    Tamil,
    Telugu,
    Malayalam,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 4] = [
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Malayalam,
    ];

    /// Short metadata code (e.g. "hi").
    pub fn code(&self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Malayalam => "ml",
        }
    }

    /// Full language name (e.g. "Hindi").
    pub fn name(&self) -> &'static str {
        match self {
            Language::Hindi => "Hindi",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Malayalam => "Malayalam",
        }
    }

    /// Look up a language by short code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.code().eq_ignore_ascii_case(code))
    }

    /// Look up a language by full name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Language> {
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

/// Resolve a short code to a full name for display.
///
/// Unrecognized codes are returned unchanged rather than dropped, so odd
/// metadata stays visible in enriched output. The `N/A` sentinel maps to
/// itself.
pub fn code_to_name(code: &str) -> String {
    if code.eq_ignore_ascii_case(NOT_APPLICABLE) {
        return NOT_APPLICABLE.to_string();
    }
    match Language::from_code(code) {
        Some(lang) => lang.name().to_string(),
        None => code.to_string(),
    }
}

/// Resolve a full language name to its short code.
///
/// Unrecognized names yield the `N/A` sentinel; callers extracting filters
/// treat that as "no constraint".
pub fn name_to_code(name: &str) -> String {
    if name.eq_ignore_ascii_case(NOT_APPLICABLE) {
        return NOT_APPLICABLE.to_string();
    }
    match Language::from_name(name) {
        Some(lang) => lang.code().to_string(),
        None => NOT_APPLICABLE.to_string(),
    }
}
