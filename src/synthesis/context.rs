//! Context block construction for answer synthesis.
//!
//! Retrieved chunks are re-serialized into an enriched presentation form
//! with provenance fields ahead of the transcript text. This is an
//! answer-time transform only; stored chunks are never modified.

use crate::language;
use crate::vector_store::TranscriptChunk;

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        language::NOT_APPLICABLE
    } else {
        value
    }
}

/// Render a chunk with its provenance prepended.
///
/// Fixed field order, newline-delimited. The language code is expanded to
/// its full name; unknown codes pass through unchanged.
pub fn enrich_chunk(chunk: &TranscriptChunk) -> String {
    format!(
        "User ID: {}\nTimestamp: {}\nLanguage: {}\nTranscript: {}",
        or_na(&chunk.user_id),
        or_na(&chunk.timestamp),
        language::code_to_name(or_na(&chunk.language)),
        chunk.text
    )
}

/// Join enriched chunk strings into the prompt context block.
pub fn format_context(enriched: &[String]) -> String {
    enriched.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, user_id: &str, language: &str, timestamp: &str) -> TranscriptChunk {
        TranscriptChunk::new(
            text.to_string(),
            user_id.to_string(),
            language.to_string(),
            timestamp.to_string(),
            "calls.csv".to_string(),
            vec![],
        )
    }

    #[test]
    fn test_enrichment_is_deterministic_and_ordered() {
        let c = chunk("I was overcharged", "user_204", "hi", "2024-05-03 11:20");
        assert_eq!(
            enrich_chunk(&c),
            "User ID: user_204\nTimestamp: 2024-05-03 11:20\nLanguage: Hindi\nTranscript: I was overcharged"
        );
    }

    #[test]
    fn test_unknown_language_code_passes_through() {
        let c = chunk("text", "user_1", "kn", "2024-01-01");
        assert!(enrich_chunk(&c).contains("Language: kn"));
    }

    #[test]
    fn test_missing_fields_render_as_sentinel() {
        let c = chunk("text", "", "", "");
        let enriched = enrich_chunk(&c);
        assert!(enriched.contains("User ID: N/A"));
        assert!(enriched.contains("Timestamp: N/A"));
        assert!(enriched.contains("Language: N/A"));
    }

    #[test]
    fn test_context_block_is_blank_line_separated() {
        let blocks = vec!["a".to_string(), "b".to_string()];
        assert_eq!(format_context(&blocks), "a\n\nb");
        assert_eq!(format_context(&[]), "");
    }
}
