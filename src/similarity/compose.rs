//! Canonical embedding-text composition.
//!
//! Builds the exact string fed to the embedding model from a movie's title,
//! director, and synopsis. Pure and deterministic: the composed string is
//! persisted back onto the movie record (`movies.embedding_text`) so any
//! stored vector can be traced to the text it was generated from.
//!
//! Missing-value convention: a null or blank director/synopsis OMITS the
//! whole clause. Never render a literal "null" — changing this convention
//! shifts embeddings for every record on the next rebuild.

/// Synopsis contribution is capped at this many characters.
pub const SYNOPSIS_MAX_CHARS: usize = 500;

/// Compose the canonical embedding input for a movie.
pub fn compose_embedding_text(
    name: &str,
    director: Option<&str>,
    synopsis: Option<&str>,
) -> String {
    let mut text = format!("Title: {name}.");

    if let Some(director) = director.filter(|d| !d.trim().is_empty()) {
        text.push_str(" Director: ");
        text.push_str(director);
        text.push('.');
    }

    if let Some(synopsis) = synopsis.filter(|s| !s.trim().is_empty()) {
        text.push_str(" Synopsis: ");
        // Truncate by characters, never by bytes, so multi-byte text stays intact.
        for c in synopsis.chars().take(SYNOPSIS_MAX_CHARS) {
            text.push(c);
        }
        text.push('.');
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_all_fields() {
        let text = compose_embedding_text(
            "Blade Runner",
            Some("Ridley Scott"),
            Some("A blade runner must pursue four replicants"),
        );
        assert_eq!(
            text,
            "Title: Blade Runner. Director: Ridley Scott. \
             Synopsis: A blade runner must pursue four replicants."
        );
    }

    #[test]
    fn is_deterministic() {
        let a = compose_embedding_text("Heat", Some("Michael Mann"), Some("A heist goes wrong."));
        let b = compose_embedding_text("Heat", Some("Michael Mann"), Some("A heist goes wrong."));
        assert_eq!(a, b);
    }

    #[test]
    fn omits_missing_director() {
        let text = compose_embedding_text("Threads", None, Some("Nuclear war hits Sheffield"));
        assert_eq!(text, "Title: Threads. Synopsis: Nuclear war hits Sheffield.");
        assert!(!text.contains("null"));
    }

    #[test]
    fn omits_blank_director_and_synopsis() {
        assert_eq!(
            compose_embedding_text("Stalker", Some("   "), None),
            "Title: Stalker."
        );
        assert_eq!(
            compose_embedding_text("Stalker", None, Some("")),
            "Title: Stalker."
        );
    }

    #[test]
    fn truncates_synopsis_to_exactly_500_chars() {
        let synopsis = "x".repeat(800);
        let text = compose_embedding_text("Long", None, Some(&synopsis));
        let expected = format!("Title: Long. Synopsis: {}.", "x".repeat(500));
        assert_eq!(text, expected);
    }

    #[test]
    fn short_synopsis_is_kept_whole() {
        let text = compose_embedding_text("Short", None, Some("Brief."));
        assert_eq!(text, "Title: Short. Synopsis: Brief..");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        // 600 multi-byte chars; a byte slice at 500 would split a code point.
        let synopsis: String = std::iter::repeat('é').take(600).collect();
        let text = compose_embedding_text("Amélie", None, Some(&synopsis));
        let clause: String = std::iter::repeat('é').take(500).collect();
        assert_eq!(text, format!("Title: Amélie. Synopsis: {clause}."));
    }
}
