//! Match validation: decides whether a candidate answers the request.

use crate::core::config::validation::MIN_FULL_TRACK_SECS;

/// Lowercases and strips everything but alphanumerics and spaces, so that
/// punctuation and bracketed decorations don't defeat the comparison.
fn normalize_title(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Directional containment check: the candidate title must contain the
/// target track name as a substring. Tolerates extra words in the candidate
/// ("(Live)", "[Official Audio]") but rejects candidates missing the core
/// title. Empty inputs never match.
pub fn is_acceptable(candidate_title: &str, target_track_name: &str) -> bool {
    if candidate_title.is_empty() || target_track_name.is_empty() {
        return false;
    }
    let candidate = normalize_title(candidate_title);
    let target = normalize_title(target_track_name);
    if target.trim().is_empty() {
        return false;
    }
    candidate.contains(&target)
}

/// Preview-length filter: a candidate with a known duration below the
/// threshold is a 30-second preview clip mislabeled as a full track.
/// Unknown duration passes — absence of metadata is not evidence.
pub fn is_preview(duration_secs: Option<u64>) -> bool {
    matches!(duration_secs, Some(d) if d < MIN_FULL_TRACK_SECS)
}

/// Loose artist overlap used to decide whether a cover lookup should retry
/// with an artist-qualified query: either name containing the other counts.
pub fn artists_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_containment_accepts_decorated_candidate() {
        assert!(is_acceptable("Artist - Song Name (Official Video)", "Song Name"));
        assert!(is_acceptable("Song Name [Official Audio]", "song name"));
    }

    #[test]
    fn test_containment_rejects_unrelated_candidate() {
        assert!(!is_acceptable("Totally Different Track", "Song Name"));
    }

    #[test]
    fn test_containment_ignores_punctuation() {
        assert!(is_acceptable("D.O.G.S. (Live)", "dogs"));
        assert!(is_acceptable("Don't Stop Me Now - Remastered", "dont stop me now"));
    }

    #[test]
    fn test_containment_is_directional() {
        // Candidate missing words from the target must not pass.
        assert!(!is_acceptable("Song", "Song Name"));
        assert!(is_acceptable("Song Name", "Song"));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!is_acceptable("", "Song Name"));
        assert!(!is_acceptable("Song Name", ""));
        assert!(!is_acceptable("Song Name", "!!!"));
    }

    #[test]
    fn test_preview_filter() {
        assert!(is_preview(Some(20)));
        assert!(is_preview(Some(44)));
        assert!(!is_preview(Some(45)));
        assert!(!is_preview(Some(200)));
        assert!(!is_preview(None));
    }

    #[test]
    fn test_artists_overlap() {
        assert!(artists_overlap("Daft Punk", "daft punk"));
        assert!(artists_overlap("Daft Punk", "Punk"));
        assert!(!artists_overlap("Daft Punk", "Justice"));
        assert_eq!(artists_overlap("", "Justice"), false);
    }
}
