//! Recursive character splitter: the last-resort fallback for text that
//! doesn't fit within the hard bound even after paragraph/line splitting.
//! Tries a descending set of separators, merging adjacent small pieces back
//! together as long as the combination stays within the preferred bound.

const SEPARATORS: &[&str] = &[
    "\n\n", "\n", " ", "\t", ".", ",", ";", ":", "-", "(", ")", "[", "]", "{", "}", "",
];

/// Split `text` into pieces no longer than `hard_size`, using the widest
/// separator from [`SEPARATORS`] that actually fits, falling through to
/// narrower ones and finally to raw character boundaries.
pub fn split(text: &str, preferred_size: usize, hard_size: usize) -> Vec<String> {
    if text.len() <= hard_size {
        return if text.trim().is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
    }

    for sep in SEPARATORS {
        let pieces = split_by_separator(text, sep);
        if pieces.len() <= 1 {
            continue;
        }
        if pieces.iter().all(|p| p.len() <= hard_size) {
            return merge_pieces(&pieces, sep, preferred_size, hard_size);
        }
    }

    // No separator produced pieces that all fit; recurse on the narrowest
    // separator's pieces individually, truncating any piece that still
    // doesn't fit (the last-resort truncation fallback).
    let mut out = Vec::new();
    for piece in split_by_separator(text, "") {
        if piece.len() <= hard_size {
            if !piece.trim().is_empty() {
                out.push(piece);
            }
        } else {
            tracing::warn!(len = piece.len(), hard_size, "truncating oversized piece");
            out.push(truncate_to_char_boundary(&piece, hard_size));
        }
    }
    out
}

fn split_by_separator(text: &str, sep: &str) -> Vec<String> {
    if sep.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }
    text.split(sep).map(|s| s.to_string()).collect()
}

fn merge_pieces(pieces: &[String], sep: &str, preferred_size: usize, hard_size: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if piece.trim().is_empty() && current.is_empty() {
            continue;
        }
        let candidate_len = if current.is_empty() {
            piece.len()
        } else {
            current.len() + sep.len() + piece.len()
        };

        if candidate_len <= preferred_size || current.is_empty() {
            if candidate_len > hard_size {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                for sub in split(piece, preferred_size, hard_size) {
                    out.push(sub);
                }
                continue;
            }
            if !current.is_empty() {
                current.push_str(sep);
            }
            current.push_str(piece);
        } else {
            out.push(std::mem::take(&mut current));
            current = piece.clone();
        }
    }

    if !current.trim().is_empty() {
        out.push(current);
    }

    out
}

fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
    let mut end = max_bytes.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_within_bound_is_unchanged() {
        let out = split("short text", 100, 200);
        assert_eq!(out, vec!["short text".to_string()]);
    }

    #[test]
    fn splits_on_widest_fitting_separator() {
        let text = "a".repeat(50) + "\n\n" + &"b".repeat(50);
        let out = split(&text, 40, 60);
        assert!(out.iter().all(|p| p.len() <= 60));
        assert!(out.len() >= 2);
    }

    #[test]
    fn merges_small_pieces_within_preferred_bound() {
        let text = "one\n\ntwo\n\nthree";
        let out = split(text, 100, 200);
        assert_eq!(out, vec!["one\n\ntwo\n\nthree".to_string()]);
    }

    #[test]
    fn never_exceeds_hard_bound_even_for_pathological_input() {
        let text = "x".repeat(1000);
        let out = split(&text, 50, 80);
        assert!(out.iter().all(|p| p.len() <= 80));
    }

    #[test]
    fn drops_empty_pieces() {
        let out = split("", 10, 20);
        assert!(out.is_empty());
    }
}
