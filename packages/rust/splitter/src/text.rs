//! Text/heading section splitting: paragraph split first, then line split,
//! then recursive character splitting as the final fallback.

use crate::recursive;

/// Split a text or heading section's content into pieces within bound.
/// Tries, in order: paragraph split (blank-line-delimited), line split,
/// recursive character split.
pub fn split(content: &str, preferred_size: usize, hard_size: usize) -> Vec<String> {
    if content.len() <= hard_size {
        return if content.trim().is_empty() {
            Vec::new()
        } else {
            vec![content.to_string()]
        };
    }

    let paragraphs: Vec<&str> = content.split("\n\n").filter(|p| !p.trim().is_empty()).collect();
    if paragraphs.len() > 1 && paragraphs.iter().all(|p| p.len() <= hard_size) {
        return merge(&paragraphs, "\n\n", preferred_size, hard_size);
    }

    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() > 1 && lines.iter().all(|l| l.len() <= hard_size) {
        return merge(&lines, "\n", preferred_size, hard_size);
    }

    recursive::split(content, preferred_size, hard_size)
}

fn merge(pieces: &[&str], sep: &str, preferred_size: usize, hard_size: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for piece in pieces {
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
                out.extend(recursive::split(piece, preferred_size, hard_size));
                continue;
            }
            if !current.is_empty() {
                current.push_str(sep);
            }
            current.push_str(piece);
        } else {
            out.push(std::mem::take(&mut current));
            current = piece.to_string();
        }
    }

    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}
