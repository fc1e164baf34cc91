//! Code section splitting: split on line boundaries, re-wrap each piece in
//! a `lang`-tagged fence. A single line that still overflows the hard bound
//! once wrapped falls back to the recursive character splitter, with each
//! resulting piece re-wrapped in the fence (the `MinimumChunkSize`
//! condition from the spec).

use crate::recursive;

/// Split fenced code block content (the body between the fences, no fence
/// lines) into fence-wrapped pieces.
pub fn split(body: &str, lang: Option<&str>, preferred_size: usize, hard_size: usize) -> Vec<String> {
    let fence_lang = lang.unwrap_or("");
    let fence_overhead = format!("```{fence_lang}\n").len() + "```\n".len();
    let hard_body_size = hard_size.saturating_sub(fence_overhead).max(1);
    let preferred_body_size = preferred_size.saturating_sub(fence_overhead).max(1);

    let lines: Vec<&str> = body.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let mut bodies: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in &lines {
        let candidate_len = if current.is_empty() {
            line.len()
        } else {
            current.len() + 1 + line.len()
        };

        if line.len() > hard_body_size {
            if !current.is_empty() {
                bodies.push(std::mem::take(&mut current));
            }
            tracing::warn!(len = line.len(), hard_body_size, "code line exceeds hard bound, falling back to recursive split");
            bodies.extend(recursive::split(line, preferred_body_size, hard_body_size));
            continue;
        }

        if candidate_len <= preferred_body_size || current.is_empty() {
            if candidate_len > hard_body_size {
                bodies.push(std::mem::take(&mut current));
                current = line.to_string();
            } else {
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(line);
            }
        } else {
            bodies.push(std::mem::take(&mut current));
            current = line.to_string();
        }
    }
    if !current.is_empty() {
        bodies.push(current);
    }

    bodies
        .into_iter()
        .map(|b| wrap_fence(&b, fence_lang))
        .collect()
}

fn wrap_fence(body: &str, lang: &str) -> String {
    format!("```{lang}\n{body}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_short_block_stays_one_chunk() {
        let out = split("fn main() {}", Some("rust"), 100, 200);
        assert_eq!(out, vec!["```rust\nfn main() {}\n```".to_string()]);
    }

    #[test]
    fn preserves_language_on_every_chunk() {
        let lines = (0..50).map(|i| format!("line {i} of typescript code here")).collect::<Vec<_>>().join("\n");
        let out = split(&lines, Some("typescript"), 100, 150);
        assert!(out.len() > 1);
        for chunk in &out {
            assert!(chunk.starts_with("```typescript\n"));
            assert!(chunk.ends_with("```"));
        }
    }

    #[test]
    fn concatenating_chunks_reproduces_original_lines() {
        let lines: Vec<String> = (0..20).map(|i| format!("console.log({i});")).collect();
        let body = lines.join("\n");
        let out = split(&body, Some("javascript"), 60, 90);

        let mut reconstructed = String::new();
        for chunk in &out {
            let inner = chunk
                .trim_start_matches("```javascript\n")
                .trim_end_matches("\n```");
            if !reconstructed.is_empty() {
                reconstructed.push('\n');
            }
            reconstructed.push_str(inner);
        }
        assert_eq!(reconstructed, body);
    }

    #[test]
    fn no_chunk_exceeds_hard_bound() {
        let lines = (0..30).map(|i| format!("this is a moderately long code line number {i}")).collect::<Vec<_>>().join("\n");
        let out = split(&lines, Some("rust"), 80, 120);
        assert!(out.iter().all(|c| c.len() <= 120));
    }
}
