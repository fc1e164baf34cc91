//! JSON code-block splitting: splits the body of a `json`-fenced block at
//! top-level array/object element boundaries (bracket-depth-aware) so each
//! piece is syntactically balanced where possible, then re-wraps each piece
//! in a `json` fence.

/// Split a JSON code block's body into fence-wrapped, depth-balanced pieces
/// within `hard_size` (accounting for fence overhead).
pub fn split(body: &str, preferred_size: usize, hard_size: usize) -> Vec<String> {
    let fence_overhead = "```json\n".len() + "```\n".len();
    let hard_body_size = hard_size.saturating_sub(fence_overhead).max(1);
    let preferred_body_size = preferred_size.saturating_sub(fence_overhead).max(1);

    if body.len() <= hard_body_size {
        return if body.trim().is_empty() {
            Vec::new()
        } else {
            vec![wrap(body)]
        };
    }

    let elements = split_top_level_elements(body);
    if elements.len() <= 1 {
        return crate::recursive::split(body, preferred_body_size, hard_body_size)
            .into_iter()
            .map(|p| wrap(&p))
            .collect();
    }

    let mut out = Vec::new();
    let mut current = String::new();

    for el in elements {
        let candidate_len = if current.is_empty() { el.len() } else { current.len() + 2 + el.len() };

        if el.len() > hard_body_size {
            if !current.is_empty() {
                out.push(wrap(&current));
                current.clear();
            }
            out.extend(
                crate::recursive::split(&el, preferred_body_size, hard_body_size)
                    .into_iter()
                    .map(|p| wrap(&p)),
            );
            continue;
        }

        if candidate_len <= preferred_body_size || current.is_empty() {
            if candidate_len > hard_body_size {
                out.push(wrap(&current));
                current = el;
            } else {
                if !current.is_empty() {
                    current.push_str(", ");
                }
                current.push_str(&el);
            }
        } else {
            out.push(wrap(&current));
            current = el;
        }
    }
    if !current.is_empty() {
        out.push(wrap(&current));
    }

    out
}

fn wrap(body: &str) -> String {
    format!("```json\n{body}\n```")
}

/// Walk the body at bracket/brace depth 1 (i.e. the elements of the
/// top-level array or the key-value pairs of the top-level object),
/// splitting on commas that appear at that depth.
fn split_top_level_elements(body: &str) -> Vec<String> {
    let trimmed = body.trim();
    let Some(inner) = strip_outer_container(trimmed) else {
        return vec![body.to_string()];
    };

    let mut elements = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut start = 0usize;

    let bytes = inner.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let c = b as char;
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => depth -= 1,
            ',' if !in_string && depth == 0 => {
                elements.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        elements.push(last.to_string());
    }

    if elements.is_empty() {
        vec![body.to_string()]
    } else {
        elements
    }
}

fn strip_outer_container(s: &str) -> Option<&str> {
    if s.starts_with('[') && s.ends_with(']') {
        Some(&s[1..s.len() - 1])
    } else if s.starts_with('{') && s.ends_with('}') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}
