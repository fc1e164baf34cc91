//! Semantic Markdown splitter: turns a Markdown string into a sequence of
//! size-bounded pieces that preserve heading hierarchy and code/table
//! boundaries.
//!
//! The entry point is [`split`]. It walks the document's structural
//! sections (see [`section`]) and dispatches each to a type-specific
//! splitter (text/heading, code, table, JSON), falling back to the
//! recursive character splitter whenever a piece doesn't fit the preferred
//! or hard size bound. Output pieces never exceed `hard_size` except via
//! the logged last-resort truncation inside [`recursive`].

mod code;
mod json;
mod recursive;
pub mod section;
mod table;
mod text;

use docsforge_shared::{ChunkType, SectionPath};
use section::SectionKind;

/// Bounds controlling splitter output size. `hard_size` is the absolute
/// ceiling; `preferred_size` is the target the merge passes aim for.
#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    pub preferred_size: usize,
    pub hard_size: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            preferred_size: 800,
            hard_size: 1200,
        }
    }
}

/// One splitter output piece, prior to the crawler/store attaching
/// `source_url`, `library`, `version`, `chunk_index`, and `embedding`.
#[derive(Debug, Clone)]
pub struct SplitChunk {
    pub content: String,
    pub types: std::collections::BTreeSet<ChunkType>,
    pub section: SectionPath,
}

/// Split `markdown` into size-bounded [`SplitChunk`]s.
pub fn split(markdown: &str, options: SplitOptions) -> Vec<SplitChunk> {
    let sections = section::walk(markdown);
    let mut chunks = Vec::new();

    for sec in sections {
        let raw = &markdown[sec.range.clone()];
        let section_path = SectionPath {
            level: sec.level,
            path: sec.path.clone(),
        };

        let pieces: Vec<(String, ChunkType)> = match sec.kind {
            SectionKind::Heading => {
                if raw.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![(raw.trim().to_string(), ChunkType::Heading)]
                }
            }
            SectionKind::Text => text::split(raw, options.preferred_size, options.hard_size)
                .into_iter()
                .map(|c| (c, ChunkType::Text))
                .collect(),
            SectionKind::Table => table::split(raw, options.preferred_size, options.hard_size)
                .into_iter()
                .map(|c| (c, ChunkType::Table))
                .collect(),
            SectionKind::Code => {
                let body = strip_fence(raw);
                let lang = sec.lang.as_deref();
                let split_pieces = if lang == Some("json") {
                    json::split(&body, options.preferred_size, options.hard_size)
                } else {
                    code::split(&body, lang, options.preferred_size, options.hard_size)
                };
                split_pieces.into_iter().map(|c| (c, ChunkType::Code)).collect()
            }
        };

        for (content, chunk_type) in pieces {
            if content.trim().is_empty() {
                continue;
            }
            chunks.push(SplitChunk {
                content,
                types: std::iter::once(chunk_type).collect(),
                section: section_path.clone(),
            });
        }
    }

    chunks
}

/// Strip a fenced code block's opening/closing fence lines, returning the
/// body verbatim.
fn strip_fence(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();
    if lines.first().map(|l| l.trim_start().starts_with("```")).unwrap_or(false) {
        lines.remove(0);
    }
    if lines.last().map(|l| l.trim().starts_with("```")).unwrap_or(false) {
        lines.pop();
    }
    lines.join("\n")
}
