//! Walks a Markdown document's block-level event stream, slicing it into
//! structural sections (heading, text, code, table) with their source byte
//! ranges, so downstream splitting reads content verbatim out of the
//! original string rather than re-serializing a lossy intermediate tree.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Heading,
    Text,
    Code,
    Table,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub range: std::ops::Range<usize>,
    /// Heading depth (1-6) enclosing this section; 0 at document root.
    pub level: u8,
    /// Titles of enclosing headings from the root down to (not including)
    /// this section, unless this section *is* a heading, in which case the
    /// path includes its own title as the last element.
    pub path: Vec<String>,
    /// Fence language, for `SectionKind::Code` sections only.
    pub lang: Option<String>,
}

/// Split `markdown` into [`Section`]s in document order.
pub fn walk(markdown: &str) -> Vec<Section> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);

    let mut sections = Vec::new();
    // (level, title) per ancestor heading, root to leaf. Skipped levels (an
    // H3 directly under an H1, say) get a placeholder entry so `path.len()`
    // always equals the enclosing level, never less.
    let mut heading_stack: Vec<(u8, String)> = Vec::new();
    let mut text_start: Option<usize> = None;
    let mut text_end: usize = 0;

    let mut depth = 0i32;
    let mut in_heading = false;
    let mut heading_level: u8 = 0;
    let mut heading_text = String::new();
    let mut heading_range: Option<std::ops::Range<usize>> = None;

    let flush_text = |sections: &mut Vec<Section>,
                       text_start: &mut Option<usize>,
                       text_end: usize,
                       heading_stack: &[(u8, String)]| {
        if let Some(start) = text_start.take() {
            if text_end > start {
                sections.push(Section {
                    kind: SectionKind::Text,
                    range: start..text_end,
                    level: heading_stack.len() as u8,
                    path: path_of(heading_stack),
                    lang: None,
                });
            }
        }
    };

    for (event, range) in parser.into_offset_iter() {
        match &event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush_text(&mut sections, &mut text_start, text_end, &heading_stack);
                in_heading = true;
                heading_level = heading_level_to_u8(*level);
                heading_text.clear();
                heading_range = Some(range.clone());
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                while heading_stack.last().is_some_and(|(l, _)| *l >= heading_level) {
                    heading_stack.pop();
                }
                let parent_level = heading_stack.last().map_or(0, |(l, _)| *l);
                for lvl in (parent_level + 1)..heading_level {
                    heading_stack.push((lvl, String::new()));
                }
                heading_stack.push((heading_level, heading_text.trim().to_string()));
                let path = path_of(&heading_stack);
                if let Some(r) = heading_range.take() {
                    sections.push(Section {
                        kind: SectionKind::Heading,
                        range: r,
                        level: heading_level,
                        path,
                        lang: None,
                    });
                }
            }
            Event::Text(t) | Event::Code(t) if in_heading => {
                heading_text.push_str(t);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                flush_text(&mut sections, &mut text_start, text_end, &heading_stack);
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                sections.push(Section {
                    kind: SectionKind::Code,
                    range: range.clone(),
                    level: heading_stack.len() as u8,
                    path: path_of(&heading_stack),
                    lang,
                });
            }
            Event::Start(Tag::Table(_)) => {
                flush_text(&mut sections, &mut text_start, text_end, &heading_stack);
                sections.push(Section {
                    kind: SectionKind::Table,
                    range: range.clone(),
                    level: heading_stack.len() as u8,
                    path: path_of(&heading_stack),
                    lang: None,
                });
            }
            _ => {
                if depth == 0 && !in_heading {
                    if text_start.is_none() {
                        text_start = Some(range.start);
                    }
                    text_end = text_end.max(range.end);
                }
            }
        }

        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            _ => {}
        }
    }

    flush_text(&mut sections, &mut text_start, text_end, &heading_stack);

    sections.sort_by_key(|s| s.range.start);
    dedup_overlaps(sections)
}

/// Code and table sections are emitted at their container's start event
/// and claim their full byte range immediately; any text-run bytes that
/// fall inside an already-claimed range are dropped rather than duplicated.
fn dedup_overlaps(sections: Vec<Section>) -> Vec<Section> {
    let mut result: Vec<Section> = Vec::with_capacity(sections.len());
    for section in sections {
        if let Some(last) = result.last() {
            if section.range.start < last.range.end {
                if matches!(last.kind, SectionKind::Code | SectionKind::Table)
                    && matches!(section.kind, SectionKind::Text)
                {
                    continue;
                }
            }
        }
        result.push(section);
    }
    result
}

fn path_of(heading_stack: &[(u8, String)]) -> Vec<String> {
    heading_stack.iter().map(|(_, title)| title.clone()).collect()
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_heading_and_following_text() {
        let md = "# Title\n\nSome body text.\n";
        let sections = walk(md);
        assert_eq!(sections[0].kind, SectionKind::Heading);
        assert_eq!(sections[0].path, vec!["Title".to_string()]);
        assert!(sections.iter().any(|s| s.kind == SectionKind::Text));
    }

    #[test]
    fn nested_headings_build_path() {
        let md = "# A\n\ntext a\n\n## B\n\ntext b\n";
        let sections = walk(md);
        let b_heading = sections
            .iter()
            .find(|s| s.kind == SectionKind::Heading && s.level == 2)
            .unwrap();
        assert_eq!(b_heading.path, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn skipped_heading_level_pads_path_to_match_level() {
        let md = "# A\n\n### B\n\ntext\n";
        let sections = walk(md);
        let b_heading = sections
            .iter()
            .find(|s| s.kind == SectionKind::Heading && s.level == 3)
            .unwrap();
        assert_eq!(b_heading.path.len(), 3);
        assert_eq!(b_heading.path, vec!["A".to_string(), String::new(), "B".to_string()]);
    }

    #[test]
    fn code_block_captures_language() {
        let md = "# T\n\n```rust\nfn main() {}\n```\n";
        let sections = walk(md);
        let code = sections.iter().find(|s| s.kind == SectionKind::Code).unwrap();
        assert_eq!(code.lang.as_deref(), Some("rust"));
    }

    #[test]
    fn table_is_its_own_section() {
        let md = "# T\n\n| a | b |\n| --- | --- |\n| 1 | 2 |\n";
        let sections = walk(md);
        assert!(sections.iter().any(|s| s.kind == SectionKind::Table));
    }

    #[test]
    fn section_content_slices_verbatim_from_source() {
        let md = "# T\n\n```js\nconsole.log(1);\n```\n";
        let sections = walk(md);
        let code = sections.iter().find(|s| s.kind == SectionKind::Code).unwrap();
        assert!(md[code.range.clone()].contains("console.log(1);"));
    }
}
