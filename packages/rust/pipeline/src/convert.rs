//! HTML-to-Markdown conversion: table preprocessing (manual, since `htmd`
//! doesn't convert tables) followed by `htmd` conversion and the cleanup
//! pass chain. Ported from the original Markdown-conversion crate this
//! workspace grew from.

use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use docsforge_shared::{Error, Result};

use crate::cleanup;

/// Convert already-sanitized content HTML into clean Markdown.
#[instrument(skip(content_html, source_url))]
pub fn html_to_markdown(content_html: &str, source_url: &str) -> Result<String> {
    let content_html = preprocess_tables(content_html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "nav", "iframe", "noscript", "svg"])
        .build();

    let raw_markdown = converter
        .convert(&content_html)
        .map_err(|e| Error::conversion(format!("htmd conversion failed: {e}")))?;

    debug!(raw_len = raw_markdown.len(), "htmd conversion complete");

    let base_url = Url::parse(source_url).ok();
    let cleaned = cleanup::run_pipeline(&raw_markdown, base_url.as_ref());

    Ok(cleaned)
}

/// Convert HTML `<table>` elements to Markdown table syntax before `htmd`
/// conversion (`htmd` 0.1 does not support tables).
pub(crate) fn preprocess_tables(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let table_sel = scraper::Selector::parse("table").unwrap();

    if doc.select(&table_sel).next().is_none() {
        return html.to_string();
    }

    let mut result = html.to_string();
    for table_el in doc.select(&table_sel) {
        let table_html = table_el.html();
        let md_table = html_table_to_markdown(&table_el);
        result = result.replacen(&table_html, &md_table, 1);
    }
    result
}

fn html_table_to_markdown(table: &scraper::ElementRef) -> String {
    let tr_sel = scraper::Selector::parse("tr").unwrap();
    let th_sel = scraper::Selector::parse("th").unwrap();
    let td_sel = scraper::Selector::parse("td").unwrap();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut has_header = false;

    for tr in table.select(&tr_sel) {
        let ths: Vec<String> = tr
            .select(&th_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        if !ths.is_empty() {
            has_header = true;
            rows.push(ths);
            continue;
        }

        let tds: Vec<String> = tr
            .select(&td_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        if !tds.is_empty() {
            rows.push(tds);
        }
    }

    if rows.is_empty() {
        return String::new();
    }

    let col_count = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    if col_count == 0 {
        return String::new();
    }

    for row in &mut rows {
        while row.len() < col_count {
            row.push(String::new());
        }
    }

    let mut md = String::from("\n\n");

    let header = &rows[0];
    md.push_str("| ");
    md.push_str(&header.join(" | "));
    md.push_str(" |\n");

    md.push_str("| ");
    md.push_str(&(0..col_count).map(|_| "---").collect::<Vec<_>>().join(" | "));
    md.push_str(" |\n");

    let data_start = if has_header { 1 } else { 0 };
    for row in &rows[data_start..] {
        md.push_str("| ");
        md.push_str(&row.join(" | "));
        md.push_str(" |\n");
    }

    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_and_paragraphs() {
        let html = "<h1>Hello World</h1><p>Some text.</p>";
        let md = html_to_markdown(html, "https://example.com/page").unwrap();
        assert!(md.contains("# Hello World"));
        assert!(md.contains("Some text."));
    }

    #[test]
    fn preserves_code_block_language() {
        let html = r#"<h1>Code</h1><pre><code class="language-rust">fn main() {}</code></pre>"#;
        let md = html_to_markdown(html, "https://example.com/code").unwrap();
        assert!(md.contains("```rust"));
    }

    #[test]
    fn converts_tables_to_markdown_syntax() {
        let html = r#"
            <table>
                <thead><tr><th>Name</th><th>Value</th></tr></thead>
                <tbody>
                    <tr><td>foo</td><td>bar</td></tr>
                </tbody>
            </table>"#;
        let md = html_to_markdown(html, "https://example.com/data").unwrap();
        assert!(md.contains("| Name | Value |"));
        assert!(md.contains("| foo | bar |"));
    }

    #[test]
    fn resolves_relative_links_against_source_url() {
        let html = r#"<p><a href="/guide/next">Next</a></p>"#;
        let md = html_to_markdown(html, "https://docs.example.com/guide/intro").unwrap();
        assert!(md.contains("https://docs.example.com/guide/next"));
    }
}
