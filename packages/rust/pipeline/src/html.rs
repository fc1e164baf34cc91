//! HTML page pipeline: render (policy-gated) -> extract content -> extract
//! links -> sanitize -> convert to Markdown. Link extraction is ported from
//! the crawler's original `extract_links`/`normalize_url` helpers.

use scraper::{Html, Selector};
use tracing::instrument;
use url::Url;

use docsforge_shared::Result;

use crate::context::PipelineContext;
use crate::render::Renderer;
use crate::{convert, sanitize};

/// Run the full HTML processing pipeline over `ctx.raw_html`, populating
/// `content_html`, `links`, `title`, and `markdown`. Non-fatal stage
/// failures append to `ctx.errors` rather than aborting the page.
#[instrument(skip(ctx, renderer), fields(url = %ctx.source_url))]
pub async fn run(ctx: &mut PipelineContext, renderer: &dyn Renderer) -> Result<()> {
    let rendered = crate::render::apply_rendering_policy(
        ctx.scrape_mode,
        renderer,
        &ctx.raw_html,
        &ctx.source_url,
        &mut ctx.errors,
    )
    .await;

    let base_url = Url::parse(&ctx.source_url).ok();
    ctx.links = base_url
        .as_ref()
        .map(|base| extract_links(&rendered, base))
        .unwrap_or_default();

    ctx.title = extract_title(&rendered);

    ctx.content_html = sanitize::extract_content_html(&rendered, &ctx.exclude_selectors);

    ctx.markdown = convert::html_to_markdown(&ctx.content_html, &ctx.source_url)?;

    if ctx.title.is_none() {
        ctx.title = extract_title_from_markdown(&ctx.markdown);
    }

    if ctx.title.is_none() {
        ctx.title = Some("Untitled".to_string());
    }

    Ok(())
}

/// Extract the page's title: `<title>` text first, falling back to the
/// first `<h1>`.
fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    if let Ok(title_sel) = Selector::parse("title") {
        if let Some(title) = doc
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
        {
            return Some(title);
        }
    }

    let h1_sel = Selector::parse("h1").ok()?;
    doc.select(&h1_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_title_from_markdown(md: &str) -> Option<String> {
    md.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches('#').trim().to_string())
}

/// Collect and resolve all anchor `href`s into absolute, fragment-stripped
/// URLs, skipping anchors, `javascript:`, and `mailto:` links.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for el in doc.select(&link_sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:") {
            continue;
        }
        if let Ok(mut resolved) = base_url.join(href) {
            resolved.set_fragment(None);
            links.push(resolved.to_string());
        }
    }
    links
}
