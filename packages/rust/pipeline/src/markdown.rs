//! Pipeline for content that's already Markdown or plain text (e.g. output
//! from the GitHub source-host fetcher, or a `.md` file fetched directly).
//! No HTML conversion is needed; only title extraction and the cleanup pass
//! chain run.

use crate::cleanup;
use crate::context::PipelineContext;

/// Run the Markdown/plain-text pipeline: extract a title from the first H1
/// if one isn't already set, then apply the same cleanup passes the HTML
/// pipeline applies after conversion.
pub fn run(ctx: &mut PipelineContext) {
    let base_url = url::Url::parse(&ctx.source_url).ok();
    ctx.markdown = cleanup::run_pipeline(&ctx.raw_html, base_url.as_ref());

    if ctx.title.is_none() {
        ctx.title = ctx
            .markdown
            .lines()
            .find(|line| line.starts_with("# "))
            .map(|line| line.trim_start_matches('#').trim().to_string());
    }

    if ctx.title.is_none() {
        ctx.title = Some("Untitled".to_string());
    }
}
