//! Content processing pipeline: turns fetched bytes into clean Markdown.
//!
//! HTML pages run through [`html::run`] (render policy -> content extraction
//! -> link extraction -> sanitize -> [`convert`]); already-Markdown or
//! plain-text content (from the source-host or file fetchers) runs through
//! the lighter [`markdown::run`]. Both converge on the same cleanup passes
//! in [`cleanup`].

mod cleanup;
pub mod context;
pub mod convert;
pub mod credentials;
pub mod html;
pub mod markdown;
pub mod render;
pub mod sanitize;

pub use context::{MiddlewareFlow, PipelineContext};
pub use credentials::{extract_credentials, should_attach_auth, Credentials};
pub use render::{apply_rendering_policy, NullRenderer, Renderer};

use docsforge_shared::Result;

/// Run the appropriate pipeline for `ctx` based on whether its raw content
/// looks like HTML, dispatching to [`html::run`] or [`markdown::run`].
pub async fn process(ctx: &mut PipelineContext, renderer: &dyn Renderer, mime_type: &str) -> Result<()> {
    if is_html_mime(mime_type) {
        html::run(ctx, renderer).await
    } else {
        markdown::run(ctx);
        Ok(())
    }
}

fn is_html_mime(mime_type: &str) -> bool {
    mime_type.starts_with("text/html") || mime_type.starts_with("application/xhtml")
}
