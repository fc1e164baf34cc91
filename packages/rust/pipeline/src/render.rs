//! Rendering trait and the rendering-policy resolution for `ScrapeMode`.
//!
//! No headless-browser crate is part of this workspace's dependency
//! footprint, so `NullRenderer` is the only concrete implementation: it
//! returns the input unchanged, equivalent to `ScrapeMode::Fetch`. A real
//! browser-backed renderer can be dropped in later behind the same trait
//! without touching the rest of the pipeline.

use async_trait::async_trait;
use docsforge_shared::{Result, ScrapeMode};
use tracing::warn;

/// Renders HTML through a browser-equivalent context, returning the final
/// serialized HTML after scripts have run and loading indicators settled.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, html: &str, source_url: &str) -> Result<String>;

    /// Whether this renderer is actually available for use right now.
    fn is_available(&self) -> bool;
}

/// Renderer that performs no rendering; available unconditionally so
/// [`ScrapeMode::Auto`] always has somewhere to fall back to.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

#[async_trait]
impl Renderer for NullRenderer {
    async fn render(&self, html: &str, _source_url: &str) -> Result<String> {
        Ok(html.to_string())
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Decide whether a fetched page should be passed through `renderer`,
/// given the requested [`ScrapeMode`]. Errors from the renderer never fail
/// the pipeline: they're logged and the pre-render HTML is kept.
pub async fn apply_rendering_policy(
    mode: ScrapeMode,
    renderer: &dyn Renderer,
    html: &str,
    source_url: &str,
    errors: &mut Vec<String>,
) -> String {
    let should_render = match mode {
        ScrapeMode::Fetch => false,
        ScrapeMode::Playwright => true,
        ScrapeMode::Auto => renderer.is_available(),
    };

    if !should_render {
        return html.to_string();
    }

    match renderer.render(html, source_url).await {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!(url = %source_url, error = %e, "rendering failed, using pre-render HTML");
            errors.push(format!("render({source_url}): {e}"));
            html.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_mode_never_renders() {
        let mut errors = Vec::new();
        let out =
            apply_rendering_policy(ScrapeMode::Fetch, &NullRenderer, "<p>x</p>", "u", &mut errors)
                .await;
        assert_eq!(out, "<p>x</p>");
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn auto_mode_falls_back_when_renderer_unavailable() {
        let mut errors = Vec::new();
        let out =
            apply_rendering_policy(ScrapeMode::Auto, &NullRenderer, "<p>x</p>", "u", &mut errors)
                .await;
        assert_eq!(out, "<p>x</p>");
        assert!(errors.is_empty());
    }

    struct AlwaysFailRenderer;

    #[async_trait]
    impl Renderer for AlwaysFailRenderer {
        async fn render(&self, _html: &str, _source_url: &str) -> Result<String> {
            Err(docsforge_shared::Error::processing_failed("u", "render boom"))
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn playwright_mode_keeps_pre_render_html_on_error() {
        let mut errors = Vec::new();
        let out = apply_rendering_policy(
            ScrapeMode::Playwright,
            &AlwaysFailRenderer,
            "<p>original</p>",
            "https://example.com",
            &mut errors,
        )
        .await;
        assert_eq!(out, "<p>original</p>");
        assert_eq!(errors.len(), 1);
    }
}
