//! Chrome removal and attribute sanitization applied to extracted content
//! HTML before Markdown conversion. No HTML-sanitizer crate appears anywhere
//! in the dependency pack, so this is a small selector-driven scrubber built
//! directly on `scraper`, matching the way the old content-extraction code
//! already leaned on `scraper::Selector`.

use scraper::{Html, Selector};

const CHROME_SELECTORS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "iframe",
    "[aria-hidden=\"true\"]", ".sidebar", ".toc", ".table-of-contents", ".breadcrumbs",
    ".ad", ".ads", ".advertisement", "[class*=\"advert\"]", ".modal", ".popup",
    "[role=\"dialog\"]",
];

const DANGEROUS_ATTR_PREFIXES: &[&str] = &["on"];
const DANGEROUS_HREF_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:"];

/// Extract the main content HTML, stripping chrome (nav, header, footer, ads,
/// modals, etc.) plus any caller-supplied `exclude_selectors`.
pub fn extract_content_html(html: &str, exclude_selectors: &[String]) -> String {
    let doc = Html::parse_document(html);

    const CONTENT_SELECTORS: &[&str] = &[
        "article .markdown",
        ".vp-doc",
        ".markdown-section",
        "[role=\"main\"]",
        "article",
        "main",
        ".content",
    ];

    for sel_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return sanitize_html(&el.inner_html(), exclude_selectors);
            }
        }
    }

    if let Ok(body_sel) = Selector::parse("body") {
        if let Some(body) = doc.select(&body_sel).next() {
            return sanitize_html(&body.inner_html(), exclude_selectors);
        }
    }

    sanitize_html(html, exclude_selectors)
}

/// Remove chrome elements and scrub dangerous attributes/links from a content
/// HTML fragment. `scraper` has no mutation API, so chrome removal is done by
/// computing each chrome element's outer HTML and deleting it textually; this
/// mirrors how the table-to-markdown pass below already replaces element HTML
/// by substring.
pub fn sanitize_html(html: &str, exclude_selectors: &[String]) -> String {
    let chrome_removed = strip_chrome(html, exclude_selectors);
    strip_dangerous_attributes(&chrome_removed)
}

/// Remove the built-in chrome selectors plus any caller-supplied
/// `exclude_selectors` from `html`, leaving attribute scrubbing to the
/// caller.
pub fn strip_chrome(html: &str, exclude_selectors: &[String]) -> String {
    let mut result = html.to_string();

    let doc = Html::parse_fragment(&result);
    let extra = exclude_selectors.iter().map(String::as_str);
    for sel_str in CHROME_SELECTORS.iter().copied().chain(extra) {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };
        for el in doc.select(&selector) {
            let outer = el.html();
            result = result.replacen(&outer, "", 1);
        }
    }

    result
}

/// Strip `on*` event-handler attributes and `javascript:`/`data:`/`vbscript:`
/// href/src values. Operates at the string level since `scraper` trees are
/// read-only.
fn strip_dangerous_attributes(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let Some(gt) = rest[lt..].find('>') else {
            out.push_str(&rest[lt..]);
            break;
        };
        let tag = &rest[lt..lt + gt + 1];
        out.push_str(&scrub_tag(tag));
        rest = &rest[lt + gt + 1..];
    }
    out.push_str(rest);
    out
}

fn scrub_tag(tag: &str) -> String {
    if !tag.starts_with('<') || tag.starts_with("</") {
        return tag.to_string();
    }

    let inner = &tag[1..tag.len() - 1];
    let mut parts = inner.split_whitespace();
    let Some(name) = parts.next() else {
        return tag.to_string();
    };

    let mut kept = vec![name.to_string()];
    for attr in split_attributes(&inner[name.len()..]) {
        let lower = attr.to_lowercase();
        let attr_name = lower.split('=').next().unwrap_or("").trim();

        if DANGEROUS_ATTR_PREFIXES.iter().any(|p| attr_name.starts_with(p)) {
            continue;
        }
        if (attr_name == "href" || attr_name == "src")
            && DANGEROUS_HREF_SCHEMES.iter().any(|s| lower.contains(s))
        {
            continue;
        }
        kept.push(attr.to_string());
    }

    format!("<{}>", kept.join(" "))
}

fn split_attributes(s: &str) -> Vec<String> {
    let mut attrs = Vec::new();
    let mut chars = s.trim().chars().peekable();
    let mut current = String::new();
    let mut in_quotes: Option<char> = None;

    while let Some(c) = chars.next() {
        match in_quotes {
            Some(q) if c == q => {
                current.push(c);
                in_quotes = None;
            }
            Some(_) => current.push(c),
            None => {
                if c == '"' || c == '\'' {
                    in_quotes = Some(c);
                    current.push(c);
                } else if c.is_whitespace() {
                    if !current.is_empty() {
                        attrs.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(c);
                }
            }
        }
    }
    if !current.is_empty() {
        attrs.push(current);
    }
    attrs
}
