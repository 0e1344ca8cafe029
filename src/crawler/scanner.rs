//! Streaming link extractor
//!
//! Scans the document with `lol_html` element handlers instead of building a
//! tree. Faster, but gives up on input the streaming tokenizer rejects, in
//! which case no links are returned for the page.

use crate::crawler::parser::{decode_lossy, resolve_links, LinkExtractor};
use lol_html::{element, HtmlRewriter, Settings};

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingExtractor;

impl LinkExtractor for StreamingExtractor {
    fn extract(&self, html: &[u8], base_url: &str) -> Vec<String> {
        match scan_hrefs(&decode_lossy(html)) {
            Ok(hrefs) => resolve_links(hrefs, base_url),
            Err(e) => {
                tracing::debug!("Streaming scan of {} failed: {}", base_url, e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "fast"
    }
}

/// Collects raw `href` values of `<a>` elements in document order
fn scan_hrefs(html: &str) -> Result<Vec<String>, lol_html::errors::RewritingError> {
    let mut hrefs = Vec::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("a[href]", |el| {
                if let Some(href) = el.get_attribute("href") {
                    hrefs.push(href);
                }
                Ok(())
            })],
            ..Settings::new()
        },
        |_: &[u8]| {},
    );

    rewriter.write(html.as_bytes())?;
    rewriter.end()?;

    Ok(hrefs)
}
