//! DOM extraction for analysis.
//!
//! All parsing happens here, synchronously, so the analyzer can fetch
//! sub-resources afterwards without holding the parsed document.

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use url::Url;

/// Everything the analyzer needs from the root document, in source order.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    pub title: String,
    pub description: String,
    pub body_html: String,
    /// Resolved external stylesheet URLs, document order
    pub stylesheet_urls: Vec<String>,
    /// Inline `<style>` blocks, document order
    pub inline_styles: Vec<String>,
    /// Resolved external script URLs, document order
    pub script_urls: Vec<String>,
    /// Inline `<script>` blocks, document order
    pub inline_scripts: Vec<String>,
    pub used_classes: BTreeSet<String>,
}

/// Parse the root document and pull out metadata, markup, resource URLs
/// and class tokens. Unresolvable resource URLs are skipped.
pub fn extract_document(html: &str, base: &Url) -> ExtractedDocument {
    let document = Html::parse_document(html);

    let title_sel = Selector::parse("title").unwrap();
    let description_sel = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let body_sel = Selector::parse("body").unwrap();
    let stylesheet_sel = Selector::parse(r#"link[rel="stylesheet"]"#).unwrap();
    let style_sel = Selector::parse("style").unwrap();
    let script_sel = Selector::parse("script").unwrap();
    let class_sel = Selector::parse("[class]").unwrap();

    let title = document
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let description = document
        .select(&description_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    let body_html = document
        .select(&body_sel)
        .next()
        .map(|el| el.inner_html())
        .unwrap_or_default();

    let stylesheet_urls = document
        .select(&stylesheet_sel)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .map(|u| u.to_string())
        .collect();

    let inline_styles = document
        .select(&style_sel)
        .map(|el| el.text().collect::<String>())
        .filter(|css| !css.trim().is_empty())
        .collect();

    let mut script_urls = Vec::new();
    let mut inline_scripts = Vec::new();
    for el in document.select(&script_sel) {
        match el.value().attr("src") {
            Some(src) => {
                if let Ok(resolved) = base.join(src) {
                    script_urls.push(resolved.to_string());
                }
            }
            None => {
                let js = el.text().collect::<String>();
                if !js.trim().is_empty() {
                    inline_scripts.push(js);
                }
            }
        }
    }

    let mut used_classes = BTreeSet::new();
    for el in document.select(&class_sel) {
        if let Some(classes) = el.value().attr("class") {
            for token in classes.split_whitespace() {
                used_classes.insert(token.to_string());
            }
        }
    }

    ExtractedDocument {
        title,
        description,
        body_html,
        stylesheet_urls,
        inline_styles,
        script_urls,
        inline_scripts,
        used_classes,
    }
}
