//! HTTP implementation of the analysis collaborator.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::{debug, info, warn};
use url::Url;

use crate::analyzer::SiteAnalyzer;
use crate::detect::{detect_animation_library, guess_technologies, is_cdn_url};
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::extract::extract_document;
use crate::model::{AnimationFile, PageAnalysis};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Analyzer that fetches the page and its sub-resources over HTTP.
pub struct HttpAnalyzer {
    client: reqwest::Client,
}

impl Default for HttpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAnalyzer {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Prepend `https://` when the scheme is missing.
    fn normalize_url(url: &str) -> String {
        let trimmed = url.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            ));
        }

        response.text().await.map_err(|e| e.to_string())
    }

    /// Fetch a set of sub-resources concurrently. Failures are logged and
    /// omitted; each surviving entry keeps its source URL.
    async fn fetch_all(&self, urls: &[String]) -> Vec<(String, String)> {
        let fetches = urls.iter().map(|url| async move {
            match self.fetch_text(url).await {
                Ok(content) => Some((url.clone(), content)),
                Err(e) => {
                    warn!("Skipping sub-resource {}: {}", url, e);
                    None
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }
}

#[async_trait]
impl SiteAnalyzer for HttpAnalyzer {
    async fn analyze(&self, url: &str) -> AnalyzeResult<PageAnalysis> {
        let normalized = Self::normalize_url(url);
        let parsed =
            Url::parse(&normalized).map_err(|_| AnalyzeError::InvalidUrl(normalized.clone()))?;
        let base_url = parsed.origin().ascii_serialization();

        info!("Analyzing {}", normalized);

        let root_html = self
            .fetch_text(&normalized)
            .await
            .map_err(|e| AnalyzeError::fetch(&normalized, e))?;

        let doc = extract_document(&root_html, &parsed);
        debug!(
            "Found {} stylesheets, {} scripts, {} class tokens",
            doc.stylesheet_urls.len(),
            doc.script_urls.len(),
            doc.used_classes.len()
        );

        let css_fetches = self.fetch_all(&doc.stylesheet_urls).await;
        let js_fetches = self.fetch_all(&doc.script_urls).await;

        // External sheets in document order, then inline blocks.
        let full_css = css_fetches
            .iter()
            .map(|(url, content)| format!("/* From: {} */\n{}", url, content))
            .chain(
                doc.inline_styles
                    .iter()
                    .enumerate()
                    .map(|(i, css)| format!("/* Inline style {} */\n{}", i + 1, css)),
            )
            .collect::<Vec<_>>()
            .join("\n\n");

        let full_js = js_fetches
            .iter()
            .map(|(url, content)| format!("/* From: {} */\n{}", url, content))
            .chain(
                doc.inline_scripts
                    .iter()
                    .enumerate()
                    .map(|(i, js)| format!("/* Inline script {} */\n{}", i + 1, js)),
            )
            .collect::<Vec<_>>()
            .join("\n\n");

        let animation_files: Vec<AnimationFile> = js_fetches
            .iter()
            .filter_map(|(url, content)| {
                detect_animation_library(content).map(|m| AnimationFile {
                    url: url.clone(),
                    content: content.clone(),
                    library: Some(m.library),
                    confidence: m.confidence,
                })
            })
            .collect();

        let required_cdn_urls = doc
            .stylesheet_urls
            .iter()
            .chain(doc.script_urls.iter())
            .filter(|u| is_cdn_url(u))
            .cloned()
            .collect();

        let animation_libraries: Vec<String> = animation_files
            .iter()
            .filter_map(|f| f.library.clone())
            .collect();
        let tech_guesses = guess_technologies(&full_css, &full_js, &animation_libraries);

        info!(
            "Analysis of {} complete: {} chars CSS, {} chars JS, {} animation files",
            base_url,
            full_css.len(),
            full_js.len(),
            animation_files.len()
        );

        Ok(PageAnalysis {
            base_url,
            title: doc.title,
            description: doc.description,
            full_html: doc.body_html,
            full_css,
            full_js,
            used_classes: doc.used_classes,
            animation_files,
            required_cdn_urls,
            tech_guesses,
        })
    }
}
