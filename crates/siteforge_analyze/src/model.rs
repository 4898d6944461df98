//! Analysis result types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A fetched script flagged as belonging to an animation library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationFile {
    /// Resolved URL the script was fetched from
    pub url: String,
    /// Raw script content
    pub content: String,
    /// Detected library name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    /// Detection confidence, 0-100
    pub confidence: u8,
}

/// Result of analyzing one URL.
///
/// Immutable once returned. The `full_css`/`full_js` aggregates preserve
/// source order: external resources in document order first, then inline
/// blocks in document order, so the same input document always yields the
/// same aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    /// Origin of the analyzed page, e.g. `https://example.com`
    #[serde(rename = "baseURL")]
    pub base_url: String,
    /// Document title
    pub title: String,
    /// Content of the `meta[name="description"]` tag, or empty
    pub description: String,
    /// Serialized body markup
    #[serde(rename = "fullHTML")]
    pub full_html: String,
    /// Concatenation of all discovered stylesheet content
    #[serde(rename = "fullCSS")]
    pub full_css: String,
    /// Concatenation of all discovered script content
    #[serde(rename = "fullJS")]
    pub full_js: String,
    /// CSS class tokens found in the markup
    #[serde(default)]
    pub used_classes: BTreeSet<String>,
    /// Fetched scripts recognized as animation libraries
    #[serde(default)]
    pub animation_files: Vec<AnimationFile>,
    /// External resource URLs flagged as CDN-hosted
    #[serde(default)]
    pub required_cdn_urls: Vec<String>,
    /// Inferred technology names
    #[serde(default)]
    pub tech_guesses: Vec<String>,
}

impl PageAnalysis {
    /// A minimal analysis carrying only markup and origin, used when a plan
    /// action supplies literal content instead of a URL.
    pub fn from_markup(base_url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            title: String::new(),
            description: String::new(),
            full_html: html.into(),
            full_css: String::new(),
            full_js: String::new(),
            used_classes: BTreeSet::new(),
            animation_files: Vec::new(),
            required_cdn_urls: Vec::new(),
            tech_guesses: Vec::new(),
        }
    }
}
