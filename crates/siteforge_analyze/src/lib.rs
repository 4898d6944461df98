//! # siteforge_analyze
//!
//! Website analysis collaborator for siteforge.
//!
//! Given a URL, produces a [`PageAnalysis`]: the page's serialized markup,
//! every discovered stylesheet and script (external resources in document
//! order, then inline blocks), the CSS class tokens used by the markup,
//! detected animation libraries, and flagged CDN resources.
//!
//! The root page must be reachable; missing sub-resources degrade
//! gracefully and are simply omitted from the aggregate content.

pub mod analyzer;
pub mod detect;
pub mod error;
pub mod extract;
pub mod http;
pub mod model;

pub use analyzer::SiteAnalyzer;
pub use error::{AnalyzeError, AnalyzeResult};
pub use http::HttpAnalyzer;
pub use model::{AnimationFile, PageAnalysis};
