//! Analysis collaborator contract.

use async_trait::async_trait;

use crate::error::AnalyzeResult;
use crate::model::PageAnalysis;

/// Contract for "given a URL, return page content".
///
/// Used both by the top-level scraping flow and by plan actions that
/// request analysis mid-plan. Implementations must fail only when the root
/// page cannot be retrieved; missing sub-resources are omitted from the
/// aggregate content instead.
#[async_trait]
pub trait SiteAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str) -> AnalyzeResult<PageAnalysis>;
}
