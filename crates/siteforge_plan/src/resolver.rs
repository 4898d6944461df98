//! Plan action resolution.
//!
//! Expands the high-level actions embedded in a plan into concrete file
//! writes and dependency additions by invoking the analysis collaborator.
//! Actions are processed in order against an accumulating output plan; any
//! analyzer failure aborts the whole resolution so a half-resolved plan is
//! never applied.

use tracing::{debug, warn};

use siteforge_analyze::{PageAnalysis, SiteAnalyzer};

use crate::error::{PlanError, PlanResult};
use crate::model::{ActionKind, Plan};
use crate::scaffold::{
    design_summary, page_component, stylesheet, DESIGN_SUMMARY_PATH, POSTCSS_CONFIG,
    POSTCSS_CONFIG_PATH, STYLESHEET_PATH, STYLING_DEV_DEPENDENCIES, TAILWIND_CONFIG,
    TAILWIND_CONFIG_PATH,
};

/// A plan with all actions resolved, plus the design context recorded by
/// the last analyzing action for reuse across later generation turns.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub plan: Plan,
    pub design_context: Option<PageAnalysis>,
}

/// Resolve every action in `plan`, in order.
pub async fn resolve_actions(
    mut plan: Plan,
    analyzer: &dyn SiteAnalyzer,
) -> PlanResult<ResolvedPlan> {
    let actions = std::mem::take(&mut plan.actions);
    let mut design_context = None;

    for action in &actions {
        match action.kind {
            ActionKind::RequestAnalysis => {
                let Some(url) = action.url.as_deref() else {
                    warn!("requestAnalysis action without a URL, skipping");
                    continue;
                };
                let analysis = analyze(analyzer, "requestAnalysis", url).await?;
                ensure_styling_toolchain(&mut plan);
                plan.files
                    .insert(DESIGN_SUMMARY_PATH.to_string(), design_summary(&analysis));
                design_context = Some(analysis);
            }
            ActionKind::WriteAnalyzed => {
                if let Some(url) = action.url.as_deref() {
                    let analysis = analyze(analyzer, "writeAnalyzed", url).await?;
                    let destination = action.destination().to_string();
                    debug!("Materializing {} from {}", destination, analysis.base_url);
                    plan.files.insert(
                        destination,
                        page_component(&analysis.full_html, &analysis.full_js),
                    );
                    plan.files.insert(
                        STYLESHEET_PATH.to_string(),
                        stylesheet(&analysis.full_css, &analysis.base_url),
                    );
                    ensure_styling_toolchain(&mut plan);
                    plan.files
                        .insert(DESIGN_SUMMARY_PATH.to_string(), design_summary(&analysis));
                    design_context = Some(analysis);
                } else if let Some(content) = &action.content {
                    plan.files
                        .insert(action.destination().to_string(), content.clone());
                    ensure_styling_toolchain(&mut plan);
                } else {
                    debug!("writeAnalyzed action with neither URL nor content, skipping");
                }
            }
            ActionKind::Unknown => {
                warn!("Ignoring unrecognized plan action");
            }
        }
    }

    Ok(ResolvedPlan {
        plan,
        design_context,
    })
}

async fn analyze(
    analyzer: &dyn SiteAnalyzer,
    action: &str,
    url: &str,
) -> PlanResult<PageAnalysis> {
    analyzer
        .analyze(url)
        .await
        .map_err(|e| PlanError::action(format!("{} {}", action, url), e.to_string()))
}

/// Add the utility-styling toolchain dependencies and configuration files
/// unless the plan already carries them.
fn ensure_styling_toolchain(plan: &mut Plan) {
    for (name, version) in STYLING_DEV_DEPENDENCIES {
        plan.dev_dependencies
            .entry((*name).to_string())
            .or_insert_with(|| (*version).to_string());
    }
    plan.files
        .entry(TAILWIND_CONFIG_PATH.to_string())
        .or_insert_with(|| TAILWIND_CONFIG.to_string());
    plan.files
        .entry(POSTCSS_CONFIG_PATH.to_string())
        .or_insert_with(|| POSTCSS_CONFIG.to_string());
}

/// Overlay `new_plan`'s files onto a previously stored file set; the new
/// plan wins on path conflicts. Used to let iterative generation turns add
/// to, rather than replace, an existing project.
pub fn combine(
    stored_files: std::collections::BTreeMap<String, String>,
    new_plan: Plan,
) -> Plan {
    let mut merged = stored_files;
    merged.extend(new_plan.files.clone());
    Plan {
        files: merged,
        ..new_plan
    }
}
