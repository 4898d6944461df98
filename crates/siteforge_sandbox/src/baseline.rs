//! Fixed project scaffold and lifecycle constants.

use std::time::Duration;

use serde_json::{json, Map, Value};

use siteforge_plan::Plan;

/// Project root inside the remote environment.
pub const PROJECT_ROOT: &str = "/home/user";
pub const MANIFEST_PATH: &str = "package.json";
pub const LAYOUT_PATH: &str = "app/layout.tsx";
/// Well-known port the started server listens on.
pub const APP_PORT: u16 = 3000;

/// Generous session expiry; auto-suspend preserves state between slow
/// interactive steps.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(900);
/// Status probes must never block on a stalled session.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(30);
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(300);

pub const INSTALL_COMMAND: &str = "npm install --no-audit --loglevel warn";
pub const BUILD_COMMAND: &str = "npm run build";
pub const START_COMMAND: &str = "npm run start";

pub const DEFAULT_LAYOUT: &str = r#"export default function RootLayout({ children }: { children: React.ReactNode }) {
  return <html lang="en"><body>{children}</body></html>;
}"#;

/// Minimal runnable manifest; every applied plan starts from this.
pub fn baseline_manifest() -> Value {
    json!({
        "name": "nextjs-app",
        "private": true,
        "scripts": {
            "dev": "next dev -p 3000 -H 0.0.0.0",
            "build": "next build",
            "start": "next start -p 3000 -H 0.0.0.0",
        },
        "dependencies": {
            "next": "14.2.3",
            "react": "18.2.0",
            "react-dom": "18.2.0",
        },
    })
}

/// Baseline manifest with the plan's dependency tables merged in. Plan
/// entries add to or override the baseline, never remove from it.
pub fn merged_manifest(plan: &Plan) -> String {
    let mut manifest = baseline_manifest();

    if !plan.dependencies.is_empty() {
        if let Some(deps) = manifest
            .get_mut("dependencies")
            .and_then(Value::as_object_mut)
        {
            for (name, version) in &plan.dependencies {
                deps.insert(name.clone(), Value::String(version.clone()));
            }
        }
    }

    if !plan.dev_dependencies.is_empty() {
        let dev_deps: Map<String, Value> = plan
            .dev_dependencies
            .iter()
            .map(|(name, version)| (name.clone(), Value::String(version.clone())))
            .collect();
        if let Some(obj) = manifest.as_object_mut() {
            obj.insert("devDependencies".to_string(), Value::Object(dev_deps));
        }
    }

    pretty(&manifest)
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Absolute path of a project-relative file inside the session.
pub fn absolute(path: &str) -> String {
    format!("{}/{}", PROJECT_ROOT, path.trim_start_matches("./"))
}

/// Whether an extracted path belongs to the project file set. Dependency
/// and build caches plus hidden top-level paths are excluded.
pub fn is_tracked(path: &str) -> bool {
    let clean = path.trim_start_matches("./");
    !clean.is_empty()
        && !clean.starts_with("node_modules/")
        && !clean.starts_with(".next/")
        && !clean.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn merged_manifest_is_additive() {
        let plan = Plan {
            dependencies: BTreeMap::from([("axios".to_string(), "^1.6.0".to_string())]),
            dev_dependencies: BTreeMap::from([("tailwindcss".to_string(), "^3.4.0".to_string())]),
            ..Plan::default()
        };

        let manifest: serde_json::Value =
            serde_json::from_str(&merged_manifest(&plan)).unwrap();
        assert_eq!(manifest["dependencies"]["next"], "14.2.3");
        assert_eq!(manifest["dependencies"]["axios"], "^1.6.0");
        assert_eq!(manifest["devDependencies"]["tailwindcss"], "^3.4.0");
    }

    #[test]
    fn empty_plan_keeps_the_baseline() {
        let manifest: serde_json::Value =
            serde_json::from_str(&merged_manifest(&Plan::default())).unwrap();
        assert_eq!(manifest["name"], "nextjs-app");
        assert!(manifest.get("devDependencies").is_none());
    }

    #[test]
    fn plan_may_override_a_baseline_version() {
        let plan = Plan {
            dependencies: BTreeMap::from([("next".to_string(), "15.0.0".to_string())]),
            ..Plan::default()
        };
        let manifest: serde_json::Value =
            serde_json::from_str(&merged_manifest(&plan)).unwrap();
        assert_eq!(manifest["dependencies"]["next"], "15.0.0");
        assert_eq!(manifest["dependencies"]["react"], "18.2.0");
    }

    #[test]
    fn tracked_path_filtering() {
        assert!(is_tracked("app/page.tsx"));
        assert!(is_tracked("./components/Header.tsx"));
        assert!(!is_tracked("node_modules/react/index.js"));
        assert!(!is_tracked("./.next/build-manifest.json"));
        assert!(!is_tracked(".env.local"));
        assert!(!is_tracked(""));
    }

    #[test]
    fn absolute_paths() {
        assert_eq!(absolute("app/page.tsx"), "/home/user/app/page.tsx");
        assert_eq!(absolute("./package.json"), "/home/user/package.json");
    }
}
