//! Integration tests for the sandbox lifecycle orchestrator, run against
//! the capturing mock collaborator.

use std::collections::BTreeMap;
use std::sync::Arc;

use siteforge_plan::Plan;
use siteforge_sandbox::{
    MockSandbox, SandboxError, SandboxOrchestrator, SessionStatus,
};

fn orchestrator(mock: &MockSandbox) -> SandboxOrchestrator {
    SandboxOrchestrator::new(Arc::new(mock.clone()))
}

fn plan_with_files(entries: &[(&str, &str)]) -> Plan {
    Plan {
        files: entries
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect(),
        ..Plan::default()
    }
}

#[tokio::test]
async fn apply_plan_runs_the_full_sequence_in_order() {
    let mock = MockSandbox::new();
    let plan = plan_with_files(&[("app/page.tsx", "export default function Page() {}")]);

    let session = orchestrator(&mock).apply_plan(&plan, None).await.unwrap();

    assert_eq!(session.status, SessionStatus::Running);
    assert_eq!(
        session.live_url.as_deref(),
        Some("https://3000-sbx-1.mock.dev")
    );

    let methods: Vec<String> = mock.calls().iter().map(|c| c.method.clone()).collect();
    let expected = [
        "create",
        "write_file", // manifest
        "write_file", // default layout
        "write_file", // plan file
        "run_command", // install
        "run_command", // build
        "start_command",
        "exposed_url",
    ];
    assert_eq!(methods, expected);

    let commands = mock.method_calls("run_command");
    assert!(commands[0].detail.contains("npm install"));
    assert!(commands[0].detail.contains("timeout=600s"));
    assert!(commands[1].detail.contains("npm run build"));
    assert!(commands[1].detail.contains("timeout=300s"));
    assert_eq!(mock.started_commands("sbx-1"), vec!["npm run start"]);
}

#[tokio::test]
async fn manifest_merges_plan_dependencies_over_baseline() {
    let mock = MockSandbox::new();
    let plan = Plan {
        dependencies: BTreeMap::from([("axios".to_string(), "^1.6.0".to_string())]),
        dev_dependencies: BTreeMap::from([("tailwindcss".to_string(), "^3.4.0".to_string())]),
        ..Plan::default()
    };

    orchestrator(&mock).apply_plan(&plan, None).await.unwrap();

    let files = mock.files("sbx-1");
    let manifest: serde_json::Value =
        serde_json::from_str(files.get("/home/user/package.json").unwrap()).unwrap();
    assert_eq!(manifest["dependencies"]["next"], "14.2.3");
    assert_eq!(manifest["dependencies"]["axios"], "^1.6.0");
    assert_eq!(manifest["devDependencies"]["tailwindcss"], "^3.4.0");
}

#[tokio::test]
async fn default_layout_is_only_written_when_missing() {
    let mock = MockSandbox::new();
    let plan = plan_with_files(&[("app/layout.tsx", "custom layout")]);

    orchestrator(&mock).apply_plan(&plan, None).await.unwrap();

    let files = mock.files("sbx-1");
    assert_eq!(files.get("/home/user/app/layout.tsx").unwrap(), "custom layout");
}

#[tokio::test]
async fn reapply_reconnects_and_refreshes_the_timeout() {
    let mock = MockSandbox::new();
    let orchestrator = orchestrator(&mock);

    let first = orchestrator
        .apply_plan(&plan_with_files(&[("a.txt", "1")]), None)
        .await
        .unwrap();

    orchestrator
        .apply_plan(&plan_with_files(&[("b.txt", "2")]), Some(&first.session_id))
        .await
        .unwrap();

    // Exactly one session was ever created.
    assert_eq!(mock.method_calls("create").len(), 1);
    let connects = mock.method_calls("connect");
    assert_eq!(connects.len(), 1);
    assert!(connects[0].detail.contains("timeout=900s"));
    assert_eq!(mock.method_calls("set_timeout").len(), 1);
}

#[tokio::test]
async fn second_apply_with_disjoint_files_yields_the_union() {
    let mock = MockSandbox::new();
    let orchestrator = orchestrator(&mock);

    let first = orchestrator
        .apply_plan(&plan_with_files(&[("app/page.tsx", "home")]), None)
        .await
        .unwrap();
    orchestrator
        .apply_plan(
            &plan_with_files(&[("app/about/page.tsx", "about")]),
            Some(&first.session_id),
        )
        .await
        .unwrap();

    let extracted = orchestrator.extract_files(&first.session_id).await.unwrap();
    assert_eq!(extracted.get("app/page.tsx").unwrap(), "home");
    assert_eq!(extracted.get("app/about/page.tsx").unwrap(), "about");
}

#[tokio::test]
async fn explicit_deletes_remove_files_and_failures_are_non_fatal() {
    let mock = MockSandbox::new();
    let orchestrator = orchestrator(&mock);

    let first = orchestrator
        .apply_plan(&plan_with_files(&[("old.txt", "x"), ("kept.txt", "y")]), None)
        .await
        .unwrap();

    let plan = Plan {
        delete: vec!["old.txt".to_string(), "never-existed.txt".to_string()],
        ..Plan::default()
    };
    let session = orchestrator
        .apply_plan(&plan, Some(&first.session_id))
        .await
        .unwrap();

    assert_eq!(session.status, SessionStatus::Running);
    let files = mock.files(&first.session_id);
    assert!(!files.contains_key("/home/user/old.txt"));
    assert!(files.contains_key("/home/user/kept.txt"));
}

#[tokio::test]
async fn file_write_failure_aborts_the_apply() {
    let mock = MockSandbox::new();
    mock.fail_write("app/broken.tsx");

    let plan = plan_with_files(&[("app/broken.tsx", "x"), ("app/ok.tsx", "y")]);
    let err = orchestrator(&mock).apply_plan(&plan, None).await.unwrap_err();

    match err {
        SandboxError::Step { step, .. } => assert!(step.contains("app/broken.tsx")),
        other => panic!("unexpected error: {}", other),
    }
    // Neither install nor build ran.
    assert!(mock.method_calls("run_command").is_empty());
}

#[tokio::test]
async fn install_failure_surfaces_the_step_name() {
    let mock = MockSandbox::new();
    mock.fail_command_containing("npm install");

    let err = orchestrator(&mock)
        .apply_plan(&Plan::default(), None)
        .await
        .unwrap_err();

    match err {
        SandboxError::Step { step, .. } => assert_eq!(step, "install dependencies"),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(mock.method_calls("run_command").len(), 1);
    assert!(mock.method_calls("start_command").is_empty());
}

#[tokio::test]
async fn reconnect_to_an_unavailable_session_fails_without_side_effects() {
    let mock = MockSandbox::new();
    mock.make_unreachable("sbx-gone");

    let err = orchestrator(&mock)
        .apply_plan(&Plan::default(), Some("sbx-gone"))
        .await
        .unwrap_err();

    match err {
        SandboxError::Step { step, source } => {
            assert_eq!(step, "reconnect session");
            assert!(matches!(*source, SandboxError::SessionUnavailable(_)));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(mock.method_calls("write_file").is_empty());
}

#[tokio::test]
async fn check_status_reports_inactive_without_raising() {
    let mock = MockSandbox::new();
    mock.make_unreachable("sbx-gone");
    let orchestrator = orchestrator(&mock);

    let health = orchestrator.check_status("sbx-gone").await;
    assert!(!health.active);
    assert!(health.error.is_some());

    // The probe uses the short status timeout, not the session timeout.
    let connects = mock.method_calls("connect");
    assert!(connects[0].detail.contains("timeout=30s"));
}

#[tokio::test]
async fn check_status_reports_active_sessions() {
    let mock = MockSandbox::new();
    let orchestrator = orchestrator(&mock);
    let session = orchestrator.apply_plan(&Plan::default(), None).await.unwrap();

    let health = orchestrator.check_status(&session.session_id).await;
    assert!(health.active);
    assert!(health.error.is_none());
}

#[tokio::test]
async fn extract_files_excludes_caches_and_hidden_paths() {
    let mock = MockSandbox::new();
    mock.seed_file("sbx-seeded", "/home/user/app/page.tsx", "page");
    mock.seed_file("sbx-seeded", "/home/user/node_modules/react/index.js", "lib");
    mock.seed_file("sbx-seeded", "/home/user/.next/trace", "trace");
    mock.seed_file("sbx-seeded", "/home/user/.env.local", "secret");

    let files = orchestrator(&mock).extract_files("sbx-seeded").await.unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files.get("app/page.tsx").unwrap(), "page");
}

#[tokio::test]
async fn extract_files_normalizes_json_formatting() {
    let mock = MockSandbox::new();
    mock.seed_file(
        "sbx-seeded",
        "/home/user/tsconfig.json",
        r#"{"compilerOptions":{"strict":true}}"#,
    );

    let files = orchestrator(&mock).extract_files("sbx-seeded").await.unwrap();
    let normalized = files.get("tsconfig.json").unwrap();
    assert!(normalized.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(normalized).unwrap();
    assert_eq!(parsed["compilerOptions"]["strict"], true);
}

#[tokio::test]
async fn corrupt_root_manifest_is_replaced_with_the_baseline() {
    let mock = MockSandbox::new();
    mock.seed_file("sbx-seeded", "/home/user/package.json", "{not valid json");
    mock.seed_file("sbx-seeded", "/home/user/data.json", "{also broken");

    let files = orchestrator(&mock).extract_files("sbx-seeded").await.unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(files.get("package.json").unwrap()).unwrap();
    assert_eq!(manifest["name"], "nextjs-app");
    assert_eq!(manifest["dependencies"]["next"], "14.2.3");

    // Other corrupt JSON files pass through untouched.
    assert_eq!(files.get("data.json").unwrap(), "{also broken");
}

#[tokio::test]
async fn process_files_wraps_content_in_base64_envelopes() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let mock = MockSandbox::new();
    mock.seed_file("sbx-seeded", "/home/user/app/page.tsx", "hello");

    let processed = orchestrator(&mock).process_files("sbx-seeded").await.unwrap();
    let encoded = processed.get("app/page.tsx").unwrap();

    assert_eq!(encoded.encoding, "base64");
    assert_eq!(
        STANDARD.decode(&encoded.content).unwrap(),
        b"hello".to_vec()
    );
}

#[tokio::test]
async fn extract_from_unavailable_session_is_an_error() {
    let mock = MockSandbox::new();
    mock.make_unreachable("sbx-gone");

    let err = orchestrator(&mock).extract_files("sbx-gone").await.unwrap_err();
    assert!(matches!(err, SandboxError::Step { .. }));
}
