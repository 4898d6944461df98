//! Stored project records.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use siteforge_analyze::PageAnalysis;
use siteforge_plan::Plan;

use crate::kv::KeyValueStore;

/// Well-known key holding the whole project collection.
pub const PROJECTS_KEY: &str = "siteforge-projects";

/// One file inside a stored project snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub path: String,
    pub content: String,
    pub written_at: DateTime<Utc>,
}

/// Durable local record of a previously generated file set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProject {
    /// Unique key within the store
    pub name: String,
    pub files: Vec<StoredFile>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Cached analysis reused as design context by later generations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PageAnalysis>,
    pub saved_at: DateTime<Utc>,
}

impl StoredProject {
    pub fn file_map(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|f| (f.path.clone(), f.content.clone()))
            .collect()
    }
}

/// Keyed store of project snapshots.
///
/// The whole collection is read-modify-written on every mutation; saving a
/// name fully replaces the prior record. Concurrent writers race and the
/// last one wins, which is acceptable for a cache.
pub struct ProjectStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProjectStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load_all(&self) -> BTreeMap<String, StoredProject> {
        let Some(raw) = self.store.get(PROJECTS_KEY) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(projects) => projects,
            Err(e) => {
                warn!("Discarding corrupt project collection: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn persist_all(&self, projects: &BTreeMap<String, StoredProject>) -> bool {
        match serde_json::to_string(projects) {
            Ok(serialized) => self.store.set(PROJECTS_KEY, &serialized),
            Err(e) => {
                warn!("Failed to serialize project collection: {}", e);
                false
            }
        }
    }

    /// Save a project snapshot, fully replacing any record with the same
    /// name.
    pub fn save(
        &self,
        name: &str,
        files: BTreeMap<String, String>,
        dependencies: Option<BTreeMap<String, String>>,
        dev_dependencies: Option<BTreeMap<String, String>>,
        analysis: Option<PageAnalysis>,
    ) -> bool {
        let now = Utc::now();
        let record = StoredProject {
            name: name.to_string(),
            files: files
                .into_iter()
                .map(|(path, content)| StoredFile {
                    path,
                    content,
                    written_at: now,
                })
                .collect(),
            dependencies: dependencies.unwrap_or_default(),
            dev_dependencies: dev_dependencies.unwrap_or_default(),
            analysis,
            saved_at: now,
        };

        let mut projects = self.load_all();
        projects.insert(name.to_string(), record);
        self.persist_all(&projects)
    }

    /// All stored projects, most recently saved first.
    pub fn list(&self) -> Vec<StoredProject> {
        let mut projects: Vec<StoredProject> = self.load_all().into_values().collect();
        projects.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        projects
    }

    pub fn get(&self, name: &str) -> Option<StoredProject> {
        self.load_all().remove(name)
    }

    pub fn get_analysis(&self, name: &str) -> Option<PageAnalysis> {
        self.get(name).and_then(|p| p.analysis)
    }

    pub fn delete(&self, name: &str) -> bool {
        let mut projects = self.load_all();
        if projects.remove(name).is_none() {
            return false;
        }
        self.persist_all(&projects)
    }

    pub fn clear(&self) -> bool {
        self.store.delete(PROJECTS_KEY)
    }

    /// Merge a stored project's file set with a new plan; the new plan
    /// wins on path conflicts. Unknown names merge against nothing.
    pub fn combine(&self, name: &str, new_plan: Plan) -> Plan {
        let stored_files = self
            .get(name)
            .map(|p| p.file_map())
            .unwrap_or_default();
        siteforge_plan::combine(stored_files, new_plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn store() -> ProjectStore {
        ProjectStore::new(Arc::new(MemoryStore::new()))
    }

    fn files(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn save_and_list() {
        let store = store();
        assert!(store.save("p1", files(&[("a.txt", "x")]), None, None, None));

        let projects = store.list();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "p1");
        assert_eq!(projects[0].files[0].path, "a.txt");
    }

    #[test]
    fn resave_fully_replaces_the_record() {
        let store = store();
        store.save("p1", files(&[("a.txt", "old"), ("b.txt", "x")]), None, None, None);
        store.save("p1", files(&[("c.txt", "new")]), None, None, None);

        let projects = store.list();
        assert_eq!(projects.len(), 1);
        let map = projects[0].file_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("c.txt").unwrap(), "new");
    }

    #[test]
    fn delete_and_clear() {
        let store = store();
        store.save("p1", files(&[("a.txt", "x")]), None, None, None);
        store.save("p2", files(&[("b.txt", "y")]), None, None, None);

        assert!(store.delete("p1"));
        assert!(!store.delete("p1"));
        assert_eq!(store.list().len(), 1);

        assert!(store.clear());
        assert!(store.list().is_empty());
    }

    #[test]
    fn cached_analysis_round_trips() {
        let store = store();
        let analysis = PageAnalysis::from_markup("https://example.com", "<p>hi</p>");
        store.save("p1", files(&[]), None, None, Some(analysis));

        let cached = store.get_analysis("p1").unwrap();
        assert_eq!(cached.base_url, "https://example.com");
        assert!(store.get_analysis("unknown").is_none());
    }

    #[test]
    fn combine_new_plan_wins_on_conflict() {
        let store = store();
        store.save("p1", files(&[("a.txt", "old")]), None, None, None);

        let new_plan = Plan {
            files: files(&[("a.txt", "new"), ("b.txt", "x")]),
            ..Plan::default()
        };
        let merged = store.combine("p1", new_plan);

        assert_eq!(merged.files.get("a.txt").unwrap(), "new");
        assert_eq!(merged.files.get("b.txt").unwrap(), "x");
    }

    #[test]
    fn storage_failure_is_reported_as_boolean() {
        let temp = tempfile::tempdir().unwrap();
        let blocking_file = temp.path().join("occupied");
        std::fs::write(&blocking_file, "x").unwrap();

        let store = ProjectStore::new(Arc::new(crate::kv::JsonFileStore::new(&blocking_file)));
        assert!(!store.save("p1", files(&[("a.txt", "x")]), None, None, None));
        assert!(store.list().is_empty());
    }
}
