//! Deployment dispatch.
//!
//! Verifies a connection exists for the requested provider, hands the file
//! set to the matching adapter and normalizes success or failure into one
//! outcome shape. Partial multi-file failures surface as summary counts,
//! never silently.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use siteforge_store::{ConnectionStore, IntegrationConnection, ProviderKind};

use crate::error::{DeployError, DeployResult};
use crate::publisher::Publisher;

/// Normalized result of a publish attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PublishOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            repo_url: None,
            error: Some(message.into()),
            attempted: 0,
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Routes publish requests to provider adapters.
pub struct Dispatcher {
    publishers: HashMap<ProviderKind, Arc<dyn Publisher>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            publishers: HashMap::new(),
        }
    }

    /// Dispatcher with all built-in providers registered.
    pub fn with_default_providers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Arc::new(crate::github::GitHubPublisher::new()));
        dispatcher.register(Arc::new(crate::vercel::VercelPublisher::new()));
        dispatcher.register(Arc::new(crate::supabase::SupabasePublisher::new()));
        dispatcher
    }

    pub fn register(&mut self, publisher: Arc<dyn Publisher>) {
        self.publishers.insert(publisher.kind(), publisher);
    }

    /// Verify a token against the provider and persist the resulting
    /// connection, replacing any previous one for the same provider.
    pub async fn authenticate(
        &self,
        provider: ProviderKind,
        token: &str,
        connections: &ConnectionStore,
    ) -> DeployResult<IntegrationConnection> {
        let publisher = self
            .publishers
            .get(&provider)
            .ok_or_else(|| DeployError::MissingConnection(provider.to_string()))?;

        let account = publisher.verify_token(token).await?;
        let connection = IntegrationConnection {
            provider,
            token: token.to_string(),
            account_id: account.account_id,
            display_name: account.display_name,
            connected_at: Utc::now(),
        };
        connections.save(connection.clone());
        info!(
            "Connected {} as {}",
            provider, connection.display_name
        );
        Ok(connection)
    }

    /// Publish a file set through the provider's adapter.
    pub async fn publish(
        &self,
        provider: ProviderKind,
        files: &BTreeMap<String, String>,
        project_name: &str,
        connections: &ConnectionStore,
    ) -> PublishOutcome {
        let Some(connection) = connections.get(provider) else {
            return PublishOutcome::failure(format!(
                "No {} connection. Authenticate first",
                provider
            ));
        };

        let Some(publisher) = self.publishers.get(&provider) else {
            return PublishOutcome::failure(format!("No publisher registered for {}", provider));
        };

        match publisher.publish(files, project_name, &connection).await {
            Ok(location) => {
                let success = location.failed == 0;
                let error = (!success).then(|| {
                    format!(
                        "{} of {} files failed to publish",
                        location.failed, location.attempted
                    )
                });
                info!(
                    "Publish to {} finished: {}/{} files",
                    provider, location.succeeded, location.attempted
                );
                PublishOutcome {
                    success,
                    url: location.url,
                    repo_url: location.repo_url,
                    error,
                    attempted: location.attempted,
                    succeeded: location.succeeded,
                    failed: location.failed,
                }
            }
            Err(e) => {
                error!("Publish to {} failed: {}", provider, e);
                PublishOutcome::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{AccountInfo, PublishedLocation};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use siteforge_store::MemoryStore;

    struct FakePublisher {
        kind: ProviderKind,
        verify_result: fn(&str) -> DeployResult<AccountInfo>,
        publish_result: Mutex<Option<DeployResult<PublishedLocation>>>,
    }

    impl FakePublisher {
        fn new(kind: ProviderKind) -> Self {
            Self {
                kind,
                verify_result: |_| {
                    Ok(AccountInfo {
                        account_id: "42".to_string(),
                        display_name: "tester".to_string(),
                        email: None,
                    })
                },
                publish_result: Mutex::new(Some(Ok(PublishedLocation {
                    url: Some("https://deployed.example".to_string()),
                    repo_url: None,
                    attempted: 2,
                    succeeded: 2,
                    failed: 0,
                }))),
            }
        }

        fn with_publish_result(self, result: DeployResult<PublishedLocation>) -> Self {
            *self.publish_result.lock() = Some(result);
            self
        }
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn verify_token(&self, token: &str) -> DeployResult<AccountInfo> {
            (self.verify_result)(token)
        }

        async fn publish(
            &self,
            _files: &BTreeMap<String, String>,
            _project_name: &str,
            _connection: &IntegrationConnection,
        ) -> DeployResult<PublishedLocation> {
            self.publish_result
                .lock()
                .take()
                .unwrap_or(Err(DeployError::Publish("exhausted".to_string())))
        }
    }

    fn connections_with(provider: ProviderKind) -> ConnectionStore {
        let store = ConnectionStore::new(Arc::new(MemoryStore::new()));
        store.save(IntegrationConnection {
            provider,
            token: "tok".to_string(),
            account_id: "42".to_string(),
            display_name: "tester".to_string(),
            connected_at: Utc::now(),
        });
        store
    }

    fn files() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("a.txt".to_string(), "x".to_string()),
            ("b.txt".to_string(), "y".to_string()),
        ])
    }

    #[tokio::test]
    async fn missing_connection_is_a_structured_failure() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(FakePublisher::new(ProviderKind::Vercel)));
        let connections = ConnectionStore::new(Arc::new(MemoryStore::new()));

        let outcome = dispatcher
            .publish(ProviderKind::Vercel, &files(), "demo", &connections)
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("Authenticate first"));
    }

    #[tokio::test]
    async fn successful_publish_is_normalized() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(FakePublisher::new(ProviderKind::Vercel)));
        let connections = connections_with(ProviderKind::Vercel);

        let outcome = dispatcher
            .publish(ProviderKind::Vercel, &files(), "demo", &connections)
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.url.as_deref(), Some("https://deployed.example"));
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.succeeded, 2);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn partial_failures_surface_as_counts() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(
            FakePublisher::new(ProviderKind::GitHub).with_publish_result(Ok(PublishedLocation {
                url: None,
                repo_url: Some("https://github.com/tester/demo".to_string()),
                attempted: 5,
                succeeded: 3,
                failed: 2,
            })),
        ));
        let connections = connections_with(ProviderKind::GitHub);

        let outcome = dispatcher
            .publish(ProviderKind::GitHub, &files(), "demo", &connections)
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.failed, 2);
        assert!(outcome.error.unwrap().contains("2 of 5"));
        assert_eq!(
            outcome.repo_url.as_deref(),
            Some("https://github.com/tester/demo")
        );
    }

    #[tokio::test]
    async fn provider_errors_are_normalized() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(
            FakePublisher::new(ProviderKind::Vercel)
                .with_publish_result(Err(DeployError::Publish("quota exceeded".to_string()))),
        ));
        let connections = connections_with(ProviderKind::Vercel);

        let outcome = dispatcher
            .publish(ProviderKind::Vercel, &files(), "demo", &connections)
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn authenticate_persists_the_connection() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(FakePublisher::new(ProviderKind::GitHub)));
        let connections = ConnectionStore::new(Arc::new(MemoryStore::new()));

        let connection = dispatcher
            .authenticate(ProviderKind::GitHub, "tok", &connections)
            .await
            .unwrap();

        assert_eq!(connection.display_name, "tester");
        let stored = connections.get(ProviderKind::GitHub).unwrap();
        assert_eq!(stored.account_id, "42");
    }
}
