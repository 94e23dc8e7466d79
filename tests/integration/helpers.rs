//! Shared test helpers for integration tests.

#![allow(dead_code)]

use serde_json::Value;

use revhub_core::config::AppConfig;
use revhub_core::types::{ContentKey, UserId};
use revhub_database::{MemoryStore, StoreProvider};
use revhub_entity::{Snapshot, Version, VersionMeta};
use revhub_service::{AppServices, RequestContext};

/// Test application context over a fresh in-memory store
pub struct TestApp {
    /// Every service, wired the way the CLI wires them
    pub services: AppServices,
    /// The acting user for mutations
    pub user: UserId,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application with the given configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = StoreProvider::memory(MemoryStore::new());
        Self {
            services: AppServices::new(config, store),
            user: UserId::new(),
        }
    }

    /// Request context for the test user
    pub fn ctx(&self) -> RequestContext {
        RequestContext::new(self.user)
    }

    /// Create a main-line version that becomes current
    pub async fn publish(&self, key: &ContentKey, data: Value) -> Version {
        self.services
            .versions
            .create_version(key, snapshot(data), VersionMeta::current_by(Some(self.user)))
            .await
            .expect("Failed to create version")
    }

    /// Create a version with explicit metadata
    pub async fn create(&self, key: &ContentKey, data: Value, meta: VersionMeta) -> Version {
        self.services
            .versions
            .create_version(key, snapshot(data), meta)
            .await
            .expect("Failed to create version")
    }

    /// Version numbers of an item, newest first
    pub async fn numbers(&self, key: &ContentKey) -> Vec<i32> {
        self.services
            .versions
            .list_all(key)
            .await
            .expect("Failed to list versions")
            .iter()
            .map(|v| v.version_number)
            .collect()
    }
}

/// The `article/42` content key
pub fn article() -> ContentKey {
    ContentKey::new("article", "42").expect("valid key")
}

/// Convert a JSON object literal into a snapshot
pub fn snapshot(value: Value) -> Snapshot {
    match value {
        Value::Object(map) => map,
        other => panic!("snapshot must be a JSON object, got {other}"),
    }
}
