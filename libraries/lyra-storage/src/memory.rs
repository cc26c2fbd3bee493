/// In-memory session store
use async_trait::async_trait;
use lyra_core::SessionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Session store that lives for the process lifetime only
///
/// Used for ephemeral sessions and as a test double.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> lyra_core::Result<Option<serde_json::Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> lyra_core::Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> lyra_core::Result<bool> {
        Ok(self.values.write().await.remove(key).is_some())
    }
}
