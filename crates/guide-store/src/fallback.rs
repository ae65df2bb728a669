//! 回落装饰器
//!
//! 包装任意主后端，使其在失败时委托给本地存储。

use std::sync::Arc;

use async_trait::async_trait;
use guide_protocol::RecordKey;
use serde_json::Value;
use tracing::warn;

use crate::{KeyValueStore, StoreError};

/// 主后端失败时回落到本地的存储装饰器
///
/// # 语义
///
/// - `load`: 先读本地缓存；缓存缺失时读主后端，成功后写回本地缓存；
///   主后端失败时返回 `Ok(None)`，由上层替换为默认记录
/// - `save`: 写主后端并以其返回值刷新本地缓存；主后端失败时写本地
/// - `insert_unique`: 冲突原样返回（调用者据此重新读取）；其他失败回落本地
/// - `remove`: 两侧都删除，主后端失败只记录日志
pub struct FallbackStore {
    primary: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn KeyValueStore>, local: Arc<dyn KeyValueStore>) -> Self {
        Self { primary, local }
    }

    async fn cache(&self, key: RecordKey, value: &Value) {
        if let Err(e) = self.local.save(key, value).await {
            warn!(key = %key, backend = self.local.name(), error = %e, "failed to refresh local cache");
        }
    }
}

#[async_trait]
impl KeyValueStore for FallbackStore {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn load(&self, key: RecordKey) -> Result<Option<Value>, StoreError> {
        match self.local.load(key).await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {},
            Err(e) => {
                warn!(key = %key, backend = self.local.name(), error = %e, "local cache unreadable");
            },
        }

        match self.primary.load(key).await {
            Ok(Some(value)) => {
                self.cache(key, &value).await;
                Ok(Some(value))
            },
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(key = %key, backend = self.primary.name(), error = %e, "load failed, using defaults");
                Ok(None)
            },
        }
    }

    async fn save(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        match self.primary.save(key, value).await {
            Ok(saved) => {
                self.cache(key, &saved).await;
                Ok(saved)
            },
            Err(e) => {
                warn!(key = %key, backend = self.primary.name(), error = %e, "save failed, writing local");
                self.local.save(key, value).await
            },
        }
    }

    async fn insert_unique(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        match self.primary.insert_unique(key, value).await {
            Ok(created) => {
                self.cache(key, &created).await;
                Ok(created)
            },
            Err(e) if e.is_conflict() => Err(e),
            Err(e) => {
                warn!(key = %key, backend = self.primary.name(), error = %e, "insert failed, writing local");
                self.local.insert_unique(key, value).await
            },
        }
    }

    async fn remove(&self, keys: &[RecordKey]) -> Result<(), StoreError> {
        if let Err(e) = self.primary.remove(keys).await {
            warn!(backend = self.primary.name(), error = %e, "remove failed on primary");
        }
        self.local.remove(keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde_json::json;

    /// 永远失败的主后端
    struct DownStore;

    #[async_trait]
    impl KeyValueStore for DownStore {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn load(&self, _key: RecordKey) -> Result<Option<Value>, StoreError> {
            Err(unavailable())
        }

        async fn save(&self, _key: RecordKey, _value: &Value) -> Result<Value, StoreError> {
            Err(unavailable())
        }

        async fn insert_unique(&self, _key: RecordKey, _value: &Value) -> Result<Value, StoreError> {
            Err(unavailable())
        }

        async fn remove(&self, _keys: &[RecordKey]) -> Result<(), StoreError> {
            Err(unavailable())
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable {
            backend: "down",
            reason: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_primary_hit_is_cached_locally() {
        let primary = Arc::new(MemoryStore::new());
        let local = Arc::new(MemoryStore::new());
        primary.save(RecordKey::Faculties, &json!([{"id": "fac-1"}])).await.unwrap();

        let store = FallbackStore::new(primary, local.clone());
        let value = store.load(RecordKey::Faculties).await.unwrap();
        assert_eq!(value, Some(json!([{"id": "fac-1"}])));
        assert_eq!(
            local.load(RecordKey::Faculties).await.unwrap(),
            Some(json!([{"id": "fac-1"}]))
        );
    }

    #[tokio::test]
    async fn test_local_cache_wins() {
        let primary = Arc::new(MemoryStore::new());
        let local = Arc::new(MemoryStore::new());
        primary.save(RecordKey::RobotState, &json!({"id": "remote"})).await.unwrap();
        local.save(RecordKey::RobotState, &json!({"id": "cached"})).await.unwrap();

        let store = FallbackStore::new(primary, local);
        let value = store.load(RecordKey::RobotState).await.unwrap().unwrap();
        assert_eq!(value["id"], "cached");
    }

    #[tokio::test]
    async fn test_primary_failure_degrades_to_local() {
        let local = Arc::new(MemoryStore::new());
        let store = FallbackStore::new(Arc::new(DownStore), local.clone());

        // 读：主后端失败 → None
        assert_eq!(store.load(RecordKey::RobotState).await.unwrap(), None);

        // 写：主后端失败 → 写本地
        let saved = store
            .save(RecordKey::RobotState, &json!({"id": "robot-1", "status": "moving"}))
            .await
            .unwrap();
        assert_eq!(saved["status"], "moving");
        assert_eq!(local.load(RecordKey::RobotState).await.unwrap(), Some(saved));

        // 删除：主后端失败不影响本地删除
        store.remove(&[RecordKey::RobotState]).await.unwrap();
        assert!(local.is_empty());
    }

    #[tokio::test]
    async fn test_conflict_is_not_masked() {
        let primary = Arc::new(MemoryStore::new());
        primary.save(RecordKey::RobotState, &json!({"id": "robot-1"})).await.unwrap();
        let local = Arc::new(MemoryStore::new());

        let store = FallbackStore::new(primary, local.clone());
        let err = store
            .insert_unique(RecordKey::RobotState, &json!({"id": "robot-2"}))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(local.is_empty());
    }
}
