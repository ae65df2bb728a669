//! 进程内存储
//!
//! 无持久化，用于测试与临时会话。

use std::collections::HashMap;

use async_trait::async_trait;
use guide_protocol::RecordKey;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{KeyValueStore, StoreError};

/// 进程内键值存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<RecordKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的记录数
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, key: RecordKey) -> Result<Option<Value>, StoreError> {
        Ok(self.records.lock().get(&key).cloned())
    }

    async fn save(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        self.records.lock().insert(key, value.clone());
        Ok(value.clone())
    }

    async fn insert_unique(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        let mut records = self.records.lock();
        if records.contains_key(&key) {
            return Err(StoreError::Conflict { key });
        }
        records.insert(key, value.clone());
        Ok(value.clone())
    }

    async fn remove(&self, keys: &[RecordKey]) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        for key in keys {
            records.remove(key);
        }
        Ok(())
    }
}
