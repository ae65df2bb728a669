//! 本地持久化键值存储
//!
//! 每条记录保存为 `<root>/<key>.json`。每次写入先落到同目录下独占的临时文件，
//! 再原子重命名（或硬链接）到位，多个进程并发写入同一记录时读者只会看到完整的 JSON。

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use guide_protocol::RecordKey;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::debug;

use crate::{KeyValueStore, StoreError};

/// 本地 JSON 文件存储
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// 在指定目录创建存储（目录在首次写入时创建）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, key: RecordKey) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn encode(key: RecordKey, value: &Value) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(value).map_err(|source| StoreError::Corrupted { key, source })
    }

    /// 写入独占临时文件后放到 `key` 对应的位置
    ///
    /// `clobber` 为 `false` 时目标已存在返回 [`StoreError::Conflict`]。
    async fn place(&self, key: RecordKey, bytes: Vec<u8>, clobber: bool) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;

        let root = self.root.clone();
        let path = self.path_of(key);
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut temp = NamedTempFile::with_prefix_in(format!(".{}.", key), &root)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;

            let placed = if clobber {
                temp.persist(&path).map(drop)
            } else {
                temp.persist_noclobber(&path).map(drop)
            };
            match placed {
                Ok(()) => Ok(()),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    Err(StoreError::Conflict { key })
                },
                Err(e) => Err(e.error.into()),
            }
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self, key: RecordKey) -> Result<Option<Value>, StoreError> {
        let bytes = match fs::read(self.path_of(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Corrupted { key, source })?;
        Ok(Some(value))
    }

    async fn save(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        let bytes = Self::encode(key, value)?;
        let len = bytes.len();
        self.place(key, bytes, true).await?;

        debug!(key = %key, bytes = len, "local record saved");
        Ok(value.clone())
    }

    async fn insert_unique(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        let bytes = Self::encode(key, value)?;
        // 不覆盖的放置由文件系统保证原子性，跨进程同样有效；
        // 内容写完才出现在目标路径上，读者不会读到空文件
        self.place(key, bytes, false).await?;

        Ok(value.clone())
    }

    async fn remove(&self, keys: &[RecordKey]) -> Result<(), StoreError> {
        for &key in keys {
            match fs::remove_file(self.path_of(key)).await {
                Ok(()) => {},
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
