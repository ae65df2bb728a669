//! 键值存储能力接口

use async_trait::async_trait;
use guide_protocol::RecordKey;
use serde_json::Value;

use crate::StoreError;

/// 键值存储能力
///
/// 本地存储与远程关系库实现同一接口，记录以 `serde_json::Value` 形式传递：
/// 单例记录为对象，列表记录为数组。
///
/// # 实现要求
///
/// - `load`: 记录不存在时返回 `Ok(None)`，而不是错误
/// - `save`: 返回后端确认后的权威记录
/// - `insert_unique`: 记录已存在时必须返回 [`StoreError::Conflict`]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;

    /// 读取记录
    async fn load(&self, key: RecordKey) -> Result<Option<Value>, StoreError>;

    /// 写入记录，返回权威值
    async fn save(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError>;

    /// 仅在记录不存在时创建
    async fn insert_unique(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError>;

    /// 删除多条记录（不存在的记录忽略）
    async fn remove(&self, keys: &[RecordKey]) -> Result<(), StoreError>;
}
