//! 存储层错误类型定义

use guide_protocol::{ProtocolError, RecordKey};
use thiserror::Error;

/// 存储层错误类型
///
/// 读写路径上的错误由 [`RecordStore`](crate::RecordStore) 吸收并记录日志，
/// 只有目录管理操作（新增 / 清除 / 重置）会把错误交给调用者。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 后端不可用（网络错误、服务端错误等）
    #[error("Storage unavailable ({backend}): {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    /// 唯一约束冲突：记录已存在
    #[error("Record already exists: {key}")]
    Conflict { key: RecordKey },

    /// 按 id 更新时找不到对应的行
    #[error("Record not found: {key}")]
    NotFound { key: RecordKey },

    /// 序列化数据损坏
    #[error("Corrupted record {key}: {source}")]
    Corrupted {
        key: RecordKey,
        #[source]
        source: serde_json::Error,
    },

    /// 本地文件 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP 客户端错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 输入校验失败
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ProtocolError),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// 是否为唯一约束冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
