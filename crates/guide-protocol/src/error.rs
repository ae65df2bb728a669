//! 协议层错误类型定义

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 未知的机器人状态字符串
    #[error("Unknown robot status: {0}")]
    UnknownStatus(String),

    /// 未知的记录名
    #[error("Unknown record key: {0}")]
    UnknownRecordKey(String),

    /// 楼层必须 ≥ 1
    #[error("Invalid floor: {0} (must be >= 1)")]
    InvalidFloor(u32),

    /// 教室引用了不存在的学院
    #[error("Unknown faculty: {0}")]
    UnknownFaculty(String),

    /// 必填字段为空
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}
