//! 导航错误类型定义

use thiserror::Error;

/// 导航错误
///
/// 存储故障在存储层被吸收，这里只有需要告知用户的领域错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// 目标设施不存在（不会自动重试）
    #[error("Target not found: {facility_id}")]
    TargetNotFound { facility_id: String },
}
