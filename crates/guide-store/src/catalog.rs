//! 设施目录查询接口

use async_trait::async_trait;
use guide_protocol::Classroom;

/// 设施目录（只读）
///
/// 导航协调器通过此接口把教室 id 解析为坐标和楼层。
#[async_trait]
pub trait FacilityCatalog: Send + Sync {
    /// 按 id 查找教室，不存在时返回 `None`
    async fn resolve(&self, facility_id: &str) -> Option<Classroom>;
}
