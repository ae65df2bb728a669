//! 机器人状态记录
//!
//! `RobotState` 是整个系统唯一可变的实体：每个部署只有一台逻辑机器人，
//! 记录只在原地更新，除全量重置外从不删除。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// 机器人状态
///
/// # 状态转换
///
/// ```text
/// idle | arrived --set_target--> moving
/// moving --到达检测--> arrived
/// 任意状态 --emergency_stop--> idle
/// moving --手动命令覆盖--> moving
/// ```
///
/// `Error` 保留用于故障上报，当前没有任何操作会进入此状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotStatus {
    /// 空闲（初始状态）
    #[default]
    Idle,
    /// 移动中（手动命令或导航）
    Moving,
    /// 已到达导航目标
    Arrived,
    /// 故障（保留）
    Error,
}

impl RobotStatus {
    /// 状态字符串（与持久化格式一致）
    pub fn as_str(self) -> &'static str {
        match self {
            RobotStatus::Idle => "idle",
            RobotStatus::Moving => "moving",
            RobotStatus::Arrived => "arrived",
            RobotStatus::Error => "error",
        }
    }
}

impl fmt::Display for RobotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RobotStatus {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(RobotStatus::Idle),
            "moving" => Ok(RobotStatus::Moving),
            "arrived" => Ok(RobotStatus::Arrived),
            "error" => Ok(RobotStatus::Error),
            other => Err(ProtocolError::UnknownStatus(other.to_string())),
        }
    }
}

/// 平面坐标
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 欧氏距离
    pub fn distance_to(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// 平移
    pub fn offset(&self, dx: f64, dy: f64) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// 机器人状态单例记录
///
/// 字段名与远程 `robot_state` 表的列名一致，位置拆为 `current_x` / `current_y` 两列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    /// 稳定标识，创建后不变
    pub id: String,

    pub status: RobotStatus,

    /// 电量百分比（0–100，当前没有操作会消耗电量）
    pub battery_level: u8,

    pub current_x: f64,
    pub current_y: f64,

    /// 导航目标（教室 id），仅在 `status = moving` 时存在
    #[serde(default)]
    pub target_classroom_id: Option<String>,

    /// 最近一次写入时间
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RobotState {
    /// 当前位置
    pub fn position(&self) -> Position {
        Position::new(self.current_x, self.current_y)
    }

    pub fn is_moving(&self) -> bool {
        self.status == RobotStatus::Moving
    }

    pub fn has_target(&self) -> bool {
        self.target_classroom_id.is_some()
    }

    /// 正在前往的目标（仅 moving 且有目标时返回）
    pub fn active_target(&self) -> Option<&str> {
        if self.is_moving() {
            self.target_classroom_id.as_deref()
        } else {
            None
        }
    }

    /// 检查记录不变量：有目标 ⇒ moving；电量 ≤ 100
    pub fn invariants_hold(&self) -> bool {
        (!self.has_target() || self.is_moving()) && self.battery_level <= 100
    }

    /// 合并部分更新并写入时间戳
    ///
    /// 状态切换到 `idle` / `arrived` 时总是清除目标，即使补丁没有显式要求。
    pub fn apply(&self, patch: &RobotPatch, now: DateTime<Utc>) -> RobotState {
        let mut next = self.clone();

        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(level) = patch.battery_level {
            next.battery_level = level.min(100);
        }
        if let Some(position) = patch.position {
            next.current_x = position.x;
            next.current_y = position.y;
        }
        if let Some(target) = &patch.target {
            next.target_classroom_id = target.clone();
        }
        if matches!(next.status, RobotStatus::Idle | RobotStatus::Arrived) {
            next.target_classroom_id = None;
        }

        next.updated_at = Some(now);
        next
    }
}

/// 机器人状态的部分更新
///
/// `target` 使用 `Option<Option<_>>`：外层 `None` 表示不修改，`Some(None)` 表示清除。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotPatch {
    pub status: Option<RobotStatus>,
    pub battery_level: Option<u8>,
    pub position: Option<Position>,
    pub target: Option<Option<String>>,
}

impl RobotPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: RobotStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn battery_level(mut self, level: u8) -> Self {
        self.battery_level = Some(level);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn target(mut self, classroom_id: impl Into<String>) -> Self {
        self.target = Some(Some(classroom_id.into()));
        self
    }

    pub fn clear_target(mut self) -> Self {
        self.target = Some(None);
        self
    }

    /// 补丁是否为空
    pub fn is_empty(&self) -> bool {
        self == &RobotPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> RobotState {
        RobotState {
            id: "robot-1".to_string(),
            status: RobotStatus::Moving,
            battery_level: 100,
            current_x: 10.0,
            current_y: 20.0,
            target_classroom_id: Some("cls-1".to_string()),
            updated_at: None,
        }
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            RobotStatus::Idle,
            RobotStatus::Moving,
            RobotStatus::Arrived,
            RobotStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<RobotStatus>().unwrap(), status);
        }
        assert!("parked".parse::<RobotStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&RobotStatus::Arrived).unwrap();
        assert_eq!(json, "\"arrived\"");
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn test_apply_stamps_updated_at() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let next = sample().apply(&RobotPatch::new(), now);
        assert_eq!(next.updated_at, Some(now));
        assert_eq!(next.position(), Position::new(10.0, 20.0));
    }

    #[test]
    fn test_apply_idle_clears_target() {
        let now = Utc::now();
        // 补丁没有显式清除目标，进入 idle 时仍然清除
        let next = sample().apply(&RobotPatch::new().status(RobotStatus::Idle), now);
        assert_eq!(next.status, RobotStatus::Idle);
        assert!(next.target_classroom_id.is_none());
        assert!(next.invariants_hold());
    }

    #[test]
    fn test_apply_partial_keeps_other_fields() {
        let now = Utc::now();
        let next = sample().apply(&RobotPatch::new().position(Position::new(1.0, 2.0)), now);
        assert_eq!(next.status, RobotStatus::Moving);
        assert_eq!(next.target_classroom_id.as_deref(), Some("cls-1"));
        assert_eq!(next.current_x, 1.0);
        assert_eq!(next.current_y, 2.0);
    }

    #[test]
    fn test_apply_clamps_battery() {
        let next = sample().apply(&RobotPatch::new().battery_level(250), Utc::now());
        assert_eq!(next.battery_level, 100);
    }

    #[test]
    fn test_wire_format_uses_table_columns() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["status"], "moving");
        assert_eq!(value["battery_level"], 100);
        assert_eq!(value["current_x"], 10.0);
        assert_eq!(value["target_classroom_id"], "cls-1");

        // 缺失可选列时使用默认值
        let parsed: RobotState = serde_json::from_str(
            r#"{"id":"robot-9","status":"idle","battery_level":80,"current_x":0,"current_y":5}"#,
        )
        .unwrap();
        assert_eq!(parsed.id, "robot-9");
        assert!(parsed.target_classroom_id.is_none());
        assert!(parsed.updated_at.is_none());
    }

    #[test]
    fn test_active_target_requires_moving() {
        let mut state = sample();
        assert_eq!(state.active_target(), Some("cls-1"));
        state.status = RobotStatus::Arrived;
        assert_eq!(state.active_target(), None);
        assert!(!state.invariants_hold());
    }
}
