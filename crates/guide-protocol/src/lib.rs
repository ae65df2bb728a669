//! # Guide Protocol
//!
//! 导览机器人记录定义（无存储依赖）
//!
//! ## 模块
//!
//! - `robot`: 机器人状态单例记录与部分更新
//! - `catalog`: 学院 / 教室（设施）目录记录
//! - `keys`: 持久化记录名
//! - `demo`: 内置演示数据与默认记录
//!
//! ## 坐标
//!
//! 所有坐标位于设施地图平面内，单位任意，约定范围 0–400。
//! 屏幕坐标系：x 向右，y 向下。

pub mod catalog;
pub mod demo;
mod error;
pub mod keys;
pub mod robot;

// 重新导出常用类型
pub use catalog::{Classroom, Faculty, NewClassroom, NewFaculty, RoomType};
pub use error::ProtocolError;
pub use keys::RecordKey;
pub use robot::{Position, RobotPatch, RobotState, RobotStatus};
