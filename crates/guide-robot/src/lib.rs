//! # Guide Robot - 导览机器人仿真
//!
//! 本 crate 提供模拟导览机器人的状态机与导航协调器：
//! - 运动学（纯函数）：单步逼近、到达检测、平面裁剪
//! - 状态机：手动移动 / 旋转 / 急停 / 设定目标，全部读改写串行化
//! - 稳定计时：手动命令后的延迟复位，"最后一条命令生效"
//! - 导航协调：把"去教室 X"翻译为目标设定，并由外部轮询推进
//!
//! # 架构
//!
//! ```text
//! 外部轮询（CLI drive / REPL 后台任务）
//!     ↓ tick()
//! NavigationCoordinator ──resolve──> FacilityCatalog
//!     ↓ step_toward_target()
//! RobotStateMachine ──update_robot_with──> RecordStore
//!     ↓ watch
//! Observer
//! ```
//!
//! 状态机自身不持有定时器：轮询节奏和稳定复位都由调用者调度。

mod error;
pub mod machine;
pub mod motion;
pub mod navigation;
pub mod observer;
pub mod settle;

pub use error::NavigationError;
pub use machine::RobotStateMachine;
pub use motion::{Direction, Rotation, Step};
pub use navigation::{NavigationCoordinator, Tick};
pub use observer::Observer;
pub use settle::{SettleTicket, spawn_settle};
