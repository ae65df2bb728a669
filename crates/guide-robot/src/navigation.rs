//! 导航协调器
//!
//! 把"去设施 X"翻译为状态机上的目标设定，并在每次轮询时推进一步。
//! 协调器不持有定时器，轮询节奏由调用者决定（[`NavigationCoordinator::drive`]
//! 只是一个便捷的固定间隔循环）。

use std::sync::Arc;
use std::time::Duration;

use guide_protocol::{RobotState, RobotStatus};
use guide_store::FacilityCatalog;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{NavigationError, RobotStateMachine};

/// 单次轮询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// 没有活动目标，不做任何事
    Idle(RobotState),
    /// 向目标前进了一步
    Advanced(RobotState),
    /// 本次轮询到达目标
    Arrived(RobotState),
    /// 步进期间目标被急停或新命令取代
    Superseded(RobotState),
    /// 持久化的目标在目录中已不存在，状态保持不变
    TargetMissing(RobotState),
}

impl Tick {
    pub fn state(&self) -> &RobotState {
        match self {
            Tick::Idle(s)
            | Tick::Advanced(s)
            | Tick::Arrived(s)
            | Tick::Superseded(s)
            | Tick::TargetMissing(s) => s,
        }
    }

    pub fn into_state(self) -> RobotState {
        match self {
            Tick::Idle(s)
            | Tick::Advanced(s)
            | Tick::Arrived(s)
            | Tick::Superseded(s)
            | Tick::TargetMissing(s) => s,
        }
    }

    /// 导航是否可能仍在进行
    pub fn is_active(&self) -> bool {
        matches!(self, Tick::Advanced(_) | Tick::Superseded(_))
    }
}

pub struct NavigationCoordinator {
    machine: Arc<RobotStateMachine>,
    catalog: Arc<dyn FacilityCatalog>,
}

impl NavigationCoordinator {
    pub fn new(machine: Arc<RobotStateMachine>, catalog: Arc<dyn FacilityCatalog>) -> Self {
        Self { machine, catalog }
    }

    pub fn machine(&self) -> &Arc<RobotStateMachine> {
        &self.machine
    }

    /// 开始前往设施
    ///
    /// 设施不存在时返回 [`NavigationError::TargetNotFound`]，机器人状态不变。
    pub async fn go_to(&self, facility_id: &str) -> Result<RobotState, NavigationError> {
        let Some(target) = self.catalog.resolve(facility_id).await else {
            warn!(facility_id, "navigation target not found");
            return Err(NavigationError::TargetNotFound {
                facility_id: facility_id.to_string(),
            });
        };

        info!(
            target = %target.id,
            name = %target.name,
            x = target.x_coordinate,
            y = target.y_coordinate,
            "navigating"
        );
        Ok(self.machine.set_target(&target.id).await)
    }

    /// 轮询一次：有活动目标时向其前进一步
    pub async fn tick(&self) -> Tick {
        let state = self.machine.snapshot().await;
        let Some(target_id) = state.active_target().map(str::to_owned) else {
            return Tick::Idle(state);
        };

        let Some(target) = self.catalog.resolve(&target_id).await else {
            warn!(target = %target_id, "persisted navigation target no longer exists");
            return Tick::TargetMissing(state);
        };

        let next = self.machine.step_toward_target(&target).await;
        if next.status == RobotStatus::Arrived {
            Tick::Arrived(next)
        } else if next.active_target() == Some(target_id.as_str()) {
            debug!(x = next.current_x, y = next.current_y, "navigation step");
            Tick::Advanced(next)
        } else {
            Tick::Superseded(next)
        }
    }

    /// 以固定间隔轮询，直到导航结束或达到 `max_ticks`
    pub async fn drive(&self, interval: Duration, max_ticks: Option<u64>) -> RobotState {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        loop {
            ticker.tick().await;
            let outcome = self.tick().await;
            ticks += 1;

            let exhausted = max_ticks.is_some_and(|max| ticks >= max);
            if !outcome.is_active() || exhausted {
                debug!(ticks, "drive loop finished");
                return outcome.into_state();
            }
        }
    }
}
