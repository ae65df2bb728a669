//! 稳定计时
//!
//! 手动移动 / 旋转后，机器人在延迟后回到 `idle`。
//! 每条命令携带一个纪元号，计时到期时只有纪元仍然是最新的才会生效。

use std::sync::Arc;
use std::time::Duration;

use guide_protocol::RobotState;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::RobotStateMachine;

/// 手动移动后的稳定延迟
pub const MOVE_SETTLE: Duration = Duration::from_millis(1000);

/// 旋转后的稳定延迟
pub const ROTATE_SETTLE: Duration = Duration::from_millis(800);

/// 稳定凭据
///
/// 由手动命令返回，交给 [`spawn_settle`] 或在调用者自己的调度里使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTicket {
    /// 签发时的命令纪元
    pub epoch: u64,
    /// 到期延迟
    pub delay: Duration,
}

impl SettleTicket {
    pub fn new(epoch: u64, delay: Duration) -> Self {
        Self { epoch, delay }
    }
}

/// 在后台等待凭据到期并尝试复位
///
/// 返回的句柄产出复位后的状态；凭据已被后续命令取代时产出 `None`。
pub fn spawn_settle(
    machine: Arc<RobotStateMachine>,
    ticket: SettleTicket,
) -> JoinHandle<Option<RobotState>> {
    tokio::spawn(async move {
        tokio::time::sleep(ticket.delay).await;
        let settled = machine.settle(ticket).await;
        if settled.is_none() {
            trace!(epoch = ticket.epoch, "settle superseded");
        }
        settled
    })
}
