//! 导航轮询命令
//!
//! 外部轮询驱动：按固定间隔推进当前导航，直到到达、被急停或 Ctrl+C。

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use guide_protocol::{RobotState, RobotStatus};

use crate::context::GuideContext;
use crate::display;

/// 默认轮询间隔
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// 导航轮询命令参数
#[derive(Args, Debug)]
pub struct DriveCommand {
    /// 轮询间隔（毫秒）
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// 最多轮询次数
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

impl DriveCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        let state = ctx.machine.snapshot().await;
        if state.active_target().is_none() {
            println!("💡 没有进行中的导航（使用 goto <教室> 开始）");
            return Ok(());
        }

        follow(ctx, self.interval_ms, self.max_ticks).await?;
        Ok(())
    }
}

/// 轮询直到导航结束；Ctrl+C 只停止轮询，不改变机器人状态
pub async fn follow(
    ctx: &GuideContext,
    interval_ms: u64,
    max_ticks: Option<u64>,
) -> Result<RobotState> {
    let interval = Duration::from_millis(interval_ms.max(1));
    let mut observer = ctx.machine.observer();

    let drive = ctx.navigator.drive(interval, max_ticks);
    tokio::pin!(drive);

    loop {
        tokio::select! {
            state = &mut drive => {
                report_finish(&state);
                return Ok(state);
            }
            Some(state) = observer.changed() => {
                println!("{}", display::robot_line(&state));
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("⏹️  已停止轮询（机器人状态保持不变）");
                return Ok(ctx.machine.snapshot().await);
            }
        }
    }
}

fn report_finish(state: &RobotState) {
    match state.status {
        RobotStatus::Arrived => println!("✅ 已到达 ({:.1}, {:.1})", state.current_x, state.current_y),
        RobotStatus::Moving => println!("⏸️  轮询结束，导航仍在进行: {}", display::robot_line(state)),
        _ => println!("{}", display::robot_line(state)),
    }
}
