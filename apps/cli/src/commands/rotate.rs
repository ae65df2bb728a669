//! 旋转命令

use anyhow::Result;
use clap::Args;
use guide_robot::{Rotation, spawn_settle};

use crate::context::GuideContext;
use crate::display;

/// 旋转命令参数
#[derive(Args, Debug)]
pub struct RotateCommand {
    /// 方向（cw / ccw）
    pub rotation: Rotation,

    /// 不等待稳定复位
    #[arg(long)]
    pub no_wait: bool,
}

impl RotateCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        let (state, ticket) = ctx.machine.apply_rotate(self.rotation).await;
        let arrow = match self.rotation {
            Rotation::Clockwise => "↻",
            Rotation::CounterClockwise => "↺",
        };
        println!("{} {}", arrow, display::robot_line(&state));

        if self.no_wait {
            return Ok(());
        }

        if let Some(settled) = spawn_settle(ctx.machine.clone(), ticket).await? {
            println!("{}", display::robot_line(&settled));
        }
        Ok(())
    }
}
