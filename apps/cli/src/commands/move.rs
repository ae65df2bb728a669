//! 手动移动命令

use anyhow::Result;
use clap::Args;
use guide_robot::Direction;
use guide_robot::motion::MANUAL_STEP;
use guide_robot::spawn_settle;

use crate::context::GuideContext;
use crate::display;

/// 手动移动命令参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 方向（up / down / left / right）
    pub direction: Direction,

    /// 步长（平面单位）
    #[arg(short, long, default_value_t = MANUAL_STEP)]
    pub step: f64,

    /// 不等待稳定复位
    #[arg(long)]
    pub no_wait: bool,
}

impl MoveCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        if !self.step.is_finite() || self.step < 0.0 {
            anyhow::bail!("无效的步长: {}", self.step);
        }

        let (state, ticket) = ctx.machine.apply_direction(self.direction, self.step).await;
        println!("🚶 {} {:.1}", self.direction, self.step);
        println!("{}", display::robot_line(&state));

        if self.no_wait {
            return Ok(());
        }

        if let Some(settled) = spawn_settle(ctx.machine.clone(), ticket).await? {
            println!("{}", display::robot_line(&settled));
        }
        Ok(())
    }
}
