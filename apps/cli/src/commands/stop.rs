//! 急停命令
//!
//! 立即回到 idle 并清除导航目标

use anyhow::Result;
use clap::Args;

use crate::context::GuideContext;
use crate::display;

/// 急停命令参数
#[derive(Args, Debug)]
pub struct StopCommand {
    /// 只输出结果状态
    #[arg(short, long)]
    pub quiet: bool,
}

impl StopCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        if !self.quiet {
            println!("🛑 发送急停命令...");
        }

        let state = ctx.machine.emergency_stop().await;
        println!("{}", display::robot_line(&state));

        if !self.quiet {
            println!("✅ 急停完成");
        }
        Ok(())
    }
}
