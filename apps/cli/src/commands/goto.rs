//! 导航命令

use anyhow::Result;
use clap::Args;

use crate::commands::drive::{DEFAULT_INTERVAL_MS, follow};
use crate::context::GuideContext;
use crate::display;

/// 导航命令参数
#[derive(Args, Debug)]
pub struct GotoCommand {
    /// 目标教室 id（如 cls-3）
    pub classroom_id: String,

    /// 持续轮询直到到达
    #[arg(short, long)]
    pub follow: bool,

    /// 轮询间隔（毫秒）
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,
}

impl GotoCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        let state = ctx.navigator.go_to(&self.classroom_id).await?;
        println!("🧭 前往 {}", self.classroom_id);
        println!("{}", display::robot_line(&state));

        if self.follow {
            follow(ctx, self.interval_ms, None).await?;
        } else {
            println!("💡 提示: 使用 drive 推进导航");
        }
        Ok(())
    }
}
