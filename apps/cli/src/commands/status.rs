//! 状态查询命令

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::context::GuideContext;
use crate::display;

/// 状态查询命令参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,

    /// 持续轮询并打印变化（Ctrl+C 退出）
    #[arg(short, long)]
    pub watch: bool,

    /// 轮询间隔（毫秒）
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl StatusCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        let observer = ctx.machine.observer();
        let mut last = observer.poll().await;
        self.print(ctx, &last)?;

        if !self.watch {
            return Ok(());
        }

        let mut ticker = tokio::time::interval(Duration::from_millis(self.interval_ms.max(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let state = observer.poll().await;
                    if state != last {
                        self.print(ctx, &state)?;
                        last = state;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    return Ok(());
                }
            }
        }
    }

    fn print(&self, ctx: &GuideContext, state: &guide_protocol::RobotState) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(state)?);
        } else {
            println!("{}  [{}]", display::robot_line(state), ctx.store.backend_name());
        }
        Ok(())
    }
}
