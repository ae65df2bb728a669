//! 数据重置命令

use anyhow::{Context, Result};
use clap::Args;

use crate::context::GuideContext;
use crate::display;

/// 数据重置命令参数
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// 跳过确认
    #[arg(short, long)]
    pub yes: bool,

    /// 只清空，不写入演示数据
    #[arg(long)]
    pub empty: bool,
}

impl ResetCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        if !self.yes {
            let question = if self.empty {
                "清空所有学院、教室与机器人记录，确定要继续吗？"
            } else {
                "用演示数据覆盖所有记录，确定要继续吗？"
            };
            let confirmed = inquire::Confirm::new(question)
                .with_default(false)
                .prompt()
                .context("读取确认失败")?;

            if !confirmed {
                println!("❌ 操作已取消");
                return Ok(());
            }
        }

        if self.empty {
            ctx.store.clear_all().await.context("清空记录失败")?;
            println!("✅ 已清空所有记录");
            return Ok(());
        }

        ctx.store.reset_to_demo().await.context("重置演示数据失败")?;
        let robot = ctx.store.robot().await;
        println!("✅ 已重置为演示数据");
        println!("{}", display::robot_line(&robot));
        Ok(())
    }
}
