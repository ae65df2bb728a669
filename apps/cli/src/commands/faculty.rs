//! 学院管理命令

use anyhow::{Context, Result};
use clap::Subcommand;
use guide_protocol::NewFaculty;

use crate::context::GuideContext;

/// 学院命令
#[derive(Subcommand, Debug)]
pub enum FacultyCommand {
    /// 新增学院
    Add {
        /// 学院名称
        name: String,

        /// 楼层数
        #[arg(long, default_value_t = 1)]
        floors: u32,
    },
}

impl FacultyCommand {
    pub async fn execute(self, ctx: &GuideContext) -> Result<()> {
        match self {
            FacultyCommand::Add { name, floors } => {
                let faculty = ctx
                    .store
                    .add_faculty(NewFaculty { name, floors })
                    .await
                    .context("新增学院失败")?;
                println!("✅ 已新增学院 {} {}（{} 层）", faculty.id, faculty.name, faculty.floors);
                Ok(())
            },
        }
    }
}
