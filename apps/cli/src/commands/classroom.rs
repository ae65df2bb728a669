//! 教室管理命令

use anyhow::{Context, Result};
use clap::Subcommand;
use guide_protocol::{NewClassroom, Position, RoomType};

use crate::context::GuideContext;
use crate::display;

/// 教室命令
#[derive(Subcommand, Debug)]
pub enum ClassroomCommand {
    /// 新增教室
    Add {
        /// 教室名称（如 IT-401）
        name: String,

        /// 所属学院 id
        #[arg(long)]
        faculty: String,

        /// 楼层
        #[arg(long, default_value_t = 1)]
        floor: u32,

        /// 类型（lecture / lab / office / ...）
        #[arg(long = "type", default_value = "lecture")]
        room_type: String,

        /// 地图 x 坐标
        #[arg(short)]
        x: f64,

        /// 地图 y 坐标
        #[arg(short)]
        y: f64,
    },
}

impl ClassroomCommand {
    pub async fn execute(self, ctx: &GuideContext) -> Result<()> {
        match self {
            ClassroomCommand::Add {
                name,
                faculty,
                floor,
                room_type,
                x,
                y,
            } => {
                let draft = NewClassroom {
                    name,
                    faculty_id: faculty,
                    floor,
                    room_type: RoomType::parse_lenient(&room_type),
                    position: Position::new(x, y),
                };
                let classroom = ctx.store.add_classroom(draft).await.context("新增教室失败")?;
                println!("✅ 已新增教室");
                println!("    {}", display::classroom_line(&classroom));
                Ok(())
            },
        }
    }
}
