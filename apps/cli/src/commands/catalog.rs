//! 目录查询命令

use anyhow::Result;
use clap::Args;

use crate::context::GuideContext;
use crate::display;

/// 目录查询命令参数
#[derive(Args, Debug)]
pub struct CatalogCommand {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,

    /// 只显示指定学院
    #[arg(short, long)]
    pub faculty: Option<String>,
}

impl CatalogCommand {
    pub async fn execute(&self, ctx: &GuideContext) -> Result<()> {
        let mut faculties = ctx.store.faculties().await;
        let mut classrooms = ctx.store.classrooms().await;

        if let Some(id) = &self.faculty {
            faculties.retain(|f| &f.id == id);
            classrooms.retain(|c| &c.faculty_id == id);
            if faculties.is_empty() {
                anyhow::bail!("未知学院: {}", id);
            }
        }

        if self.json {
            let body = serde_json::json!({
                "faculties": faculties,
                "classrooms": classrooms,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            display::print_catalog(&faculties, &classrooms);
        }
        Ok(())
    }
}
