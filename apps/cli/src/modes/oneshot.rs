//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 打开存储并确保机器人记录存在
//! 3. 执行操作

use anyhow::Result;
use guide_store::StoreConfig;

use crate::commands::{
    CatalogCommand, ClassroomCommand, DriveCommand, FacultyCommand, GotoCommand, MoveCommand,
    ResetCommand, RotateCommand, StatusCommand, StopCommand,
};
use crate::context::GuideContext;

/// One-shot 模式
pub struct OneShotMode {
    ctx: GuideContext,
}

impl OneShotMode {
    /// 创建新的 One-shot 模式实例
    pub async fn new(config: &StoreConfig) -> Result<Self> {
        let ctx = GuideContext::open(config).await?;
        Ok(Self { ctx })
    }

    /// 状态查询
    pub async fn status(&self, args: StatusCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    /// 手动移动（等待稳定复位后退出）
    pub async fn move_by(&self, args: MoveCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    /// 旋转
    pub async fn rotate(&self, args: RotateCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    /// 设定导航目标
    pub async fn goto(&self, args: GotoCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    /// 轮询推进导航
    pub async fn drive(&self, args: DriveCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    /// 急停
    pub async fn stop(&self, args: StopCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    /// 目录查询
    pub async fn catalog(&self, args: CatalogCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }

    pub async fn faculty(&self, cmd: FacultyCommand) -> Result<()> {
        cmd.execute(&self.ctx).await
    }

    pub async fn classroom(&self, cmd: ClassroomCommand) -> Result<()> {
        cmd.execute(&self.ctx).await
    }

    /// 数据重置
    pub async fn reset(&self, args: ResetCommand) -> Result<()> {
        args.execute(&self.ctx).await
    }
}
