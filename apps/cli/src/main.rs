//! # Guide CLI
//!
//! Command-line interface for the campus guide robot.
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于脚本）
//!
//! ```bash
//! # 配置远程后端（不配置则使用本地存储）
//! guide-cli config set --url https://xyz.supabase.co --api-key <anon-key>
//!
//! # 每条命令独立打开存储
//! guide-cli status
//! guide-cli goto cls-3 --follow
//! ```
//!
//! ### REPL 模式（推荐用于演示）
//!
//! ```bash
//! $ guide-cli shell
//! guide> goto cls-3
//! guide> status
//! guide> up
//! guide> stop
//! guide> exit
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod context;
mod display;
mod modes;

use commands::{
    CatalogCommand, ClassroomCommand, ConfigCommand, DriveCommand, FacultyCommand, GotoCommand,
    MoveCommand, PingCommand, ResetCommand, RotateCommand, StatusCommand, StopCommand,
};
use modes::oneshot::OneShotMode;
use modes::repl::run_repl;

/// Guide CLI - 导览机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "guide-cli")]
#[command(about = "Command-line interface for the campus guide robot", long_about = None)]
#[command(version)]
struct Cli {
    /// 本地存储目录（覆盖配置文件和环境变量）
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 查询机器人状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 手动移动（方向键）
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 原地旋转
    Rotate {
        #[command(flatten)]
        args: RotateCommand,
    },

    /// 前往教室
    Goto {
        #[command(flatten)]
        args: GotoCommand,
    },

    /// 轮询推进当前导航
    Drive {
        #[command(flatten)]
        args: DriveCommand,
    },

    /// 急停
    Stop {
        #[command(flatten)]
        args: StopCommand,
    },

    /// 列出学院与教室
    Catalog {
        #[command(flatten)]
        args: CatalogCommand,
    },

    /// 学院管理
    #[command(subcommand)]
    Faculty(FacultyCommand),

    /// 教室管理
    #[command(subcommand)]
    Classroom(ClassroomCommand),

    /// 重置为演示数据
    Reset {
        #[command(flatten)]
        args: ResetCommand,
    },

    /// 测试后端连通性
    Ping {
        #[command(flatten)]
        args: PingCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 留给命令结果）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("warn,guide_cli=info,guide_robot=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => {
            // One-shot 模式：配置管理（不打开存储）
            cmd.execute().await
        },

        Commands::Ping { args } => {
            // One-shot 模式：连通性检查（不打开存储）
            let config = context::load_config(cli.data_dir)?;
            args.execute(&config).await
        },

        Commands::Shell => {
            // REPL 模式：交互式 Shell
            let config = context::load_config(cli.data_dir)?;
            run_repl(&config).await
        },

        command => {
            let config = context::load_config(cli.data_dir)?;
            let mode = OneShotMode::new(&config).await?;
            match command {
                Commands::Status { args } => mode.status(args).await,
                Commands::Move { args } => mode.move_by(args).await,
                Commands::Rotate { args } => mode.rotate(args).await,
                Commands::Goto { args } => mode.goto(args).await,
                Commands::Drive { args } => mode.drive(args).await,
                Commands::Stop { args } => mode.stop(args).await,
                Commands::Catalog { args } => mode.catalog(args).await,
                Commands::Faculty(cmd) => mode.faculty(cmd).await,
                Commands::Classroom(cmd) => mode.classroom(cmd).await,
                Commands::Reset { args } => mode.reset(args).await,
                Commands::Config(_) | Commands::Ping { .. } | Commands::Shell => Ok(()),
            }
        },
    }
}
