//! 运行模式
//!
//! 支持两种模式：
//! - One-shot 模式：每次命令独立打开存储
//! - REPL 模式：交互式 Shell，后台运行轮询驱动与稳定计时

pub mod oneshot;
pub mod repl;
