//! REPL 模式（交互式 Shell）
//!
//! 使用方案 B：专用输入线程 + crossbeam 通道
//! 保留历史记录，不阻塞 tokio。一个常驻转发任务把 crossbeam 通道接到
//! `tokio::sync::mpsc`，`recv` 被 `select!` 取消时不会丢行。
//! 会话期间存储与状态机常驻，导航轮询和稳定计时在后台任务中运行。

use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{Receiver, bounded};
use guide_robot::motion::MANUAL_STEP;
use guide_robot::{Direction, Rotation, SettleTicket, Tick, spawn_settle};
use guide_store::StoreConfig;
use rustyline::Editor;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::commands::drive::DEFAULT_INTERVAL_MS;
use crate::context::GuideContext;
use crate::display;

/// Ctrl+C 在输入线程中被转换成的特殊命令
const SIGINT: &str = "SIGINT";

/// REPL 会话（保持存储与状态机）
pub struct ReplSession {
    ctx: GuideContext,
    /// 后台导航轮询任务
    driver: JoinHandle<()>,
}

impl ReplSession {
    /// 打开存储并启动后台轮询
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let ctx = GuideContext::open(config).await?;
        let driver = spawn_driver(&ctx, Duration::from_millis(DEFAULT_INTERVAL_MS));
        Ok(Self { ctx, driver })
    }

    /// 手动移动，到期后自动复位
    async fn manual_move(&self, direction: Direction, step: f64) {
        let (state, ticket) = self.ctx.machine.apply_direction(direction, step).await;
        println!("{}", display::robot_line(&state));
        self.schedule_settle(ticket);
    }

    async fn rotate(&self, rotation: Rotation) {
        let (state, ticket) = self.ctx.machine.apply_rotate(rotation).await;
        println!("{}", display::robot_line(&state));
        self.schedule_settle(ticket);
    }

    fn schedule_settle(&self, ticket: SettleTicket) {
        let handle = spawn_settle(self.ctx.machine.clone(), ticket);
        tokio::spawn(async move {
            if let Ok(Some(state)) = handle.await {
                println!("{}", display::robot_line(&state));
            }
        });
    }

    async fn emergency_stop(&self) {
        let state = self.ctx.machine.emergency_stop().await;
        println!("{}", display::robot_line(&state));
    }
}

impl Drop for ReplSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// 后台轮询：与地图界面的定时器一样，每个间隔推进一步
fn spawn_driver(ctx: &GuideContext, interval: Duration) -> JoinHandle<()> {
    let navigator = ctx.navigator.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match navigator.tick().await {
                Tick::Arrived(state) => {
                    println!();
                    println!("📍 已到达 ({:.1}, {:.1})", state.current_x, state.current_y);
                },
                Tick::TargetMissing(state) => {
                    println!();
                    println!(
                        "⚠️  导航目标已不存在: {:?}（使用 stop 取消）",
                        state.target_classroom_id
                    );
                },
                Tick::Idle(_) | Tick::Advanced(_) | Tick::Superseded(_) => {},
            }
        }
    })
}

/// REPL 输入（方案 B：专用输入线程）
pub struct ReplInput {
    commands: mpsc::Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded::<String>(10);

        // ⭐ 关键：在专用线程内创建 Editor（生命周期 = REPL 会话）
        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            let history_path = ".guide_history";
            rl.load_history(history_path).ok(); // 首次运行没有历史

            println!("Guide CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
            println!("输入 'help' 查看帮助，'exit' 退出");
            println!();

            loop {
                match rl.readline("guide> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        if line == "exit" || line == "quit" {
                            rl.save_history(history_path).ok();
                            let _ = command_tx.send(line);
                            break;
                        }

                        let _ = rl.add_history_entry(line.clone());
                        if command_tx.send(line).is_err() {
                            break; // 主线程已关闭
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        // Ctrl+C：在主线程执行急停
                        println!("^C");
                        let _ = command_tx.send(SIGINT.to_string());
                    },

                    Err(rustyline::error::ReadlineError::Eof) => {
                        // Ctrl+D：退出
                        rl.save_history(history_path).ok();
                        let _ = command_tx.send("exit".to_string());
                        break;
                    },

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            Ok(())
        });

        Self {
            commands: forward_commands(command_rx),
            _input_thread: input_thread,
        }
    }

    /// 等待用户输入（可安全地在 `select!` 中取消）
    pub async fn recv_command(&mut self) -> Option<String> {
        self.commands.recv().await
    }
}

/// 常驻转发：整个会话只占用一个阻塞线程等待 crossbeam::recv
///
/// 输入线程退出（发送端关闭）后转发结束，接收端随之返回 `None`。
fn forward_commands(rx: Receiver<String>) -> mpsc::Receiver<String> {
    let (tx, commands) = mpsc::channel(10);
    tokio::task::spawn_blocking(move || {
        while let Ok(line) = rx.recv() {
            if tx.blocking_send(line).is_err() {
                break; // REPL 已结束
            }
        }
    });
    commands
}

/// 运行 REPL 模式
pub async fn run_repl(config: &StoreConfig) -> Result<()> {
    let session = ReplSession::open(config).await?;
    let mut input = ReplInput::new(); // ⭐ 一次性创建，保留历史

    println!();
    println!("💡 提示: 使用 'catalog' 查看教室，'goto <教室>' 开始导航");
    println!("{}", display::robot_line(&session.ctx.machine.latest()));
    println!();

    loop {
        tokio::select! {
            // ⭐ 优先级1：用户输入
            line = input.recv_command() => {
                let Some(line) = line else {
                    break; // 输入线程已退出
                };

                match line.as_str() {
                    SIGINT => {
                        eprintln!("🛑 Emergency stop activated!");
                        session.emergency_stop().await;
                    },

                    "exit" | "quit" => {
                        println!("👋 再见！");
                        break;
                    },

                    "help" => print_help(),

                    _ => {
                        if let Err(err) = handle_command(&line, &session).await {
                            eprintln!("❌ Error: {}", err);
                            print_help_hint(&line);
                        }
                    },
                }
            }

            // ⭐ 优先级2：输入线程之外收到的 Ctrl+C（如后台输出期间）
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\n🛑 Emergency stop activated!");
                session.emergency_stop().await;
            }
        }
    }

    Ok(())
}

/// 处理命令
async fn handle_command(line: &str, session: &ReplSession) -> Result<()> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&command) = parts.first() else {
        return Ok(());
    };
    let ctx = &session.ctx;

    match command {
        "status" => {
            let state = ctx.machine.snapshot().await;
            println!("{}  [{}]", display::robot_line(&state), ctx.store.backend_name());
        },

        "up" | "down" | "left" | "right" => {
            let direction: Direction = command.parse().map_err(anyhow::Error::msg)?;
            let step = parse_step(parts.get(1).copied())?;
            session.manual_move(direction, step).await;
        },

        "move" => {
            let direction: Direction = parts
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("缺少方向参数"))?
                .parse()
                .map_err(anyhow::Error::msg)?;
            let step = parse_step(parts.get(2).copied())?;
            session.manual_move(direction, step).await;
        },

        "rotate" => {
            let rotation: Rotation = parts
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("缺少旋转方向（cw / ccw）"))?
                .parse()
                .map_err(anyhow::Error::msg)?;
            session.rotate(rotation).await;
        },

        "goto" => {
            let id = parts.get(1).ok_or_else(|| anyhow::anyhow!("缺少教室 id"))?;
            let state = ctx.navigator.go_to(id).await?;
            println!("🧭 前往 {}", id);
            println!("{}", display::robot_line(&state));
        },

        "stop" => session.emergency_stop().await,

        "catalog" => {
            let faculties = ctx.store.faculties().await;
            let classrooms = ctx.store.classrooms().await;
            display::print_catalog(&faculties, &classrooms);
        },

        _ => {
            anyhow::bail!("未知命令: {}", command);
        },
    }

    Ok(())
}

fn parse_step(arg: Option<&str>) -> Result<f64> {
    let Some(arg) = arg else {
        return Ok(MANUAL_STEP);
    };
    let step: f64 = arg.parse().map_err(|_| anyhow::anyhow!("无效的步长: {}", arg))?;
    if !step.is_finite() || step < 0.0 {
        anyhow::bail!("无效的步长: {}", arg);
    }
    Ok(step)
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  status                        查询机器人状态");
    println!("  up|down|left|right [step]     手动移动（默认 {}）", MANUAL_STEP);
    println!("  move <dir> [step]             同上");
    println!("  rotate <cw|ccw>               原地旋转");
    println!("  goto <classroom-id>           前往教室（后台每 2 秒推进一步）");
    println!("  stop                          急停");
    println!("  catalog                       列出学院与教室");
    println!("  help                          显示此帮助");
    println!("  exit | quit                   退出");
    println!();
    println!("  Ctrl+C                        急停");
}

fn print_help_hint(line: &str) {
    let command = line.split_whitespace().next().unwrap_or_default();
    if matches!(command, "move" | "rotate" | "goto") {
        println!("💡 输入 'help' 查看 {} 的用法", command);
    }
}
