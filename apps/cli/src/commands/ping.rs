//! 连通性检查命令

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use guide_store::{BackendKind, RemoteStore, StoreConfig};

/// 连通性检查命令参数
#[derive(Args, Debug)]
pub struct PingCommand {
    /// 失败时以非零状态退出
    #[arg(long)]
    pub strict: bool,
}

impl PingCommand {
    pub async fn execute(&self, config: &StoreConfig) -> Result<()> {
        let remote = match (config.backend_kind(), &config.remote) {
            (BackendKind::Remote, Some(remote)) => remote,
            _ => {
                println!("💾 本地模式: {}", config.resolve_data_dir()?.display());
                return Ok(());
            },
        };

        println!("⏳ 连接 {} ...", remote.url);
        let store = RemoteStore::new(remote).context("创建远程客户端失败")?;
        let started = Instant::now();

        match store.ping().await {
            Ok(rows) => {
                println!(
                    "✅ 远程后端可用（{} ms，faculties 返回 {} 行）",
                    started.elapsed().as_millis(),
                    rows
                );
                Ok(())
            },
            Err(err) if self.strict => Err(anyhow::Error::new(err).context("远程后端不可用")),
            Err(err) => {
                println!("⚠️  远程后端不可用: {}", err);
                println!("💡 读写将回落到本地存储");
                Ok(())
            },
        }
    }
}
