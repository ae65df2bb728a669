//! 配置管理命令
//!
//! 用于管理 CLI 配置（本地存储目录、远程后端）

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use guide_store::{BackendKind, RemoteConfig, StoreConfig};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 本地存储目录
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// 远程后端地址（如 https://xyz.supabase.co）
        #[arg(long)]
        url: Option<String>,

        /// 远程后端匿名密钥
        #[arg(long)]
        api_key: Option<String>,

        /// HTTP 超时（毫秒）
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（data_dir / url / timeout_ms / all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 删除远程配置，回到纯本地模式
    Unset,

    /// 检查配置（包含环境变量覆盖）
    Check,

    /// 输出远程库建表脚本
    Schema,
}

impl ConfigCommand {
    pub async fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set {
                data_dir,
                url,
                api_key,
                timeout_ms,
            } => Self::set_(data_dir, url, api_key, timeout_ms),

            ConfigCommand::Get { key } => Self::get_(&key),

            ConfigCommand::Unset => Self::unset_(),

            ConfigCommand::Check => Self::check_(),

            ConfigCommand::Schema => {
                print!("{}", guide_store::remote::SCHEMA_SQL);
                Ok(())
            },
        }
    }

    fn set_(
        data_dir: Option<PathBuf>,
        url: Option<String>,
        api_key: Option<String>,
        timeout_ms: Option<u64>,
    ) -> Result<()> {
        let path = StoreConfig::default_path()?;
        let mut config = load_file()?;

        if let Some(dir) = data_dir {
            println!("✅ 设置本地存储目录: {}", dir.display());
            config.data_dir = Some(dir);
        }

        if url.is_some() || api_key.is_some() || timeout_ms.is_some() {
            let remote = config.remote.get_or_insert_with(|| RemoteConfig {
                url: String::new(),
                api_key: String::new(),
                timeout_ms: None,
            });

            if let Some(url) = url {
                println!("✅ 设置远程地址: {}", url);
                remote.url = url;
            }
            if let Some(key) = api_key {
                println!("✅ 设置远程密钥: {}", mask(&key));
                remote.api_key = key;
            }
            if let Some(ms) = timeout_ms {
                println!("✅ 设置 HTTP 超时: {} ms", ms);
                remote.timeout_ms = Some(ms);
            }
        }

        config.save_to_file(&path).context("写入配置文件失败")?;
        Ok(())
    }

    fn get_(key: &str) -> Result<()> {
        let config = load_file()?;
        let remote = config.remote.as_ref();

        match key {
            "data_dir" => match &config.data_dir {
                Some(dir) => println!("{}", dir.display()),
                None => println!("(未设置)"),
            },

            "url" => match remote {
                Some(r) => println!("{}", r.url),
                None => println!("(未设置)"),
            },

            "timeout_ms" => match remote.and_then(|r| r.timeout_ms) {
                Some(ms) => println!("{}", ms),
                None => println!("(未设置)"),
            },

            _ => {
                println!("Guide CLI 配置:");
                println!("  本地目录: {:?}", config.data_dir);
                println!("  远程地址: {:?}", remote.map(|r| r.url.as_str()));
                println!("  远程密钥: {}", remote.map_or("(未设置)".to_string(), |r| mask(&r.api_key)));
                println!("  HTTP 超时: {:?}", remote.and_then(|r| r.timeout_ms));
            },
        }

        Ok(())
    }

    fn unset_() -> Result<()> {
        let path = StoreConfig::default_path()?;
        let mut config = load_file()?;
        config.remote = None;
        config.save_to_file(&path).context("写入配置文件失败")?;
        println!("✅ 已删除远程配置");
        Ok(())
    }

    fn check_() -> Result<()> {
        let path = StoreConfig::default_path()?;
        let config = load_file()?.with_env_overrides();

        println!("配置文件: {}", path.display());
        println!("  本地目录: {}", config.resolve_data_dir()?.display());
        match config.backend_kind() {
            BackendKind::Remote => {
                let url = config.remote.as_ref().map_or("", |r| r.url.as_str());
                println!("  后端: 远程（{}），失败时回落本地", url);
                println!("  首次使用前需建表: guide-cli config schema | psql \"$SUPABASE_DB_URL\"");
            },
            BackendKind::Local => println!("  后端: 本地"),
        }

        Ok(())
    }
}

fn load_file() -> Result<StoreConfig> {
    let path = StoreConfig::default_path()?;
    StoreConfig::load_from_file(&path).with_context(|| format!("读取配置文件失败: {}", path.display()))
}

/// 密钥只显示前 4 个字符
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
