//! 存储配置
//!
//! 配置文件路径：
//! - Linux: `~/.config/campus-guide/config.toml`
//! - macOS: `~/Library/Application Support/campus-guide/config.toml`
//! - Windows: `%APPDATA%\campus-guide\config.toml`
//!
//! ```toml
//! data_dir = "/var/lib/campus-guide"
//!
//! [remote]
//! url = "https://xyzcompany.supabase.co"
//! api_key = "public-anon-key"
//! timeout_ms = 5000
//! ```
//!
//! 环境变量在加载时覆盖文件内容（只求值一次）：
//! `SUPABASE_URL` / `EXPO_PUBLIC_SUPABASE_URL`、
//! `SUPABASE_ANON_KEY` / `EXPO_PUBLIC_SUPABASE_ANON_KEY`、`CAMPUS_GUIDE_DATA_DIR`。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::StoreError;

const APP_DIR: &str = "campus-guide";

/// 后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// 仅本地持久化存储
    Local,
    /// 远程关系库，失败时回落到本地
    Remote,
}

/// 远程关系库配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 项目地址（如 `https://xyzcompany.supabase.co`）
    pub url: String,

    /// 匿名访问密钥
    pub api_key: String,

    /// HTTP 客户端超时（毫秒），不设置则无限等待
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RemoteConfig {
    fn is_complete(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// 存储配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 本地存储目录（默认为平台数据目录下的 `campus-guide`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// 远程关系库（缺省时使用纯本地模式）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

impl StoreConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| StoreError::Config("cannot determine config directory".to_string()))?;
        path.push(APP_DIR);
        path.push("config.toml");
        Ok(path)
    }

    /// 从文件加载配置，文件不存在时返回默认配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 应用进程环境变量覆盖
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// 应用覆盖（`lookup` 按变量名返回值）
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names.iter().find_map(|name| lookup(*name).filter(|v| !v.trim().is_empty()))
        };

        if let Some(dir) = first(&["CAMPUS_GUIDE_DATA_DIR"]) {
            self.data_dir = Some(PathBuf::from(dir));
        }

        let url = first(&["SUPABASE_URL", "EXPO_PUBLIC_SUPABASE_URL"]);
        let key = first(&["SUPABASE_ANON_KEY", "EXPO_PUBLIC_SUPABASE_ANON_KEY"]);

        match self.remote.as_mut() {
            Some(remote) => {
                if let Some(url) = url {
                    remote.url = url;
                }
                if let Some(key) = key {
                    remote.api_key = key;
                }
            },
            None => {
                if let (Some(url), Some(api_key)) = (url, key) {
                    self.remote = Some(RemoteConfig {
                        url,
                        api_key,
                        timeout_ms: None,
                    });
                }
            },
        }

        self
    }

    /// 远程配置完整时启用远程模式
    pub fn backend_kind(&self) -> BackendKind {
        match &self.remote {
            Some(remote) if remote.is_complete() => BackendKind::Remote,
            _ => BackendKind::Local,
        }
    }

    /// 本地存储目录
    pub fn resolve_data_dir(&self) -> Result<PathBuf, StoreError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        let mut path = dirs::data_local_dir()
            .ok_or_else(|| StoreError::Config("cannot determine data directory".to_string()))?;
        path.push(APP_DIR);
        Ok(path)
    }
}
