//! 命令执行上下文
//!
//! One-shot 和 REPL 共用：打开存储、启动状态机、组装导航协调器。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use guide_robot::{NavigationCoordinator, RobotStateMachine};
use guide_store::{RecordStore, StoreConfig};
use tracing::info;

pub struct GuideContext {
    pub store: Arc<RecordStore>,
    pub machine: Arc<RobotStateMachine>,
    pub navigator: Arc<NavigationCoordinator>,
}

impl GuideContext {
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let store = Arc::new(RecordStore::open(config).context("打开记录存储失败")?);
        info!(
            backend = store.backend_name(),
            kind = ?store.backend_kind(),
            "record store opened"
        );

        let machine = RobotStateMachine::start(store.clone()).await;
        let navigator = Arc::new(NavigationCoordinator::new(machine.clone(), store.clone()));

        Ok(Self {
            store,
            machine,
            navigator,
        })
    }
}

/// 加载配置：配置文件 → 环境变量 → 命令行参数（后者优先）
pub fn load_config(data_dir: Option<PathBuf>) -> Result<StoreConfig> {
    let path = StoreConfig::default_path()?;
    let mut config = StoreConfig::load_from_file(&path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))?
        .with_env_overrides();

    if let Some(dir) = data_dir {
        config.data_dir = Some(dir);
    }

    Ok(config)
}
