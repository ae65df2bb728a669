//! # Guide Store - 记录存储适配层
//!
//! 为导览机器人核心提供统一的异步读写接口，屏蔽本地键值存储与远程关系库的差异。
//!
//! ## 分层
//!
//! ```text
//! RecordStore（类型化：get / set / update_robot / ensure_robot）
//!     ↓ serde_json::Value
//! FallbackStore（装饰器：远程失败 → 本地）
//!     ↓                      ↓
//! RemoteStore (PostgREST)   LocalStore（JSON 文件） / MemoryStore
//! ```
//!
//! ## 故障策略
//!
//! - 读路径永不失败：任何存储故障或损坏数据都以内置默认记录兜底
//! - 写路径吸收远程故障，回落到本地缓存
//! - 单例创建冲突（唯一约束）视为"其他调用者已创建"，重新读取已有记录
//!
//! 后端选择在打开存储时根据配置决定一次，之后不再重新判断。

mod backend;
mod catalog;
pub mod clock;
pub mod config;
mod error;
mod fallback;
mod local;
mod memory;
mod record;
pub mod remote;
mod store;

pub use backend::KeyValueStore;
pub use catalog::FacilityCatalog;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BackendKind, RemoteConfig, StoreConfig};
pub use error::StoreError;
pub use fallback::FallbackStore;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use record::Record;
pub use remote::RemoteStore;
pub use store::RecordStore;
