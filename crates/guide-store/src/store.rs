//! 类型化记录存储
//!
//! 核心唯一依赖的存储接口：读永不失败，写吸收后端故障，
//! 机器人单例的首次创建由守卫串行化。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guide_protocol::{
    Classroom, Faculty, NewClassroom, NewFaculty, ProtocolError, RecordKey, RobotPatch,
    RobotState, demo,
};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    BackendKind, Clock, FacilityCatalog, FallbackStore, KeyValueStore, LocalStore, MemoryStore,
    Record, RemoteStore, StoreConfig, StoreError, SystemClock,
};

/// 记录存储适配器
///
/// # 使用示例
///
/// ```rust,no_run
/// use guide_store::{RecordStore, StoreConfig};
/// use guide_protocol::{RobotPatch, RobotStatus};
///
/// # async fn example() -> Result<(), guide_store::StoreError> {
/// let config = StoreConfig::load_from_file(StoreConfig::default_path()?)?.with_env_overrides();
/// let store = RecordStore::open(&config)?;
///
/// // 启动时显式初始化单例
/// let robot = store.ensure_robot().await;
/// println!("robot {} is {}", robot.id, robot.status);
///
/// let robot = store.update_robot(&RobotPatch::new().status(RobotStatus::Idle)).await;
/// # Ok(())
/// # }
/// ```
pub struct RecordStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    kind: BackendKind,
    /// 单例创建守卫：并发的首次初始化排队，只有第一个调用者真正尝试创建
    robot_init: Mutex<()>,
    /// 目录新增是 read-modify-write，串行执行
    catalog_write: Mutex<()>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, kind: BackendKind) -> Self {
        Self {
            backend,
            clock,
            kind,
            robot_init: Mutex::new(()),
            catalog_write: Mutex::new(()),
        }
    }

    /// 进程内存储（不持久化）
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock), BackendKind::Local)
    }

    /// 按配置打开存储
    ///
    /// 后端在这里选择一次：远程配置完整时为 `FallbackStore(RemoteStore → LocalStore)`，
    /// 否则为纯 `LocalStore`。
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let local: Arc<dyn KeyValueStore> = Arc::new(LocalStore::new(config.resolve_data_dir()?));
        let kind = config.backend_kind();

        let backend: Arc<dyn KeyValueStore> = match (kind, &config.remote) {
            (BackendKind::Remote, Some(remote)) => {
                let primary = Arc::new(RemoteStore::new(remote)?);
                Arc::new(FallbackStore::new(primary, local))
            },
            _ => local,
        };

        info!(backend = backend.name(), kind = ?kind, "record store opened");
        Ok(Self::new(backend, Arc::new(SystemClock), kind))
    }

    /// 替换时钟
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ==================== 通用读写 ====================

    /// 读取记录，任何故障都以默认记录兜底
    pub async fn get<T: Record>(&self) -> T {
        match self.backend.load(T::KEY).await {
            Ok(Some(value)) => self
                .decode(value)
                .unwrap_or_else(|| T::default_record(self.clock.now())),
            Ok(None) => T::default_record(self.clock.now()),
            Err(e) => {
                warn!(key = %T::KEY, backend = self.backend.name(), error = %e, "read failed, using default record");
                T::default_record(self.clock.now())
            },
        }
    }

    /// 写入记录并返回权威值；写入失败时返回传入的值
    pub async fn set<T: Record>(&self, value: &T) -> T {
        match self.try_set(value).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(key = %T::KEY, backend = self.backend.name(), error = %e, "write failed, change not persisted");
                value.clone()
            },
        }
    }

    /// 写入记录，错误交给调用者
    pub async fn try_set<T: Record>(&self, value: &T) -> Result<T, StoreError> {
        let raw =
            serde_json::to_value(value).map_err(|source| StoreError::Corrupted { key: T::KEY, source })?;
        let saved = self.backend.save(T::KEY, &raw).await?;
        Ok(self.decode(saved).unwrap_or_else(|| value.clone()))
    }

    /// 删除记录
    pub async fn remove_all(&self, keys: &[RecordKey]) -> Result<(), StoreError> {
        self.backend.remove(keys).await
    }

    fn decode<T: Record>(&self, value: Value) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(source) => {
                let e = StoreError::Corrupted { key: T::KEY, source };
                warn!(error = %e, "discarding malformed record");
                None
            },
        }
    }

    // ==================== 机器人单例 ====================

    /// 读取机器人状态
    pub async fn robot(&self) -> RobotState {
        self.get().await
    }

    /// 合并部分更新并写入（read-merge-write）
    ///
    /// 此方法本身不加锁；并发写者需要在外层串行化（见 `guide-robot` 的状态机）。
    pub async fn update_robot(&self, patch: &RobotPatch) -> RobotState {
        self.update_robot_with(|_| Some(patch.clone())).await
    }

    /// 基于当前值计算补丁后写入；`f` 返回 `None` 时不写入，直接返回当前值
    pub async fn update_robot_with<F>(&self, f: F) -> RobotState
    where
        F: FnOnce(&RobotState) -> Option<RobotPatch> + Send,
    {
        let current: RobotState = self.get().await;
        let Some(patch) = f(&current) else {
            return current;
        };

        let next = current.apply(&patch, self.clock.now());
        debug!(
            status = %next.status,
            x = next.current_x,
            y = next.current_y,
            target = ?next.target_classroom_id,
            "robot state update"
        );
        self.set(&next).await
    }

    /// 确保机器人单例存在并返回它
    ///
    /// 并发调用在守卫上排队，只有第一个发现记录缺失的调用者会尝试创建。
    /// 跨进程的竞争由后端的唯一约束兜住：`Conflict` 表示其他调用者已创建，
    /// 此时重新读取已有记录。
    pub async fn ensure_robot(&self) -> RobotState {
        let _guard = self.robot_init.lock().await;

        match self.backend.load(RecordKey::RobotState).await {
            Ok(Some(value)) => {
                if let Some(existing) = self.decode::<RobotState>(value) {
                    return existing;
                }
            },
            Ok(None) => {},
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "robot state lookup failed");
            },
        }

        let fresh = RobotState::default_record(self.clock.now());
        let raw = match serde_json::to_value(&fresh) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "cannot encode default robot state");
                return fresh;
            },
        };

        match self.backend.insert_unique(RecordKey::RobotState, &raw).await {
            Ok(created) => {
                info!(backend = self.backend.name(), "robot state created");
                self.decode(created).unwrap_or(fresh)
            },
            Err(e) if e.is_conflict() => {
                debug!("robot state already created elsewhere, re-fetching");
                self.get().await
            },
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "robot state creation failed, using default");
                fresh
            },
        }
    }

    // ==================== 设施目录 ====================

    pub async fn faculties(&self) -> Vec<Faculty> {
        self.get().await
    }

    pub async fn classrooms(&self) -> Vec<Classroom> {
        self.get().await
    }

    /// 新增学院
    pub async fn add_faculty(&self, draft: NewFaculty) -> Result<Faculty, StoreError> {
        draft.validate()?;
        let _guard = self.catalog_write.lock().await;

        let mut faculties: Vec<Faculty> = self.get().await;
        let now = self.clock.now();
        let id = next_id("fac", now, |id| faculties.iter().any(|f| f.id == id));
        let faculty = draft.into_faculty(id, now);

        faculties.push(faculty.clone());
        self.try_set(&faculties).await?;
        info!(id = %faculty.id, name = %faculty.name, "faculty added");
        Ok(faculty)
    }

    /// 新增教室（学院必须已存在）
    pub async fn add_classroom(&self, draft: NewClassroom) -> Result<Classroom, StoreError> {
        draft.validate()?;
        let _guard = self.catalog_write.lock().await;

        let faculties: Vec<Faculty> = self.get().await;
        if !faculties.iter().any(|f| f.id == draft.faculty_id) {
            return Err(ProtocolError::UnknownFaculty(draft.faculty_id).into());
        }

        let mut classrooms: Vec<Classroom> = self.get().await;
        let now = self.clock.now();
        let id = next_id("cls", now, |id| classrooms.iter().any(|c| c.id == id));
        let classroom = draft.into_classroom(id, now);

        classrooms.push(classroom.clone());
        self.try_set(&classrooms).await?;
        info!(id = %classroom.id, name = %classroom.name, "classroom added");
        Ok(classroom)
    }

    // ==================== 清除 / 重置 ====================

    /// 删除全部记录（之后的读取返回默认记录）
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.remove_all(&RecordKey::ALL).await
    }

    /// 清除并写回演示数据，机器人单例以默认值重建
    pub async fn reset_to_demo(&self) -> Result<(), StoreError> {
        self.clear_all().await?;

        let now = self.clock.now();
        self.try_set(&demo::demo_faculties(now)).await?;
        self.try_set(&demo::demo_classrooms(now)).await?;

        let raw = serde_json::to_value(demo::default_robot_state(now)).map_err(|source| {
            StoreError::Corrupted {
                key: RecordKey::RobotState,
                source,
            }
        })?;
        match self.backend.insert_unique(RecordKey::RobotState, &raw).await {
            Ok(_) => {},
            // 远程表中仍有旧行（例如删除被拒绝）时按 id 覆盖
            Err(e) if e.is_conflict() => {
                self.backend.save(RecordKey::RobotState, &raw).await?;
            },
            Err(e) => return Err(e),
        }

        info!("store reset to demo data");
        Ok(())
    }
}

#[async_trait]
impl FacilityCatalog for RecordStore {
    async fn resolve(&self, facility_id: &str) -> Option<Classroom> {
        self.classrooms().await.into_iter().find(|c| c.id == facility_id)
    }
}

/// 生成 `<prefix>-<毫秒时间戳>` 形式的 id，冲突时追加序号
fn next_id<F>(prefix: &str, now: DateTime<Utc>, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base = format!("{}-{}", prefix, now.timestamp_millis());
    if !taken(&base) {
        return base;
    }

    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}
