//! 记录存储集成测试
//!
//! 使用可编排的远程替身验证回落、单例守卫与读写往返。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use guide_protocol::{
    NewClassroom, NewFaculty, Position, ProtocolError, RecordKey, RobotPatch, RobotState,
    RobotStatus, RoomType,
};
use guide_store::{
    BackendKind, Clock, FallbackStore, KeyValueStore, LocalStore, ManualClock, MemoryStore, RecordStore,
    StoreError,
};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// 远程关系库替身
///
/// - `down`: 所有操作返回 `Unavailable`
/// - `load_delay`: 读取前等待，制造并发窗口
/// - `rival_row`: 首次 insert 之前"另一个进程"已经插入的行
#[derive(Default)]
struct ScriptedRemote {
    rows: Mutex<HashMap<RecordKey, Value>>,
    down: AtomicBool,
    load_delay: Option<Duration>,
    rival_row: Mutex<Option<Value>>,
    inserts: AtomicUsize,
    conflicts: AtomicUsize,
}

impl ScriptedRemote {
    fn unavailable() -> StoreError {
        StoreError::Unavailable {
            backend: "remote",
            reason: "503 Service Unavailable".to_string(),
        }
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(Self::unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for ScriptedRemote {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self, key: RecordKey) -> Result<Option<Value>, StoreError> {
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_up()?;
        Ok(self.rows.lock().get(&key).cloned())
    }

    async fn save(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        self.check_up()?;
        let mut rows = self.rows.lock();
        if key.is_singleton() && !rows.contains_key(&key) {
            return Err(StoreError::NotFound { key });
        }
        rows.insert(key, value.clone());
        Ok(value.clone())
    }

    async fn insert_unique(&self, key: RecordKey, value: &Value) -> Result<Value, StoreError> {
        self.check_up()?;
        self.inserts.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.lock();
        if let Some(rival) = self.rival_row.lock().take() {
            rows.insert(key, rival);
        }
        if rows.contains_key(&key) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Conflict { key });
        }
        rows.insert(key, value.clone());
        Ok(value.clone())
    }

    async fn remove(&self, keys: &[RecordKey]) -> Result<(), StoreError> {
        self.check_up()?;
        let mut rows = self.rows.lock();
        for key in keys {
            rows.remove(key);
        }
        Ok(())
    }
}

fn remote_store(remote: Arc<ScriptedRemote>, local: Arc<MemoryStore>) -> RecordStore {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 22, 18, 0, 0).unwrap()));
    RecordStore::new(
        Arc::new(FallbackStore::new(remote, local)),
        clock,
        BackendKind::Remote,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_creation_converges_on_one_record() {
    let remote = Arc::new(ScriptedRemote {
        load_delay: Some(Duration::from_millis(20)),
        ..Default::default()
    });
    let store = Arc::new(remote_store(remote.clone(), Arc::new(MemoryStore::new())));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.ensure_robot().await }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }

    assert!(ids.iter().all(|id| id == &ids[0]));
    assert_eq!(remote.inserts.load(Ordering::SeqCst), 1);
    assert_eq!(remote.rows.lock().len(), 1);
}

#[tokio::test]
async fn uniqueness_conflict_refetches_existing_row() {
    let rival = json!({
        "id": "robot-7f3a",
        "status": "idle",
        "battery_level": 64,
        "current_x": 120.0,
        "current_y": 40.0,
        "target_classroom_id": null
    });
    let remote = Arc::new(ScriptedRemote {
        rival_row: Mutex::new(Some(rival)),
        ..Default::default()
    });
    let store = remote_store(remote.clone(), Arc::new(MemoryStore::new()));

    let robot = store.ensure_robot().await;
    assert_eq!(robot.id, "robot-7f3a");
    assert_eq!(robot.battery_level, 64);
    assert_eq!(remote.conflicts.load(Ordering::SeqCst), 1);

    // 第二次调用直接读取，不再尝试创建
    let again = store.ensure_robot().await;
    assert_eq!(again.id, "robot-7f3a");
    assert_eq!(remote.inserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn write_then_read_returns_written_value() {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 2, 22, 18, 0, 0).unwrap()));
    let store = RecordStore::in_memory().with_clock(clock.clone());
    store.ensure_robot().await;

    clock.advance(chrono::Duration::seconds(3));
    let written = store
        .update_robot(
            &RobotPatch::new()
                .status(RobotStatus::Moving)
                .position(Position::new(42.5, 17.25))
                .target("cls-3"),
        )
        .await;

    let read: RobotState = store.robot().await;
    assert_eq!(read, written);
    assert_eq!(read.updated_at, Some(clock.now()));
}

#[tokio::test]
async fn remote_outage_degrades_to_local_cache() {
    let remote = Arc::new(ScriptedRemote::default());
    let local = Arc::new(MemoryStore::new());
    let store = remote_store(remote.clone(), local.clone());

    let created = store.ensure_robot().await;
    remote.down.store(true, Ordering::SeqCst);

    let updated = store
        .update_robot(&RobotPatch::new().position(Position::new(200.0, 0.0)))
        .await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.current_x, 200.0);

    // 本地缓存已写入，读取不受远程故障影响
    assert_eq!(store.robot().await.current_x, 200.0);
    let cached = local.load(RecordKey::RobotState).await.unwrap().unwrap();
    assert_eq!(cached["current_x"], 200.0);

    // 远程行保持旧值
    assert_eq!(remote.rows.lock()[&RecordKey::RobotState]["current_x"], 0.0);
}

#[tokio::test]
async fn total_outage_still_serves_default_records() {
    let remote = Arc::new(ScriptedRemote::default());
    remote.down.store(true, Ordering::SeqCst);
    let store = remote_store(remote, Arc::new(MemoryStore::new()));

    let robot = store.ensure_robot().await;
    assert_eq!(robot.status, RobotStatus::Idle);
    assert_eq!(store.classrooms().await.len(), 5);
}

#[tokio::test]
async fn corrupted_local_record_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("robot_state.json"), b"{\"id\": 3,").unwrap();

    let store = RecordStore::new(
        Arc::new(LocalStore::new(dir.path())),
        Arc::new(guide_store::SystemClock),
        BackendKind::Local,
    );
    let robot = store.robot().await;
    assert_eq!(robot.id, "robot-1");
    assert_eq!(robot.status, RobotStatus::Idle);

    // 下一次写入覆盖损坏的文件
    store.update_robot(&RobotPatch::new().battery_level(90)).await;
    assert_eq!(store.robot().await.battery_level, 90);
}

#[tokio::test]
async fn catalog_additions_persist() {
    let store = RecordStore::in_memory();

    let faculty = store
        .add_faculty(NewFaculty {
            name: "Architecture".to_string(),
            floors: 2,
        })
        .await
        .unwrap();
    assert!(faculty.id.starts_with("fac-"));
    assert_eq!(store.faculties().await.len(), 3);

    let classroom = store
        .add_classroom(NewClassroom {
            name: "AR-101".to_string(),
            faculty_id: faculty.id.clone(),
            floor: 1,
            room_type: RoomType::Lecture,
            position: Position::new(300.0, 120.0),
        })
        .await
        .unwrap();
    assert!(classroom.id.starts_with("cls-"));
    assert_eq!(store.classrooms().await.len(), 6);
}

#[tokio::test]
async fn classroom_requires_existing_faculty() {
    let store = RecordStore::in_memory();
    let err = store
        .add_classroom(NewClassroom {
            name: "X-1".to_string(),
            faculty_id: "fac-missing".to_string(),
            floor: 1,
            room_type: RoomType::Other,
            position: Position::ORIGIN,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidInput(ProtocolError::UnknownFaculty(ref id)) if id == "fac-missing"
    ));
}

#[tokio::test]
async fn reset_recreates_robot_with_defaults() {
    let store = RecordStore::in_memory();
    store.ensure_robot().await;
    store
        .update_robot(
            &RobotPatch::new()
                .status(RobotStatus::Moving)
                .position(Position::new(99.0, 99.0))
                .target("cls-1"),
        )
        .await;

    store.reset_to_demo().await.unwrap();

    let robot = store.robot().await;
    assert_eq!(robot.status, RobotStatus::Idle);
    assert_eq!(robot.position(), Position::ORIGIN);
    assert!(robot.target_classroom_id.is_none());
    assert_eq!(store.faculties().await.len(), 2);
}
