//! 类型化记录

use chrono::{DateTime, Utc};
use guide_protocol::{Classroom, Faculty, RecordKey, RobotState, demo};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 可持久化记录
///
/// 每种记录绑定一个记录名和一个内置默认值；任何读取故障都以默认值兜底。
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// 记录名
    const KEY: RecordKey;

    /// 内置默认记录
    fn default_record(now: DateTime<Utc>) -> Self;
}

impl Record for RobotState {
    const KEY: RecordKey = RecordKey::RobotState;

    fn default_record(now: DateTime<Utc>) -> Self {
        demo::default_robot_state(now)
    }
}

impl Record for Vec<Faculty> {
    const KEY: RecordKey = RecordKey::Faculties;

    fn default_record(now: DateTime<Utc>) -> Self {
        demo::demo_faculties(now)
    }
}

impl Record for Vec<Classroom> {
    const KEY: RecordKey = RecordKey::Classrooms;

    fn default_record(now: DateTime<Utc>) -> Self {
        demo::demo_classrooms(now)
    }
}
