//! 持久化记录名
//!
//! 本地键值存储中的键与远程关系库中的表名一一对应。

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// 持久化记录名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// 学院列表
    Faculties,
    /// 教室列表（设施目录）
    Classrooms,
    /// 机器人状态（单例）
    RobotState,
}

impl RecordKey {
    /// 全部记录名（全量清除 / 重置时使用）
    pub const ALL: [RecordKey; 3] = [
        RecordKey::Faculties,
        RecordKey::Classrooms,
        RecordKey::RobotState,
    ];

    /// 键名 / 表名
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKey::Faculties => "faculties",
            RecordKey::Classrooms => "classrooms",
            RecordKey::RobotState => "robot_state",
        }
    }

    /// 是否为单例记录（其余均为列表）
    pub fn is_singleton(self) -> bool {
        matches!(self, RecordKey::RobotState)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "faculties" => Ok(RecordKey::Faculties),
            "classrooms" => Ok(RecordKey::Classrooms),
            "robot_state" => Ok(RecordKey::RobotState),
            other => Err(ProtocolError::UnknownRecordKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_names() {
        for key in RecordKey::ALL {
            assert_eq!(key.as_str().parse::<RecordKey>().unwrap(), key);
        }
        assert!("robots".parse::<RecordKey>().is_err());
    }

    #[test]
    fn test_only_robot_state_is_singleton() {
        assert!(RecordKey::RobotState.is_singleton());
        assert!(!RecordKey::Faculties.is_singleton());
        assert!(!RecordKey::Classrooms.is_singleton());
    }
}
