//! 设施目录记录
//!
//! 学院与教室由管理子系统维护；导航核心只读取教室坐标。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Position, ProtocolError};

/// 学院
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: String,
    pub name: String,
    /// 楼层数（≥ 1）
    pub floors: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 房间类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    Lecture,
    Lab,
    Office,
    #[serde(other)]
    Other,
}

impl RoomType {
    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Lecture => "lecture",
            RoomType::Lab => "lab",
            RoomType::Office => "office",
            RoomType::Other => "other",
        }
    }

    /// 宽松解析，未知类型归为 `Other`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "lecture" => RoomType::Lecture,
            "lab" => RoomType::Lab,
            "office" => RoomType::Office,
            _ => RoomType::Other,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 教室（导航目标设施）
///
/// 坐标以 `x_coordinate` / `y_coordinate` 两列存储，位于设施地图平面内。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: String,
    pub name: String,
    /// 所属学院（外键）
    pub faculty_id: String,
    /// 楼层（≥ 1）
    pub floor: u32,
    #[serde(default)]
    pub room_type: RoomType,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Classroom {
    /// 教室在地图平面上的坐标
    pub fn position(&self) -> Position {
        Position::new(self.x_coordinate, self.y_coordinate)
    }
}

/// 新学院草稿（id 与创建时间由存储层分配）
#[derive(Debug, Clone, PartialEq)]
pub struct NewFaculty {
    pub name: String,
    pub floors: u32,
}

impl NewFaculty {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.trim().is_empty() {
            return Err(ProtocolError::MissingField("name"));
        }
        if self.floors < 1 {
            return Err(ProtocolError::InvalidFloor(self.floors));
        }
        Ok(())
    }

    pub fn into_faculty(self, id: String, now: DateTime<Utc>) -> Faculty {
        Faculty {
            id,
            name: self.name.trim().to_string(),
            floors: self.floors,
            created_at: Some(now),
        }
    }
}

/// 新教室草稿
#[derive(Debug, Clone, PartialEq)]
pub struct NewClassroom {
    pub name: String,
    pub faculty_id: String,
    pub floor: u32,
    pub room_type: RoomType,
    pub position: Position,
}

impl NewClassroom {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.name.trim().is_empty() {
            return Err(ProtocolError::MissingField("name"));
        }
        if self.faculty_id.trim().is_empty() {
            return Err(ProtocolError::MissingField("faculty_id"));
        }
        if self.floor < 1 {
            return Err(ProtocolError::InvalidFloor(self.floor));
        }
        Ok(())
    }

    pub fn into_classroom(self, id: String, now: DateTime<Utc>) -> Classroom {
        Classroom {
            id,
            name: self.name.trim().to_string(),
            faculty_id: self.faculty_id,
            floor: self.floor,
            room_type: self.room_type,
            x_coordinate: self.position.x,
            y_coordinate: self.position.y,
            created_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_unknown_is_other() {
        let room: RoomType = serde_json::from_str("\"auditorium\"").unwrap();
        assert_eq!(room, RoomType::Other);
        assert_eq!(RoomType::parse_lenient(" LAB "), RoomType::Lab);
    }

    #[test]
    fn test_classroom_wire_format() {
        let json = r#"{
            "id": "cls-1", "name": "IT-101", "faculty_id": "fac-1", "floor": 1,
            "room_type": "lecture", "x_coordinate": 50, "y_coordinate": 100
        }"#;
        let classroom: Classroom = serde_json::from_str(json).unwrap();
        assert_eq!(classroom.position(), Position::new(50.0, 100.0));
        assert_eq!(classroom.room_type, RoomType::Lecture);
        assert!(classroom.created_at.is_none());
    }

    #[test]
    fn test_new_faculty_validation() {
        let ok = NewFaculty {
            name: "Architecture".to_string(),
            floors: 2,
        };
        assert!(ok.validate().is_ok());

        let no_floors = NewFaculty {
            name: "Architecture".to_string(),
            floors: 0,
        };
        assert_eq!(no_floors.validate(), Err(ProtocolError::InvalidFloor(0)));

        let blank = NewFaculty {
            name: "   ".to_string(),
            floors: 1,
        };
        assert_eq!(blank.validate(), Err(ProtocolError::MissingField("name")));
    }

    #[test]
    fn test_new_classroom_into_record() {
        let draft = NewClassroom {
            name: " IT-401 ".to_string(),
            faculty_id: "fac-1".to_string(),
            floor: 4,
            room_type: RoomType::Lab,
            position: Position::new(120.0, 340.0),
        };
        assert!(draft.validate().is_ok());

        let now = Utc::now();
        let classroom = draft.into_classroom("cls-42".to_string(), now);
        assert_eq!(classroom.name, "IT-401");
        assert_eq!(classroom.x_coordinate, 120.0);
        assert_eq!(classroom.created_at, Some(now));
    }
}
