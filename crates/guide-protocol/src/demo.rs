//! 内置演示数据
//!
//! 存储层在任何读取失败时都以这里的默认记录兜底，全量重置时也写回这些记录。

use chrono::{DateTime, Utc};

use crate::{Classroom, Faculty, RobotState, RobotStatus, RoomType};

/// 默认机器人 id
pub const DEFAULT_ROBOT_ID: &str = "robot-1";

/// 默认机器人状态：原点、空闲、满电
pub fn default_robot_state(now: DateTime<Utc>) -> RobotState {
    RobotState {
        id: DEFAULT_ROBOT_ID.to_string(),
        status: RobotStatus::Idle,
        battery_level: 100,
        current_x: 0.0,
        current_y: 0.0,
        target_classroom_id: None,
        updated_at: Some(now),
    }
}

pub fn demo_faculties(now: DateTime<Utc>) -> Vec<Faculty> {
    vec![
        Faculty {
            id: "fac-1".to_string(),
            name: "Information Technology".to_string(),
            floors: 3,
            created_at: Some(now),
        },
        Faculty {
            id: "fac-2".to_string(),
            name: "Engineering".to_string(),
            floors: 4,
            created_at: Some(now),
        },
    ]
}

pub fn demo_classrooms(now: DateTime<Utc>) -> Vec<Classroom> {
    // (id, name, floor, type, x, y)
    let rooms = [
        ("cls-1", "IT-101", 1, RoomType::Lecture, 50.0, 100.0),
        ("cls-2", "IT-102", 1, RoomType::Lab, 150.0, 100.0),
        ("cls-3", "IT-201", 2, RoomType::Lecture, 50.0, 200.0),
        ("cls-4", "IT-202", 2, RoomType::Lab, 150.0, 200.0),
        ("cls-5", "IT-301", 3, RoomType::Office, 50.0, 300.0),
    ];

    rooms
        .into_iter()
        .map(|(id, name, floor, room_type, x, y)| Classroom {
            id: id.to_string(),
            name: name.to_string(),
            faculty_id: "fac-1".to_string(),
            floor,
            room_type,
            x_coordinate: x,
            y_coordinate: y,
            created_at: Some(now),
        })
        .collect()
}
