//! 终端输出格式

use guide_protocol::{Classroom, Faculty, RobotState, RobotStatus};

pub fn status_icon(status: RobotStatus) -> &'static str {
    match status {
        RobotStatus::Idle => "⏸️ ",
        RobotStatus::Moving => "🚶",
        RobotStatus::Arrived => "📍",
        RobotStatus::Error => "❌",
    }
}

/// 单行状态摘要
pub fn robot_line(state: &RobotState) -> String {
    let mut line = format!(
        "{} {} ({:.1}, {:.1}) 电量 {}%",
        status_icon(state.status),
        state.status,
        state.current_x,
        state.current_y,
        state.battery_level
    );
    if let Some(target) = &state.target_classroom_id {
        line.push_str(&format!(" → {}", target));
    }
    line
}

pub fn classroom_line(classroom: &Classroom) -> String {
    format!(
        "{:<8} {:<12} F{:<3} {:<8} ({:>5.1}, {:>5.1})",
        classroom.id,
        classroom.name,
        classroom.floor,
        classroom.room_type,
        classroom.x_coordinate,
        classroom.y_coordinate
    )
}

/// 学院 + 教室表
pub fn print_catalog(faculties: &[Faculty], classrooms: &[Classroom]) {
    for faculty in faculties {
        println!("🏛️  {} {}（{} 层）", faculty.id, faculty.name, faculty.floors);
        let mut rooms: Vec<&Classroom> = classrooms
            .iter()
            .filter(|c| c.faculty_id == faculty.id)
            .collect();
        rooms.sort_by(|a, b| a.floor.cmp(&b.floor).then_with(|| a.name.cmp(&b.name)));

        if rooms.is_empty() {
            println!("    (无教室)");
        }
        for room in rooms {
            println!("    {}", classroom_line(room));
        }
    }

    // 引用了不存在学院的教室
    let orphans: Vec<&Classroom> = classrooms
        .iter()
        .filter(|c| !faculties.iter().any(|f| f.id == c.faculty_id))
        .collect();
    if !orphans.is_empty() {
        println!("⚠️  未归属学院的教室:");
        for room in orphans {
            println!("    {}", classroom_line(room));
        }
    }
}
