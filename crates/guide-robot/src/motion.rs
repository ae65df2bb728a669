//! 运动学
//!
//! 纯同步计算，不涉及存储。坐标系与设施地图一致：x 向右，y 向下。

use std::fmt;
use std::str::FromStr;

use guide_protocol::Position;

/// 到达阈值：距离小于此值即视为到达
pub const ARRIVAL_THRESHOLD: f64 = 5.0;

/// 每次仿真步进的固定距离（与轮询间隔无关）
pub const STEP_MAGNITUDE: f64 = 10.0;

/// 平面边界
pub const PLANE_MIN: f64 = 0.0;
pub const PLANE_MAX: f64 = 400.0;

/// 方向键一次移动的距离
pub const MANUAL_STEP: f64 = 20.0;

/// 单步结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// 沿目标方向前进了 `STEP_MAGNITUDE`
    Advanced(Position),
    /// 已到达，位置吸附到目标坐标
    Arrived(Position),
}

impl Step {
    pub fn position(&self) -> Position {
        match self {
            Step::Advanced(p) | Step::Arrived(p) => *p,
        }
    }

    pub fn is_arrived(&self) -> bool {
        matches!(self, Step::Arrived(_))
    }
}

/// 向目标前进一步
///
/// - 距离 < `ARRIVAL_THRESHOLD`（含 0）：到达，位置精确等于目标
/// - 否则沿单位向量前进 `STEP_MAGNITUDE`，可能越过目标，下一步再吸附
pub fn step_toward(current: Position, target: Position) -> Step {
    let dx = target.x - current.x;
    let dy = target.y - current.y;
    let distance = dx.hypot(dy);

    // 写成取反比较，NaN 距离同样按到达处理，避免除以 0 或 NaN
    if !(distance >= ARRIVAL_THRESHOLD) {
        return Step::Arrived(target);
    }

    Step::Advanced(Position::new(
        current.x + dx / distance * STEP_MAGNITUDE,
        current.y + dy / distance * STEP_MAGNITUDE,
    ))
}

/// 把位置裁剪到平面内
pub fn clamp_to_plane(position: Position) -> Position {
    Position::new(clamp_axis(position.x), clamp_axis(position.y))
}

fn clamp_axis(value: f64) -> f64 {
    if value.is_nan() {
        PLANE_MIN
    } else {
        value.clamp(PLANE_MIN, PLANE_MAX)
    }
}

/// 方向键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// 按指定步长换算为位移（屏幕坐标，向上为 -y）
    pub fn delta(self, step: f64) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -step),
            Direction::Down => (0.0, step),
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// 旋转方向
///
/// 坐标模型没有朝向，旋转只作为状态提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl FromStr for Rotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cw" | "clockwise" => Ok(Rotation::Clockwise),
            "ccw" | "counterclockwise" | "counter-clockwise" => Ok(Rotation::CounterClockwise),
            other => Err(format!("unknown rotation: {}", other)),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Clockwise => f.write_str("cw"),
            Rotation::CounterClockwise => f.write_str("ccw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_diagonal() {
        let step = step_toward(Position::ORIGIN, Position::new(100.0, 100.0));
        let p = step.position();
        assert!(!step.is_arrived());
        assert!((p.x - 7.0710678).abs() < 1e-6);
        assert!((p.y - 7.0710678).abs() < 1e-6);
    }

    #[test]
    fn test_step_zero_distance_arrives() {
        let here = Position::new(50.0, 100.0);
        assert_eq!(step_toward(here, here), Step::Arrived(here));
    }

    #[test]
    fn test_step_just_below_threshold_snaps() {
        let target = Position::new(150.0, 100.0);
        let step = step_toward(Position::new(145.01, 100.0), target);
        assert_eq!(step, Step::Arrived(target));
    }

    #[test]
    fn test_step_at_threshold_advances_past_target() {
        // 距离恰好为 5 时仍然前进 10，越过目标
        let step = step_toward(Position::new(0.0, 0.0), Position::new(5.0, 0.0));
        assert_eq!(step, Step::Advanced(Position::new(10.0, 0.0)));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(
            clamp_to_plane(Position::new(-20.0, 420.0)),
            Position::new(0.0, 400.0)
        );
        assert_eq!(
            clamp_to_plane(Position::new(f64::NEG_INFINITY, f64::NAN)),
            Position::new(0.0, 0.0)
        );
    }

    #[test]
    fn test_direction_parse_and_delta() {
        assert_eq!("UP".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!(Direction::Up.delta(MANUAL_STEP), (0.0, -20.0));
        assert_eq!(Direction::Right.delta(MANUAL_STEP), (20.0, 0.0));
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn test_rotation_parse() {
        assert_eq!("cw".parse::<Rotation>().unwrap(), Rotation::Clockwise);
        assert_eq!("CCW".parse::<Rotation>().unwrap(), Rotation::CounterClockwise);
        assert!("spin".parse::<Rotation>().is_err());
    }
}
