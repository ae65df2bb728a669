//! 机器人状态机
//!
//! 所有状态变更都经过同一把异步锁：读取当前记录、计算补丁、写回，
//! 整个过程串行化，手动命令与导航步进不会互相覆盖。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use guide_protocol::{Classroom, RobotPatch, RobotState, RobotStatus};
use guide_store::RecordStore;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::Observer;
use crate::motion::{self, Direction, Rotation, Step};
use crate::settle::{MOVE_SETTLE, ROTATE_SETTLE, SettleTicket};

/// 机器人状态机
///
/// # 状态转换
///
/// ```text
/// idle ──go_to──> moving ──到达──> arrived
///  ↑                │  ↑              │
///  └──急停/稳定复位──┘  └──手动命令────┘
/// ```
///
/// `error` 状态保留，当前没有操作会进入它。
///
/// # 使用示例
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use guide_robot::{Direction, RobotStateMachine, spawn_settle};
/// use guide_store::RecordStore;
///
/// # async fn example() {
/// let store = Arc::new(RecordStore::in_memory());
/// let machine = RobotStateMachine::start(store).await;
///
/// let (state, ticket) = machine.apply_direction(Direction::Up, 20.0).await;
/// println!("moved to ({}, {})", state.current_x, state.current_y);
/// spawn_settle(machine.clone(), ticket);
/// # }
/// ```
pub struct RobotStateMachine {
    store: Arc<RecordStore>,
    /// 串行化读改写
    serial: Mutex<()>,
    /// 命令纪元：每条手动命令 / 急停 / 设定目标都会递增
    epoch: AtomicU64,
    /// 最近一次写入的状态
    tx: watch::Sender<RobotState>,
}

impl RobotStateMachine {
    /// 启动状态机：确保机器人记录存在
    pub async fn start(store: Arc<RecordStore>) -> Arc<Self> {
        let initial = store.ensure_robot().await;
        info!(
            id = %initial.id,
            status = %initial.status,
            backend = store.backend_name(),
            "robot state machine started"
        );

        let (tx, _rx) = watch::channel(initial);
        Arc::new(Self {
            store,
            serial: Mutex::new(()),
            epoch: AtomicU64::new(0),
            tx,
        })
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// 从存储读取当前状态（可能包含其他进程的写入）
    pub async fn snapshot(&self) -> RobotState {
        self.store.robot().await
    }

    /// 本状态机最近一次写入的状态
    pub fn latest(&self) -> RobotState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RobotState> {
        self.tx.subscribe()
    }

    pub fn observer(self: &Arc<Self>) -> Observer {
        Observer::new(Arc::clone(self))
    }

    /// 当前命令纪元
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// 手动位移：结果裁剪到平面内，状态置为 `moving`
    ///
    /// 已有的导航目标保留，轮询会从新位置继续逼近。
    pub async fn apply_manual_move(&self, dx: f64, dy: f64) -> (RobotState, SettleTicket) {
        let epoch = self.bump_epoch();
        let next = self
            .mutate(|current| {
                let to = motion::clamp_to_plane(current.position().offset(dx, dy));
                Some(RobotPatch::new().status(RobotStatus::Moving).position(to))
            })
            .await;

        debug!(x = next.current_x, y = next.current_y, epoch, "manual move");
        (next, SettleTicket::new(epoch, MOVE_SETTLE))
    }

    /// 方向键移动
    pub async fn apply_direction(&self, direction: Direction, step: f64) -> (RobotState, SettleTicket) {
        let (dx, dy) = direction.delta(step);
        self.apply_manual_move(dx, dy).await
    }

    /// 旋转：不改变位置，只把状态置为 `moving`
    pub async fn apply_rotate(&self, rotation: Rotation) -> (RobotState, SettleTicket) {
        let epoch = self.bump_epoch();
        let next = self
            .mutate(|_| Some(RobotPatch::new().status(RobotStatus::Moving)))
            .await;

        debug!(%rotation, epoch, "rotate");
        (next, SettleTicket::new(epoch, ROTATE_SETTLE))
    }

    /// 向目标前进一步
    ///
    /// 只有在机器人仍以 `target` 为目标移动时才会写入；
    /// 急停或改换目标之后到达的旧步进直接丢弃。
    pub async fn step_toward_target(&self, target: &Classroom) -> RobotState {
        self.mutate(|current| {
            if current.active_target() != Some(target.id.as_str()) {
                debug!(target = %target.id, "stale navigation step discarded");
                return None;
            }

            match motion::step_toward(current.position(), target.position()) {
                Step::Arrived(at) => {
                    info!(target = %target.id, name = %target.name, "arrived");
                    Some(
                        RobotPatch::new()
                            .status(RobotStatus::Arrived)
                            .position(at)
                            .clear_target(),
                    )
                },
                Step::Advanced(to) => Some(RobotPatch::new().position(to)),
            }
        })
        .await
    }

    /// 急停：任何状态下都立即回到 `idle` 并清除目标
    pub async fn emergency_stop(&self) -> RobotState {
        let epoch = self.bump_epoch();
        let next = self
            .mutate(|_| Some(RobotPatch::new().status(RobotStatus::Idle).clear_target()))
            .await;

        warn!(epoch, "emergency stop");
        next
    }

    /// 设定导航目标并进入 `moving`
    ///
    /// 不校验目标是否存在，由 [`crate::NavigationCoordinator::go_to`] 负责。
    pub async fn set_target(&self, facility_id: &str) -> RobotState {
        self.bump_epoch();
        self.mutate(|_| {
            Some(
                RobotPatch::new()
                    .status(RobotStatus::Moving)
                    .target(facility_id),
            )
        })
        .await
    }

    /// 稳定复位
    ///
    /// 凭据仍是最新命令，且机器人处于无目标的 `moving` 时，回到 `idle`。
    /// 否则不做任何事并返回 `None`。
    ///
    /// 注意：这里偏离了"计时器到期即写回 `idle`"的简单规则。导航途中的手动微调
    /// 到期后不会复位，带目标的 `moving` 保持不变，导航继续；
    /// 若要到期即停，调用方应先 [`emergency_stop`](Self::emergency_stop)。
    pub async fn settle(&self, ticket: SettleTicket) -> Option<RobotState> {
        let mut applied = false;
        let epoch = &self.epoch;
        let next = self
            .mutate(|current| {
                if epoch.load(Ordering::SeqCst) != ticket.epoch {
                    return None;
                }
                if !current.is_moving() || current.has_target() {
                    return None;
                }
                applied = true;
                Some(RobotPatch::new().status(RobotStatus::Idle))
            })
            .await;

        applied.then_some(next)
    }

    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn mutate<F>(&self, f: F) -> RobotState
    where
        F: FnOnce(&RobotState) -> Option<RobotPatch> + Send,
    {
        let _guard = self.serial.lock().await;
        let next = self.store.update_robot_with(f).await;

        self.tx.send_if_modified(|published| {
            if *published == next {
                false
            } else {
                *published = next.clone();
                true
            }
        });
        next
    }
}
