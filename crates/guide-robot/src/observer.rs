//! 状态观察者
//!
//! 界面层（CLI 状态栏、REPL 提示）通过它读取机器人状态：
//! 既可以轮询存储，也可以等待本进程内的状态变更通知。

use std::sync::Arc;

use guide_protocol::RobotState;
use tokio::sync::watch;

use crate::RobotStateMachine;

pub struct Observer {
    machine: Arc<RobotStateMachine>,
    rx: watch::Receiver<RobotState>,
}

impl Observer {
    pub fn new(machine: Arc<RobotStateMachine>) -> Self {
        let rx = machine.subscribe();
        Self { machine, rx }
    }

    /// 轮询存储
    pub async fn poll(&self) -> RobotState {
        self.machine.snapshot().await
    }

    /// 最近一次通知的状态（不访问存储）
    pub fn latest(&self) -> RobotState {
        self.rx.borrow().clone()
    }

    /// 等待下一次状态变更
    pub async fn changed(&mut self) -> Option<RobotState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// 等待直到状态满足条件（包括当前状态）
    pub async fn wait_for<P>(&mut self, mut predicate: P) -> Option<RobotState>
    where
        P: FnMut(&RobotState) -> bool,
    {
        loop {
            {
                let state = self.rx.borrow_and_update();
                if predicate(&state) {
                    return Some(state.clone());
                }
            }
            self.rx.changed().await.ok()?;
        }
    }
}
