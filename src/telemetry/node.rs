//! 传感器节点
//!
//! 周期性轮询数据源，取出本路口方向的车辆数，用可靠发送端发送一个窗口。
//! 停止条件：上游报告 `running == false`，或连续 5 次所有方向都为零。

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use super::source::{CountsReport, TelemetrySource, direction_for};
use crate::error::{Error, Result};
use crate::sender::{ReliableSender, SenderStats, WindowStats};

/// 连续全零读数达到该次数即退出
pub const MAX_ZERO_POLLS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// 上游报告已停止
    UpstreamStopped,
    /// 连续多次无车辆
    Idle,
}

/// 单次轮询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Sent { reading: u64, window: WindowStats },
    Exit(ExitReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOutcome {
    pub reason: ExitReason,
    pub polls: u64,
    pub stats: SenderStats,
}

pub struct SensorNode<S> {
    junction_id: u32,
    direction: &'static str,
    source: S,
    sender: ReliableSender,
    interval: Duration,
    zero_streak: u32,
    polls: u64,
}

impl<S: TelemetrySource> SensorNode<S> {
    pub fn new(junction_id: u32, source: S, sender: ReliableSender, interval: Duration) -> Result<Self> {
        let direction = direction_for(junction_id).ok_or_else(|| {
            Error::Config(format!("junction must be in 1..=4, got {junction_id}"))
        })?;
        Ok(Self {
            junction_id,
            direction,
            source,
            sender,
            interval,
            zero_streak: 0,
            polls: 0,
        })
    }

    pub fn junction_id(&self) -> u32 {
        self.junction_id
    }

    pub fn direction(&self) -> &'static str {
        self.direction
    }

    pub fn zero_streak(&self) -> u32 {
        self.zero_streak
    }

    pub fn sender(&self) -> &ReliableSender {
        &self.sender
    }

    pub fn stats(&self) -> SenderStats {
        *self.sender.stats()
    }

    /// 轮询一次并在需要时发送一个窗口
    pub fn step(&mut self) -> Step {
        self.polls += 1;
        let report = self.source.poll().unwrap_or_else(|e| {
            warn!(error = %e, "⚠️  拉取车辆数失败，按全零处理");
            CountsReport::zeros()
        });

        if !report.running {
            info!(junction = self.junction_id, "🛑 上游已停止，传感器节点退出");
            return Step::Exit(ExitReason::UpstreamStopped);
        }

        if report.all_zero() {
            self.zero_streak += 1;
            warn!(streak = self.zero_streak, max = MAX_ZERO_POLLS, "⚠️  读数全为零");
        } else {
            self.zero_streak = 0;
        }
        if self.zero_streak >= MAX_ZERO_POLLS {
            info!(junction = self.junction_id, "🛑 长时间无车辆，传感器节点退出");
            return Step::Exit(ExitReason::Idle);
        }

        let reading = report.count_for(self.direction);
        let window = self.sender.send_window(self.junction_id, reading);
        Step::Sent { reading, window }
    }

    /// 循环直到满足停止条件
    #[tracing::instrument(skip(self), fields(junction = self.junction_id, direction = self.direction))]
    pub fn run(&mut self) -> NodeOutcome {
        info!(dest = %self.sender.dest(), "🚦 传感器节点启动");
        loop {
            if let Step::Exit(reason) = self.step() {
                return NodeOutcome {
                    reason,
                    polls: self.polls,
                    stats: self.stats(),
                };
            }
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
    }
}
