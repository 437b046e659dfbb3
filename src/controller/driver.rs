//! tick 驱动
//!
//! 用有界循环逐步推进控制器状态机，每步之后回调观察者（渲染层的替身）。
//! 设置 `period` 时按固定节拍对齐 `Instant` 调度，不累积漂移；否则尽快执行（测试用）。

use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::fsm::{Controller, ControllerView, TickReport};

/// 控制时间（tick 数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn saturating_add(self, n: u64) -> Tick {
        Tick(self.0.saturating_add(n))
    }
}

/// 每个 tick 之后被调用
pub trait SignalObserver {
    fn on_tick(&mut self, _report: &TickReport, _view: &ControllerView) {}
}

/// 什么也不做的观察者
impl SignalObserver for () {}

#[derive(Debug, Clone)]
pub struct TickDriver {
    now: Tick,
    period: Option<Duration>,
    origin: Option<Instant>,
}

impl TickDriver {
    pub fn new(period: Option<Duration>) -> Self {
        Self {
            now: Tick::ZERO,
            period,
            origin: None,
        }
    }

    /// 不休眠的驱动
    pub fn unpaced() -> Self {
        Self::new(None)
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// 执行一个 tick
    pub fn step(&mut self, controller: &mut Controller, observer: &mut dyn SignalObserver) -> TickReport {
        self.pace();
        let report = controller.tick();
        self.now = self.now.saturating_add(1);
        let view = controller.view();
        observer.on_tick(&report, &view);
        report
    }

    /// 运行到 `until`（含）
    #[tracing::instrument(skip(self, controller, observer), fields(from = self.now.0))]
    pub fn run_until(&mut self, until: Tick, controller: &mut Controller, observer: &mut dyn SignalObserver) {
        debug!(until = until.0, "开始推进");
        while self.now < until {
            self.step(controller, observer);
        }
        info!(now = self.now.0, active = controller.active(), "✅ 推进完成");
    }

    /// 一直运行，由进程退出结束
    pub fn run(&mut self, controller: &mut Controller, observer: &mut dyn SignalObserver) {
        info!(period = ?self.period, "▶️  控制循环启动");
        loop {
            self.step(controller, observer);
        }
    }

    /// 第 k 个 tick 在 `origin + k * period` 执行
    fn pace(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let origin = *self.origin.get_or_insert_with(Instant::now);
        let k = u32::try_from(self.now.0).unwrap_or(u32::MAX);
        let due = origin + period.saturating_mul(k);
        let now = Instant::now();
        if due > now {
            thread::sleep(due - now);
        }
    }
}
