//! 自适应信号控制器
//!
//! 显式状态机：每次 `tick` 依次执行
//! 1. 原子地取走传感器缓冲
//! 2. 把读数映射为非活动路口的绿灯时长
//! 3. 倒数计时并处理相位切换
//!
//! 放行顺序严格轮转，传感器只影响绿灯时长。`SignalState` 只在 `tick`（`&mut self`）中被修改。

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::buffer::{SensorBuffer, SensorHandle};
use super::driver::Tick;
use super::signal::{Phase, SignalState};
use crate::config::ControllerConfig;
use crate::error::Result;

/// 一次被采纳的绿灯覆盖
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GreenOverride {
    /// 线上路口编号（从 1 开始）
    pub junction_id: u32,
    pub vehicles: u64,
    pub green: u32,
}

/// 单次 tick 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub applied: Vec<GreenOverride>,
    /// 越界或指向活动路口而被丢弃的路口编号
    pub discarded: Vec<u32>,
    /// 本 tick 由绿转黄的路口下标
    pub entered_yellow: Option<usize>,
    /// 本 tick 开始放行的路口下标
    pub activated: Option<usize>,
}

/// 供渲染层读取的路口快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JunctionView {
    pub junction_id: u32,
    pub phase: Phase,
    pub red: i64,
    pub yellow: u32,
    pub green: u32,
    pub configured_green: u32,
    pub total_green_time: u64,
    pub activations: u64,
    /// 信号牌上显示的文字
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerView {
    pub tick: Tick,
    pub active: usize,
    pub junctions: Vec<JunctionView>,
}

impl ControllerView {
    pub fn active_junction(&self) -> Option<&JunctionView> {
        self.junctions.get(self.active)
    }
}

pub struct Controller {
    cfg: ControllerConfig,
    signals: Vec<SignalState>,
    activations: Vec<u64>,
    active: usize,
    /// 活动路口的相位，只可能是 Green 或 Yellow
    active_phase: Phase,
    buffer: Arc<SensorBuffer>,
    elapsed: Tick,
}

impl Controller {
    /// 路口 0 先放行；其余路口的红灯倒数按轮转顺序错开
    pub fn new(cfg: ControllerConfig) -> Result<Self> {
        cfg.validate()?;
        let slot = i64::from(cfg.default_yellow) + i64::from(cfg.default_green);
        let signals: Vec<SignalState> = (0..cfg.junctions)
            .map(|i| SignalState::new(slot.saturating_mul(i as i64), &cfg))
            .collect();
        let mut activations = vec![0; cfg.junctions];
        activations[0] = 1;
        info!(junctions = cfg.junctions, green = cfg.default_green, "🚦 控制器初始化完成");
        Ok(Self {
            cfg,
            signals,
            activations,
            active: 0,
            active_phase: Phase::Green,
            buffer: Arc::new(SensorBuffer::new()),
            elapsed: Tick::ZERO,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.cfg
    }

    /// 网络侧写入端
    pub fn sensor_handle(&self) -> SensorHandle {
        SensorHandle::new(Arc::clone(&self.buffer))
    }

    pub fn junctions(&self) -> usize {
        self.signals.len()
    }

    /// 当前活动路口下标
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn elapsed(&self) -> Tick {
        self.elapsed
    }

    pub fn phase_of(&self, junction: usize) -> Option<Phase> {
        if junction >= self.signals.len() {
            return None;
        }
        Some(if junction == self.active {
            self.active_phase
        } else {
            Phase::Red
        })
    }

    pub fn signal(&self, junction: usize) -> Option<&SignalState> {
        self.signals.get(junction)
    }

    pub fn signals(&self) -> &[SignalState] {
        &self.signals
    }

    /// 每个路口被放行的次数
    pub fn activations(&self) -> &[u64] {
        &self.activations
    }

    /// 推进一个时间单位
    pub fn tick(&mut self) -> TickReport {
        self.elapsed = Tick(self.elapsed.0.saturating_add(1));
        let mut report = TickReport {
            tick: self.elapsed,
            ..TickReport::default()
        };

        for (junction_id, vehicles) in self.buffer.drain() {
            match self.override_target(junction_id) {
                Some(idx) => {
                    let green = self.signals[idx].apply_count(vehicles);
                    info!(junction_id, vehicles, green, "⚙️  更新路口绿灯时长");
                    report.applied.push(GreenOverride {
                        junction_id,
                        vehicles,
                        green,
                    });
                }
                None => {
                    debug!(junction_id, vehicles, active = self.active, "丢弃读数（越界或为当前放行路口）");
                    report.discarded.push(junction_id);
                }
            }
        }

        self.count_down();

        let current = &self.signals[self.active];
        let (green, yellow) = (current.green, current.yellow);
        match self.active_phase {
            Phase::Green if green == 0 => {
                self.active_phase = Phase::Yellow;
                report.entered_yellow = Some(self.active);
                info!(junction = self.active, "🟡 绿灯结束，进入黄灯");
            }
            Phase::Yellow if yellow == 0 => {
                report.activated = Some(self.finish_cycle());
            }
            _ => {}
        }
        report
    }

    /// 编号合法且不是当前放行路口时返回其下标
    fn override_target(&self, junction_id: u32) -> Option<usize> {
        let idx = (junction_id as usize).checked_sub(1)?;
        (idx < self.signals.len() && idx != self.active).then_some(idx)
    }

    fn count_down(&mut self) {
        for (i, s) in self.signals.iter_mut().enumerate() {
            if i != self.active {
                s.red -= 1;
                continue;
            }
            match self.active_phase {
                Phase::Green => {
                    s.green = s.green.saturating_sub(1);
                    s.total_green_time += 1;
                }
                Phase::Yellow => s.yellow = s.yellow.saturating_sub(1),
                Phase::Red => {}
            }
        }
    }

    /// 黄灯结束：复位当前路口，轮转到下一个路口
    fn finish_cycle(&mut self) -> usize {
        let finished = self.active;
        self.signals[finished].reset_to_defaults(&self.cfg);

        let n = self.signals.len();
        self.active = (finished + 1) % n;
        self.active_phase = Phase::Green;
        self.activations[self.active] += 1;

        let baseline = &self.signals[finished];
        let baseline_red = i64::from(baseline.yellow) + i64::from(baseline.green);
        self.signals[self.active].red = baseline_red;

        let upcoming = (self.active + 1) % n;
        let active = &self.signals[self.active];
        let estimate = i64::from(active.yellow) + i64::from(active.configured_green);
        self.signals[upcoming].red = estimate;

        info!(
            from = finished,
            to = self.active,
            green = self.signals[self.active].green,
            "🟢 切换放行路口"
        );
        self.active
    }

    /// 只读快照
    pub fn view(&self) -> ControllerView {
        let junctions = self
            .signals
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let phase = self.phase_of(i).unwrap_or(Phase::Red);
                JunctionView {
                    junction_id: (i + 1) as u32,
                    phase,
                    red: s.red,
                    yellow: s.yellow,
                    green: s.green,
                    configured_green: s.configured_green,
                    total_green_time: s.total_green_time,
                    activations: self.activations[i],
                    text: display_text(phase, s),
                }
            })
            .collect();
        ControllerView {
            tick: self.elapsed,
            active: self.active,
            junctions,
        }
    }
}

/// 信号牌文字：倒数归零时显示 STOP/SLOW/GO，红灯剩余超过 10 时显示 `---`
fn display_text(phase: Phase, s: &SignalState) -> String {
    match phase {
        Phase::Yellow if s.yellow == 0 => "STOP".to_string(),
        Phase::Yellow => s.yellow.to_string(),
        Phase::Green if s.green == 0 => "SLOW".to_string(),
        Phase::Green => s.green.to_string(),
        Phase::Red if s.red == 0 => "GO".to_string(),
        Phase::Red if s.red <= 10 => s.red.to_string(),
        Phase::Red => "---".to_string(),
    }
}
