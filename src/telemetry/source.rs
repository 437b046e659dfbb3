//! 遥测数据源
//!
//! 数据源返回 `{"running": bool, "counts": {方向: 车辆数}}`。
//! HTTP 轮询不在本 crate 内，这里提供脚本化与合成两种实现。

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 路口 1..=4 对应的车道方向
pub const DIRECTIONS: [&str; 4] = ["right", "down", "left", "up"];

/// 路口编号到方向名；超出 1..=4 时返回 `None`
pub fn direction_for(junction_id: u32) -> Option<&'static str> {
    let idx = usize::try_from(junction_id).ok()?.checked_sub(1)?;
    DIRECTIONS.get(idx).copied()
}

fn default_running() -> bool {
    true
}

/// 一次轮询的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsReport {
    #[serde(default = "default_running")]
    pub running: bool,
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

impl CountsReport {
    pub fn running(counts: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self {
            running: true,
            counts: counts.into_iter().collect(),
        }
    }

    pub fn stopped() -> Self {
        Self {
            running: false,
            counts: BTreeMap::new(),
        }
    }

    /// 拉取失败时使用的全零读数
    pub fn zeros() -> Self {
        Self::running(DIRECTIONS.iter().map(|d| (d.to_string(), 0)))
    }

    /// 所有方向均为零（没有任何方向也算）
    pub fn all_zero(&self) -> bool {
        self.counts.values().all(|&v| v == 0)
    }

    pub fn count_for(&self, direction: &str) -> u64 {
        self.counts.get(direction).copied().unwrap_or(0)
    }
}

pub trait TelemetrySource {
    fn poll(&mut self) -> Result<CountsReport>;
}

impl<T: TelemetrySource + ?Sized> TelemetrySource for Box<T> {
    fn poll(&mut self) -> Result<CountsReport> {
        (**self).poll()
    }
}

/// 按顺序回放预先写好的读数；耗尽后报告上游已停止
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    reports: VecDeque<CountsReport>,
}

impl ScriptedSource {
    pub fn new(reports: impl IntoIterator<Item = CountsReport>) -> Self {
        Self {
            reports: reports.into_iter().collect(),
        }
    }

    /// 从 JSON 数组文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let reports: Vec<CountsReport> = serde_json::from_str(&raw).map_err(|e| {
            Error::Telemetry(format!("failed to parse {}: {e}", path.display()))
        })?;
        Ok(Self::new(reports))
    }

    pub fn remaining(&self) -> usize {
        self.reports.len()
    }
}

impl TelemetrySource for ScriptedSource {
    fn poll(&mut self) -> Result<CountsReport> {
        Ok(self.reports.pop_front().unwrap_or_else(CountsReport::stopped))
    }
}

/// 各方向排队长度的随机游走，代替仿真中的车辆生成器
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: StdRng,
    queues: [u64; 4],
    max_queue: u64,
}

impl SyntheticSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            queues: [0; 4],
            max_queue: 80,
        }
    }
}

impl TelemetrySource for SyntheticSource {
    fn poll(&mut self) -> Result<CountsReport> {
        for q in self.queues.iter_mut() {
            let arrived = self.rng.gen_range(0..=4u64);
            let crossed = self.rng.gen_range(0..=3u64);
            *q = q.saturating_add(arrived).saturating_sub(crossed).min(self.max_queue);
        }
        // 保证至少有一个方向有车，否则会被当成“上游已关闭”
        if self.queues.iter().all(|&q| q == 0) {
            let idx = self.rng.gen_range(0..self.queues.len());
            self.queues[idx] = 1;
        }
        Ok(CountsReport::running(
            DIRECTIONS
                .iter()
                .zip(self.queues)
                .map(|(d, q)| (d.to_string(), q)),
        ))
    }
}
