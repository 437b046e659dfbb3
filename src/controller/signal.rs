//! 单个路口的信号状态

use serde::Serialize;

use crate::config::ControllerConfig;

/// 信号相位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Red,
    Yellow,
    Green,
}

/// 路口计时器
///
/// `configured_green` 是下一次放行使用的绿灯时长；`green` 是正在倒数的剩余绿灯。
/// 非活动路口两者相同，传感器覆盖会同时写入两者。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalState {
    /// 红灯倒数，可以为负（无下限）
    pub red: i64,
    pub yellow: u32,
    pub green: u32,
    pub configured_green: u32,
    pub minimum: u32,
    pub maximum: u32,
    /// 累计绿灯 tick 数
    pub total_green_time: u64,
}

impl SignalState {
    pub fn new(red: i64, cfg: &ControllerConfig) -> Self {
        Self {
            red,
            yellow: cfg.default_yellow,
            green: cfg.default_green,
            configured_green: cfg.default_green,
            minimum: cfg.minimum,
            maximum: cfg.maximum,
            total_green_time: 0,
        }
    }

    /// 一个周期结束后恢复默认计时（累计绿灯时间保留）
    pub(crate) fn reset_to_defaults(&mut self, cfg: &ControllerConfig) {
        self.red = cfg.default_red;
        self.yellow = cfg.default_yellow;
        self.green = cfg.default_green;
        self.configured_green = cfg.default_green;
    }

    /// 按车流量设置绿灯时长，返回新值
    pub(crate) fn apply_count(&mut self, count: u64) -> u32 {
        let green = green_for_count(count, self.minimum, self.maximum);
        self.configured_green = green;
        self.green = green;
        green
    }
}

/// 车流量到绿灯时长的线性映射：`minimum + count/60 * (maximum - minimum)`，四舍五入后夹到区间内
pub fn green_for_count(count: u64, minimum: u32, maximum: u32) -> u32 {
    let (lo, hi) = (minimum as f64, maximum as f64);
    let raw = (lo + (count as f64 / 60.0) * (hi - lo)).round();
    raw.clamp(lo, hi) as u32
}
