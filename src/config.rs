//! 配置
//!
//! 发送端、信道模拟器与控制器的可调参数。时间统一以 `*_ms` 整数存储，便于在 JSON 与命令行中书写。

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 数据信道默认端口
pub const DEFAULT_PORT: u16 = 5051;

/// ACK 延迟上限（毫秒）
pub const MAX_ACK_DELAY_MS: u64 = 60_000;

/// 可靠发送端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// 每个窗口的数据包个数（W）
    pub window_size: usize,
    /// 每轮发送后等待 ACK 的固定时长（毫秒）
    pub ack_timeout_ms: u64,
    /// 单个序号的最大发送次数，达到后放弃
    pub max_retries: u32,
    /// 发送侧模拟丢包概率
    pub send_loss: f64,
    /// ACK 监听线程的接收超时（毫秒）
    pub recv_timeout_ms: u64,
    /// 随机数种子；`None` 表示使用系统熵
    pub seed: Option<u64>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            ack_timeout_ms: 500,
            max_retries: 3,
            send_loss: 0.1,
            recv_timeout_ms: 100,
            seed: None,
        }
    }
}

impl SenderConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::Config("window_size must be at least 1".into()));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".into()));
        }
        // 发送侧丢包概率为 1 时窗口永远无法结束
        if !(0.0..1.0).contains(&self.send_loss) {
            return Err(Error::Config(format!(
                "send_loss must be in [0, 1), got {}",
                self.send_loss
            )));
        }
        Ok(())
    }
}

/// 不可靠信道模拟器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub host: String,
    pub port: u16,
    /// ACK 整体丢弃概率
    pub ack_loss: f64,
    /// ACK 延迟下界（毫秒）
    pub ack_delay_min_ms: u64,
    /// ACK 延迟上界（毫秒）
    pub ack_delay_max_ms: u64,
    /// 接收循环单次阻塞上限（毫秒）
    pub recv_timeout_ms: u64,
    pub buffer_size: usize,
    pub seed: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            ack_loss: 0.2,
            ack_delay_min_ms: 50,
            ack_delay_max_ms: 300,
            recv_timeout_ms: 1_000,
            buffer_size: 2048,
            seed: None,
        }
    }
}

impl ChannelConfig {
    pub fn ack_delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.ack_delay_min_ms),
            Duration::from_millis(self.ack_delay_max_ms),
        )
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ack_loss) {
            return Err(Error::Config(format!(
                "ack_loss must be in [0, 1], got {}",
                self.ack_loss
            )));
        }
        if self.ack_delay_min_ms > self.ack_delay_max_ms {
            return Err(Error::Config(format!(
                "ack delay range is empty: {}ms > {}ms",
                self.ack_delay_min_ms, self.ack_delay_max_ms
            )));
        }
        if self.ack_delay_max_ms > MAX_ACK_DELAY_MS {
            return Err(Error::Config(format!(
                "ack_delay_max_ms must be at most {MAX_ACK_DELAY_MS}, got {}",
                self.ack_delay_max_ms
            )));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer_size must be positive".into()));
        }
        Ok(())
    }
}

/// 自适应控制器配置（时间单位为 tick）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub junctions: usize,
    pub default_red: i64,
    pub default_yellow: u32,
    pub default_green: u32,
    pub minimum: u32,
    pub maximum: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            junctions: 4,
            default_red: 150,
            default_yellow: 5,
            default_green: 20,
            minimum: 10,
            maximum: 60,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.junctions == 0 {
            return Err(Error::Config("junctions must be at least 1".into()));
        }
        if self.default_yellow == 0 {
            return Err(Error::Config("default_yellow must be at least 1".into()));
        }
        if self.minimum == 0 || self.minimum > self.maximum {
            return Err(Error::Config(format!(
                "green bounds must satisfy 1 <= minimum <= maximum, got [{}, {}]",
                self.minimum, self.maximum
            )));
        }
        if !(self.minimum..=self.maximum).contains(&self.default_green) {
            return Err(Error::Config(format!(
                "default_green {} outside [{}, {}]",
                self.default_green, self.minimum, self.maximum
            )));
        }
        Ok(())
    }
}

/// 控制端进程的配置文件（JSON）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    pub channel: ChannelConfig,
    pub controller: ControllerConfig,
}

impl ControlPlaneConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: ControlPlaneConfig = serde_json::from_str(&raw)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.channel.validate()?;
        self.controller.validate()
    }
}
