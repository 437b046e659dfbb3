//! 数据包与 ACK 包
//!
//! 发送端使用的强类型报文。

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 传感器数据包
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPacket {
    pub seq: u64,
    pub junction_id: u32,
    pub vehicles_detected: u64,
    /// 采样时间（UNIX 秒）
    pub timestamp: f64,
}

impl DataPacket {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// 确认包
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckPacket {
    pub ack: u64,
}

impl AckPacket {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 解析 ACK；数据包或其他 JSON 对象同样视为解析失败
    pub fn decode(bytes: &[u8]) -> Result<AckPacket> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// 当前时间（UNIX 秒，浮点）
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
