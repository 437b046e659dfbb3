//! 接收侧数据报
//!
//! 信道模拟器只保证“是一个 JSON 对象”，字段校验推迟到应用层摄取时进行：
//! 这样没有 `seq` 的普通传感器报文也能被投递，只是不会得到 ACK。

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// 解码后的 JSON 对象
#[derive(Debug, Clone, PartialEq)]
pub struct Datagram {
    fields: Map<String, Value>,
}

/// 通过校验的一条传感器读数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub junction_id: u32,
    pub vehicles_detected: u64,
}

impl Datagram {
    pub fn decode(bytes: &[u8]) -> Result<Datagram> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(fields) => Ok(Datagram { fields }),
            _ => Err(Error::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// 序号；缺失或不是非负整数时返回 `None`（即不回 ACK）
    pub fn seq(&self) -> Option<u64> {
        self.fields.get("seq").and_then(Value::as_u64)
    }

    fn uint_field(&self, field: &'static str) -> Result<u64> {
        self.fields
            .get(field)
            .and_then(Value::as_u64)
            .ok_or(Error::InvalidField { field })
    }

    /// 提取 `(junction_id, vehicles_detected)`，任一字段非法即拒绝
    pub fn to_reading(&self) -> Result<SensorReading> {
        let junction_id = u32::try_from(self.uint_field("junction_id")?)
            .map_err(|_| Error::InvalidField {
                field: "junction_id",
            })?;
        let vehicles_detected = self.uint_field("vehicles_detected")?;
        Ok(SensorReading {
            junction_id,
            vehicles_detected,
        })
    }
}
