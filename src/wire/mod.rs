//! 线上格式模块
//!
//! 每个 UDP 数据报承载一个 JSON 对象：数据包 `{"seq", "junction_id", "vehicles_detected", "timestamp"}`
//! 或 ACK `{"ack"}`。

mod datagram;
mod packet;

pub use datagram::{Datagram, SensorReading};
pub use packet::{AckPacket, DataPacket, unix_timestamp};
