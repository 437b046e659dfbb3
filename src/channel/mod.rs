//! 不可靠信道模拟器（接收侧）
//!
//! 绑定 UDP 端口、解码数据报、把载荷交给回调，并按概率丢弃或延迟 ACK 来模拟有损链路。
//! 延迟 ACK 由单个调度线程从最小堆中按截止时间发出，而不是每个 ACK 一个定时器。

mod ack_queue;
mod bind;
mod listener;
mod stats;

pub use ack_queue::{AckQueue, PendingAck};
pub use bind::bind_with_fallback;
pub use listener::{ChannelHandle, listen};
pub use stats::ChannelStats;
