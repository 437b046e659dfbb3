//! 传感器侧可靠发送模块
//!
//! 在有损 UDP 之上实现滑动窗口：序号、ACK、超时重传与重试上限。
//! ACK 由独立线程在同一套接字上接收，写入共享的 [`AckSet`]。

mod ack_listener;
mod ack_set;
mod reliable;
mod stats;
mod window;

pub use ack_listener::AckListener;
pub use ack_set::AckSet;
pub use reliable::ReliableSender;
pub use stats::{SenderStats, WindowStats};
pub use window::{Resolution, Window};
