//! 错误类型
//!
//! 整个 crate 共用一个错误枚举。除了端口绑定失败以外，其余错误都只在各自的循环内记录日志，不会跨组件传播。

use std::io;
use std::net::SocketAddr;

/// crate 级别的 Result 别名
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 首选端口与 `port + 1` 都绑定失败（启动期致命错误）
    #[error("failed to bind {addr} and fallback {fallback}: {source}")]
    Bind {
        addr: SocketAddr,
        fallback: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 数据报不是合法 JSON
    #[error("malformed datagram: {0}")]
    Decode(#[from] serde_json::Error),

    /// 数据报是 JSON，但顶层不是对象
    #[error("datagram is not a JSON object")]
    NotAnObject,

    /// 字段缺失、不是整数或为负数
    #[error("field `{field}` is missing or not a non-negative integer")]
    InvalidField { field: &'static str },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("telemetry source: {0}")]
    Telemetry(String),
}

/// 接收超时或可恢复的套接字错误：记录后继续循环
///
/// `ConnectionRefused`/`ConnectionReset` 来自先前 `send_to` 触发的 ICMP 端口不可达，
/// 对 UDP 套接字本身无害。
pub(crate) fn is_transient_io(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
    )
}

/// 仅超时（无数据到达）
pub(crate) fn is_timeout_io(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
