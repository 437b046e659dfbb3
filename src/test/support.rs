use crate::config::{ChannelConfig, SenderConfig};
use std::net::UdpSocket;
use std::time::{Duration, Instant};

/// 本地回环、临时端口、固定 ACK 延迟的信道
pub(super) fn loopback_channel(ack_loss: f64, ack_delay_ms: u64) -> ChannelConfig {
    ChannelConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ack_loss,
        ack_delay_min_ms: ack_delay_ms,
        ack_delay_max_ms: ack_delay_ms,
        recv_timeout_ms: 20,
        seed: Some(7),
        ..ChannelConfig::default()
    }
}

pub(super) fn lossless_sender(window_size: usize, ack_timeout_ms: u64, max_retries: u32) -> SenderConfig {
    SenderConfig {
        window_size,
        ack_timeout_ms,
        max_retries,
        send_loss: 0.0,
        recv_timeout_ms: 10,
        seed: Some(11),
    }
}

/// 占住端口 `p`，并确认 `p + 1` 当前空闲
pub(super) fn block_port_with_free_successor() -> (UdpSocket, u16) {
    for _ in 0..50 {
        let blocker = UdpSocket::bind("127.0.0.1:0").expect("bind blocker");
        let port = blocker.local_addr().expect("blocker addr").port();
        let Some(next) = port.checked_add(1) else {
            continue;
        };
        if UdpSocket::bind(("127.0.0.1", next)).is_ok() {
            return (blocker, port);
        }
    }
    panic!("could not find a port with a free successor");
}

/// 占住两个相邻端口 `p` 与 `p + 1`
pub(super) fn block_port_pair() -> (UdpSocket, UdpSocket, u16) {
    for _ in 0..50 {
        let first = UdpSocket::bind("127.0.0.1:0").expect("bind first");
        let port = first.local_addr().expect("first addr").port();
        let Some(next) = port.checked_add(1) else {
            continue;
        };
        if let Ok(second) = UdpSocket::bind(("127.0.0.1", next)) {
            return (first, second, port);
        }
    }
    panic!("could not find two adjacent free ports");
}

/// 轮询直到条件成立或超时
pub(super) fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
