//! ACK 监听线程
//!
//! 与发送循环共享同一个 UDP 套接字（`try_clone`）。尽力而为：格式错误或非 ACK 的数据报直接丢弃。

use std::io;
use std::net::UdpSocket;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use super::ack_set::{AckSet, WeakAckSet};
use crate::error::is_timeout_io;
use crate::wire::AckPacket;

const ACK_BUFFER_BYTES: usize = 512;

pub struct AckListener;

impl AckListener {
    /// 启动监听线程。`socket` 应为发送套接字的克隆。
    pub fn spawn(
        socket: UdpSocket,
        acks: &AckSet,
        recv_timeout: Duration,
    ) -> io::Result<JoinHandle<()>> {
        socket.set_read_timeout(Some(recv_timeout))?;
        let acks = acks.downgrade();
        thread::Builder::new()
            .name("ack-listener".to_string())
            .spawn(move || listen(socket, acks))
    }
}

fn listen(socket: UdpSocket, acks: WeakAckSet) {
    let mut buf = [0u8; ACK_BUFFER_BYTES];
    while acks.is_alive() {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(res) => res,
            Err(e) if is_timeout_io(&e) => continue,
            Err(e) => {
                debug!(error = %e, "ACK 接收出错，忽略");
                continue;
            }
        };

        let Ok(pkt) = AckPacket::decode(&buf[..len]) else {
            trace!(%from, len, "丢弃非 ACK 数据报");
            continue;
        };
        let Some(set) = acks.upgrade() else {
            break;
        };
        if set.insert(pkt.ack) {
            trace!(seq = pkt.ack, %from, "收到 ACK");
        }
    }
    debug!("发送端已释放，ACK 监听线程退出");
}
