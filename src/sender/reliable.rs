//! 滑动窗口可靠发送端
//!
//! 每个窗口发送 W 个连续序号的数据包，它们携带同一份读数快照（突发语义）。
//! 每轮：逐个发送未解决序号 → 固定休眠 `ack_timeout` → 吸收 ACK → 推进 base → 放弃超限序号。

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use super::ack_listener::AckListener;
use super::ack_set::AckSet;
use super::stats::{SenderStats, WindowStats};
use super::window::{Resolution, Window};
use crate::config::SenderConfig;
use crate::error::{Error, Result};
use crate::wire::{DataPacket, unix_timestamp};

pub struct ReliableSender {
    socket: UdpSocket,
    dest: SocketAddr,
    cfg: SenderConfig,
    acks: AckSet,
    next_seq: u64,
    rng: StdRng,
    stats: SenderStats,
}

impl ReliableSender {
    /// 绑定一个临时端口并指向 `dest`
    pub fn connect(dest: impl ToSocketAddrs, cfg: SenderConfig) -> Result<Self> {
        let dest = dest
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::Config("destination resolved to no address".into()))?;
        let local: SocketAddr = if dest.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        Self::with_socket(socket, dest, cfg)
    }

    /// 使用已绑定的套接字；同时在其克隆上启动 ACK 监听线程
    pub fn with_socket(socket: UdpSocket, dest: SocketAddr, cfg: SenderConfig) -> Result<Self> {
        cfg.validate()?;
        let acks = AckSet::new();
        AckListener::spawn(socket.try_clone()?, &acks, cfg.recv_timeout())?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            socket,
            dest,
            cfg,
            acks,
            next_seq: 0,
            rng,
            stats: SenderStats::default(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn dest(&self) -> SocketAddr {
        self.dest
    }

    pub fn config(&self) -> &SenderConfig {
        &self.cfg
    }

    /// 下一个窗口的起始序号
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn ack_set(&self) -> &AckSet {
        &self.acks
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    /// 发送一个完整窗口，直到每个序号都被确认或放弃
    #[tracing::instrument(skip(self), fields(dest = %self.dest, base = self.next_seq))]
    pub fn send_window(&mut self, junction_id: u32, reading: u64) -> WindowStats {
        let size = self.cfg.window_size;
        let start = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(size as u64);

        let timestamp = unix_timestamp();
        let mut window = Window::new(start, size);
        let mut ws = WindowStats::default();

        while !window.is_done() {
            let pending: Vec<u64> = window.unresolved().collect();
            for seq in pending {
                if self.rng.gen_bool(self.cfg.send_loss) {
                    ws.send_losses += 1;
                    trace!(seq, "模拟发送侧丢包");
                    continue;
                }

                let prev = window.record_attempt(seq);
                let pkt = DataPacket {
                    seq,
                    junction_id,
                    vehicles_detected: reading,
                    timestamp,
                };
                match self.transmit(&pkt) {
                    Ok(()) => {
                        ws.sent += 1;
                        if prev > 0 {
                            ws.retransmitted += 1;
                        }
                    }
                    Err(e) => {
                        ws.send_errors += 1;
                        warn!(seq, error = %e, "发送失败，继续本轮其余数据包");
                    }
                }
            }

            thread::sleep(self.cfg.ack_timeout());

            window.absorb_acks(&self.acks);
            window.advance_base();
            for seq in window.give_up_exhausted(self.cfg.max_retries) {
                debug!(seq, attempts = window.attempts(seq), "达到重试上限，放弃该序号");
            }
            window.advance_base();
        }

        ws.acked = window.count(Resolution::Acked);
        ws.dropped = window.count(Resolution::GaveUp);
        self.stats.absorb(&ws);

        info!(
            junction_id,
            reading,
            sent = ws.sent,
            acked = ws.acked,
            retransmitted = ws.retransmitted,
            dropped = ws.dropped,
            "📦 窗口发送完成"
        );
        ws
    }

    fn transmit(&self, pkt: &DataPacket) -> Result<()> {
        let bytes = pkt.encode()?;
        self.socket.send_to(&bytes, self.dest)?;
        Ok(())
    }
}
