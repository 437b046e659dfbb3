//! 接收循环与 ACK 调度线程
//!
//! 接收循环只在不可恢复的套接字错误时退出，之后信道永久下线，不会自动重启。
//! 解码失败、回调出错（包括 panic）都只记录日志，循环继续。

use std::net::{SocketAddr, UdpSocket};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, trace, warn};

use super::ack_queue::AckQueue;
use super::bind::bind_with_fallback;
use super::stats::{ChannelCounters, ChannelStats};
use crate::config::ChannelConfig;
use crate::error::{Error, Result, is_timeout_io, is_transient_io};
use crate::wire::{AckPacket, Datagram};

/// 运行中的信道
pub struct ChannelHandle {
    local_addr: SocketAddr,
    counters: Arc<ChannelCounters>,
    receiver: JoinHandle<Result<()>>,
}

impl ChannelHandle {
    /// 实际绑定的地址（可能是备用端口）
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> ChannelStats {
        self.counters.snapshot()
    }

    /// 接收循环是否已经下线
    pub fn is_finished(&self) -> bool {
        self.receiver.is_finished()
    }

    /// 等待接收循环结束并取回其终止原因
    pub fn join(self) -> Result<()> {
        match self.receiver.join() {
            Ok(res) => res,
            Err(_) => Err(Error::Io(std::io::Error::other("udp listener thread panicked"))),
        }
    }
}

/// 请求调度线程在 `at` 时刻发出 ACK
struct AckRequest {
    at: Instant,
    seq: u64,
    to: SocketAddr,
}

/// ACK 的丢弃/延迟策略
struct LossyAcks {
    rng: StdRng,
    loss: f64,
    delay_min: Duration,
    delay_max: Duration,
}

impl LossyAcks {
    fn new(cfg: &ChannelConfig) -> Self {
        let (delay_min, delay_max) = cfg.ack_delay_range();
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            loss: cfg.ack_loss,
            delay_min,
            delay_max,
        }
    }

    /// `None` 表示丢弃该 ACK，否则返回延迟
    fn decide(&mut self) -> Option<Duration> {
        if self.rng.gen_bool(self.loss) {
            return None;
        }
        Some(self.rng.gen_range(self.delay_min..=self.delay_max))
    }
}

/// 绑定端口并启动接收循环，每个解码成功的数据报都会交给 `on_data`
pub fn listen<F>(cfg: &ChannelConfig, on_data: F) -> Result<ChannelHandle>
where
    F: FnMut(&Datagram) -> Result<()> + Send + 'static,
{
    cfg.validate()?;
    let socket = bind_with_fallback(&cfg.host, cfg.port)?;
    socket.set_read_timeout(Some(cfg.recv_timeout()))?;
    let local_addr = socket.local_addr()?;
    info!(%local_addr, ack_loss = cfg.ack_loss, "🔊 UDP 信道模拟器已启动");

    let counters = Arc::new(ChannelCounters::default());
    let (ack_tx, ack_rx) = mpsc::channel();

    {
        let socket = socket.try_clone()?;
        let counters = Arc::clone(&counters);
        thread::Builder::new()
            .name("ack-scheduler".to_string())
            .spawn(move || run_ack_scheduler(socket, ack_rx, counters))?;
    }

    let acks = LossyAcks::new(cfg);
    let buffer_size = cfg.buffer_size;
    let receiver = {
        let counters = Arc::clone(&counters);
        thread::Builder::new()
            .name("udp-listener".to_string())
            .spawn(move || receive_loop(socket, buffer_size, on_data, acks, ack_tx, counters))?
    };

    Ok(ChannelHandle {
        local_addr,
        counters,
        receiver,
    })
}

fn receive_loop<F>(
    socket: UdpSocket,
    buffer_size: usize,
    mut on_data: F,
    mut acks: LossyAcks,
    ack_tx: Sender<AckRequest>,
    counters: Arc<ChannelCounters>,
) -> Result<()>
where
    F: FnMut(&Datagram) -> Result<()>,
{
    let mut buf = vec![0u8; buffer_size];
    loop {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(res) => res,
            Err(e) if is_timeout_io(&e) => continue,
            Err(e) if is_transient_io(&e) => {
                warn!(error = %e, "UDP 接收出现可恢复错误");
                continue;
            }
            Err(e) => {
                error!(error = %e, "❌ UDP 监听出错，信道下线");
                return Err(e.into());
            }
        };
        ChannelCounters::bump(&counters.received);

        let datagram = match Datagram::decode(&buf[..len]) {
            Ok(d) => d,
            Err(e) => {
                ChannelCounters::bump(&counters.decode_errors);
                warn!(%from, error = %e, "⚠️  收到非 JSON 或无法解码的数据报");
                continue;
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| on_data(&datagram))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                ChannelCounters::bump(&counters.callback_errors);
                warn!(%from, error = %e, "⚠️  数据回调返回错误");
            }
            Err(_) => {
                ChannelCounters::bump(&counters.callback_errors);
                warn!(%from, "⚠️  数据回调 panic，已隔离");
            }
        }

        let Some(seq) = datagram.seq() else {
            continue;
        };
        match acks.decide() {
            None => {
                ChannelCounters::bump(&counters.acks_dropped);
                debug!(seq, %from, "模拟 ACK 丢失");
            }
            Some(delay) => {
                let Some(at) = Instant::now().checked_add(delay) else {
                    ChannelCounters::bump(&counters.acks_dropped);
                    warn!(seq, delay_ms = delay.as_millis() as u64, "ACK 延迟超出时钟范围，丢弃");
                    continue;
                };
                let req = AckRequest {
                    at,
                    seq,
                    to: from,
                };
                if ack_tx.send(req).is_err() {
                    warn!(seq, "ACK 调度线程已退出，无法回复");
                    continue;
                }
                ChannelCounters::bump(&counters.acks_scheduled);
                trace!(seq, %from, delay_ms = delay.as_millis() as u64, "ACK 已调度");
            }
        }
    }
}

/// 单线程轮询延迟队列：到期即发；接收端关闭后把剩余 ACK 发完再退出
fn run_ack_scheduler(socket: UdpSocket, rx: Receiver<AckRequest>, counters: Arc<ChannelCounters>) {
    let mut queue = AckQueue::default();
    let mut open = true;
    loop {
        let now = Instant::now();
        while let Some(p) = queue.pop_due(now) {
            send_ack(&socket, p.seq, p.to, &counters);
        }

        let wait = queue
            .next_deadline()
            .map(|d| d.saturating_duration_since(Instant::now()));

        if !open {
            match wait {
                Some(w) => thread::sleep(w),
                None => break,
            }
            continue;
        }

        let next = match wait {
            Some(w) => rx.recv_timeout(w),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match next {
            Ok(req) => queue.schedule(req.at, req.seq, req.to),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => open = false,
        }
    }
    debug!("ACK 调度线程退出");
}

fn send_ack(socket: &UdpSocket, seq: u64, to: SocketAddr, counters: &ChannelCounters) {
    let bytes = match (AckPacket { ack: seq }).encode() {
        Ok(b) => b,
        Err(e) => {
            warn!(seq, error = %e, "ACK 编码失败");
            return;
        }
    };
    match socket.send_to(&bytes, to) {
        Ok(_) => {
            ChannelCounters::bump(&counters.acks_sent);
            trace!(seq, %to, "ACK 已发送");
        }
        Err(e) => warn!(seq, %to, error = %e, "ACK 发送失败"),
    }
}
