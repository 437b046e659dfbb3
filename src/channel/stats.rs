//! 信道统计

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 信道统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub received: u64,
    pub decode_errors: u64,
    pub callback_errors: u64,
    pub acks_scheduled: u64,
    pub acks_dropped: u64,
    pub acks_sent: u64,
}

impl fmt::Display for ChannelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} decode_errors={} callback_errors={} acks_scheduled={} acks_dropped={} acks_sent={}",
            self.received,
            self.decode_errors,
            self.callback_errors,
            self.acks_scheduled,
            self.acks_dropped,
            self.acks_sent
        )
    }
}

/// 接收线程与调度线程共享的计数器
#[derive(Debug, Default)]
pub(crate) struct ChannelCounters {
    pub(crate) received: AtomicU64,
    pub(crate) decode_errors: AtomicU64,
    pub(crate) callback_errors: AtomicU64,
    pub(crate) acks_scheduled: AtomicU64,
    pub(crate) acks_dropped: AtomicU64,
    pub(crate) acks_sent: AtomicU64,
}

impl ChannelCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ChannelStats {
        ChannelStats {
            received: self.received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            callback_errors: self.callback_errors.load(Ordering::Relaxed),
            acks_scheduled: self.acks_scheduled.load(Ordering::Relaxed),
            acks_dropped: self.acks_dropped.load(Ordering::Relaxed),
            acks_sent: self.acks_sent.load(Ordering::Relaxed),
        }
    }
}
