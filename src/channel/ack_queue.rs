//! 延迟 ACK 队列
//!
//! 按截止时间排序的最小堆；同一截止时间按入队顺序出队。

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::net::SocketAddr;
use std::time::Instant;

/// 一个等待发出的 ACK
#[derive(Debug, Clone)]
pub struct PendingAck {
    pub at: Instant,
    pub seq: u64,
    pub to: SocketAddr,
    order: u64,
}

// BinaryHeap 是 max-heap；我们需要最早截止时间优先，因此反向比较。
impl Ord for PendingAck {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.order.cmp(&other.order),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for PendingAck {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PendingAck {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.order == other.order
    }
}

impl Eq for PendingAck {}

#[derive(Debug, Default)]
pub struct AckQueue {
    next_order: u64,
    q: BinaryHeap<PendingAck>,
}

impl AckQueue {
    pub fn schedule(&mut self, at: Instant, seq: u64, to: SocketAddr) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.q.push(PendingAck { at, seq, to, order });
    }

    /// 最早的截止时间
    pub fn next_deadline(&self) -> Option<Instant> {
        self.q.peek().map(|p| p.at)
    }

    /// 弹出一个截止时间不晚于 `now` 的 ACK
    pub fn pop_due(&mut self, now: Instant) -> Option<PendingAck> {
        if self.q.peek()?.at > now {
            return None;
        }
        self.q.pop()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
}
