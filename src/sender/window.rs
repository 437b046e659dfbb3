//! 发送窗口状态
//!
//! 只管理状态，不做任何 I/O：
//! - 窗口覆盖 `[start, end)`，`base` 为最早未解决序号，单调不减
//! - 序号“已解决” = 已确认 或 已放弃
//! - `base` 只越过从自身开始连续已解决的序号

use super::ack_set::AckSet;

/// 序号的最终结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Acked,
    GaveUp,
}

#[derive(Debug, Clone)]
pub struct Window {
    start: u64,
    end: u64,
    base: u64,
    attempts: Vec<u32>,
    resolved: Vec<Option<Resolution>>,
}

impl Window {
    pub fn new(start: u64, size: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(size as u64),
            base: start,
            attempts: vec![0; size],
            resolved: vec![None; size],
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn is_done(&self) -> bool {
        self.base >= self.end
    }

    fn slot(&self, seq: u64) -> Option<usize> {
        if seq < self.start || seq >= self.end {
            return None;
        }
        Some((seq - self.start) as usize)
    }

    /// `[base, end)` 内尚未解决的序号（base 之后的才可能重传）
    pub fn unresolved(&self) -> impl Iterator<Item = u64> + '_ {
        (self.base..self.end).filter(|&seq| self.resolution(seq).is_none())
    }

    pub fn resolution(&self, seq: u64) -> Option<Resolution> {
        self.slot(seq).and_then(|i| self.resolved[i])
    }

    pub fn attempts(&self, seq: u64) -> u32 {
        self.slot(seq).map(|i| self.attempts[i]).unwrap_or(0)
    }

    /// 记录一次发送尝试，返回此前的尝试次数
    pub fn record_attempt(&mut self, seq: u64) -> u32 {
        let Some(i) = self.slot(seq) else {
            return 0;
        };
        let prev = self.attempts[i];
        self.attempts[i] = prev.saturating_add(1);
        prev
    }

    /// 把 ACK 集合中属于本窗口且尚未解决的序号标记为已确认
    pub fn absorb_acks(&mut self, acks: &AckSet) -> usize {
        let mut newly = 0;
        for seq in acks.acked_in(self.base..self.end) {
            if let Some(i) = self.slot(seq) {
                if self.resolved[i].is_none() {
                    self.resolved[i] = Some(Resolution::Acked);
                    newly += 1;
                }
            }
        }
        newly
    }

    /// 放弃所有尝试次数已达上限且仍未解决的序号
    pub fn give_up_exhausted(&mut self, max_retries: u32) -> Vec<u64> {
        let mut given_up = Vec::new();
        for seq in self.base..self.end {
            let i = (seq - self.start) as usize;
            if self.resolved[i].is_none() && self.attempts[i] >= max_retries {
                self.resolved[i] = Some(Resolution::GaveUp);
                given_up.push(seq);
            }
        }
        given_up
    }

    /// 越过从 base 开始连续已解决的序号，返回新的 base
    pub fn advance_base(&mut self) -> u64 {
        while self.base < self.end && self.resolution(self.base).is_some() {
            self.base += 1;
        }
        self.base
    }

    pub fn count(&self, r: Resolution) -> u64 {
        self.resolved.iter().filter(|x| **x == Some(r)).count() as u64
    }
}
