//! 发送统计

use std::fmt;

/// 单个窗口的发送结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// 实际交给套接字的数据报数（含重传）
    pub sent: u64,
    /// 以 ACK 结束的序号数
    pub acked: u64,
    /// 首次之后的重传次数
    pub retransmitted: u64,
    /// 达到重试上限被放弃的序号数
    pub dropped: u64,
    /// 发送侧模拟丢包跳过的次数
    pub send_losses: u64,
    /// `send_to` 失败次数
    pub send_errors: u64,
}

/// 会话累计统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub windows: u64,
    pub sent: u64,
    pub acked: u64,
    pub retransmitted: u64,
    pub dropped: u64,
    pub send_losses: u64,
    pub send_errors: u64,
}

impl SenderStats {
    pub fn absorb(&mut self, w: &WindowStats) {
        self.windows += 1;
        self.sent += w.sent;
        self.acked += w.acked;
        self.retransmitted += w.retransmitted;
        self.dropped += w.dropped;
        self.send_losses += w.send_losses;
        self.send_errors += w.send_errors;
    }
}

impl fmt::Display for SenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "windows={} sent={} acked={} retransmitted={} dropped={} send_losses={} send_errors={}",
            self.windows,
            self.sent,
            self.acked,
            self.retransmitted,
            self.dropped,
            self.send_losses,
            self.send_errors
        )
    }
}
