//! 已确认序号集合
//!
//! 一写（ACK 监听线程）一读（发送循环）。成员只增不减。
//!
//! 这里只记录真正收到 ACK 的序号。放弃的序号记在 [`Window`](super::Window) 的结局里，
//! 发送循环以“在本集合中 或 窗口标记为放弃”作为“已解决”的判定，两者合起来即完整的已解决集合。

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug, Clone, Default)]
pub struct AckSet {
    inner: Arc<Mutex<BTreeSet<u64>>>,
}

impl AckSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<u64>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 记录一个 ACK；返回该序号此前是否未出现过
    pub fn insert(&self, seq: u64) -> bool {
        self.lock().insert(seq)
    }

    pub fn contains(&self, seq: u64) -> bool {
        self.lock().contains(&seq)
    }

    /// 取出 `range` 内全部已确认序号（一次加锁）
    pub fn acked_in(&self, range: Range<u64>) -> Vec<u64> {
        self.lock().range(range).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn downgrade(&self) -> WeakAckSet {
        WeakAckSet(Arc::downgrade(&self.inner))
    }
}

/// 监听线程持有的弱引用：发送端释放后线程自行退出
#[derive(Debug, Clone)]
pub(crate) struct WeakAckSet(Weak<Mutex<BTreeSet<u64>>>);

impl WeakAckSet {
    pub(crate) fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub(crate) fn upgrade(&self) -> Option<AckSet> {
        self.0.upgrade().map(|inner| AckSet { inner })
    }
}
