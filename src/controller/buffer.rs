//! 传感器读数缓冲
//!
//! 网络线程写入、控制 tick 批量取走。同一路口在两次取走之间只保留最后一次读数。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::Result;
use crate::wire::Datagram;

#[derive(Debug, Default)]
pub struct SensorBuffer {
    pending: Mutex<HashMap<u32, u64>>,
}

impl SensorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, u64>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 覆盖该路口的待处理读数
    pub fn submit(&self, junction_id: u32, count: u64) {
        self.lock().insert(junction_id, count);
    }

    /// 原子地取走全部读数，按路口编号排序
    pub fn drain(&self) -> Vec<(u32, u64)> {
        let taken = std::mem::take(&mut *self.lock());
        let mut entries: Vec<(u32, u64)> = taken.into_iter().collect();
        entries.sort_unstable_by_key(|(jid, _)| *jid);
        entries
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// 交给网络回调的写入端
#[derive(Debug, Clone)]
pub struct SensorHandle {
    buffer: Arc<SensorBuffer>,
}

impl SensorHandle {
    pub(crate) fn new(buffer: Arc<SensorBuffer>) -> Self {
        Self { buffer }
    }

    pub fn submit(&self, junction_id: u32, count: u64) {
        self.buffer.submit(junction_id, count);
    }

    /// 校验数据报并写入缓冲；字段非法时返回错误，读数不会进入缓冲
    pub fn ingest(&self, datagram: &Datagram) -> Result<()> {
        let reading = datagram.to_reading().inspect_err(|e| {
            debug!(error = %e, "丢弃非法传感器报文");
        })?;
        trace!(
            junction = reading.junction_id,
            vehicles = reading.vehicles_detected,
            "收到传感器读数"
        );
        self.submit(reading.junction_id, reading.vehicles_detected);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
