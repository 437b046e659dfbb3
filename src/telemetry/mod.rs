//! 传感器节点侧遥测
//!
//! 数据源轮询 + 可靠发送，是控制端数据的来源。

mod node;
mod source;

pub use node::{ExitReason, MAX_ZERO_POLLS, NodeOutcome, SensorNode, Step};
pub use source::{
    CountsReport, DIRECTIONS, ScriptedSource, SyntheticSource, TelemetrySource, direction_for,
};
