//! 自适应信号控制模块
//!
//! - `buffer`：网络线程与控制 tick 之间唯一的共享状态
//! - `signal`：单路口计时器与绿灯映射
//! - `fsm`：轮转放行的状态机
//! - `driver`：有界 tick 循环与观察者钩子

mod buffer;
mod driver;
mod fsm;
mod signal;

pub use buffer::{SensorBuffer, SensorHandle};
pub use fsm::{Controller, ControllerView, GreenOverride, JunctionView, TickReport};
pub use driver::{SignalObserver, Tick, TickDriver};
pub use signal::{Phase, SignalState, green_for_count};
