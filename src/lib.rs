pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod sender;
pub mod telemetry;
pub mod wire;

pub use error::{Error, Result};

#[cfg(test)]
mod test;
