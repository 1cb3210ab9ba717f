pub mod actuator;
pub mod builder;
pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod ids;
pub mod input;
pub mod logging;
pub mod model;
pub mod render;
pub mod tags;

pub type Result<T> = anyhow::Result<T>;
