pub mod commands;
pub mod config;
pub mod fixtures;
pub mod memory;
pub mod telemetry;
