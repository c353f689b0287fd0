// inferbench-sweep - Library root for testing

pub mod chart;
pub mod config;
pub mod error;
pub mod sweep;
