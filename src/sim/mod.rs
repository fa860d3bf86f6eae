pub mod config;
pub mod log;
pub mod replay;
pub mod trace;
