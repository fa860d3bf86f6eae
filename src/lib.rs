pub mod base;
pub mod cache;
pub mod coherence;
pub mod core_model;
pub mod sim;
pub mod ui;
