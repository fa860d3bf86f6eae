pub mod behavior;
pub mod module;
