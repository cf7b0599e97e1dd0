pub mod analyze;
pub mod chat;
pub mod config;
pub mod sample;
