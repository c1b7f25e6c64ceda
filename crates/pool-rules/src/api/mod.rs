pub mod config;
pub mod observer;
pub mod types;
