// Domain module - configuration values and errors
pub mod config;
pub mod error;
