// Library exports for the dance-mimic CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
