pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use errors::{PoseError, Result};
