pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod server;

pub use error::{Error, Result};
