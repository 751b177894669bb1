pub mod aggregate;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod filter;
pub mod locale;
pub mod models;
pub mod period;

pub use error::{AppError, Result};
