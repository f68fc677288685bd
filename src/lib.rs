pub mod api_client;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod spec_file;
pub mod table_display;

pub use error::{ComparerError, Result};
