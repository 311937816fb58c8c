#[macro_use]
extern crate anyhow;

pub mod client;
pub mod commands;
pub mod config;
pub mod http_client;
pub mod logging;
pub mod output;

pub use client::{ApiClient, ApiError, ClientError};
pub use config::{Config, ConfigError, ConfigOverrides};
pub use output::OutputFormat;

pub type Result<T> = anyhow::Result<T>;
