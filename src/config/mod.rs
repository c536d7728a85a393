pub mod app_config;
pub mod database;

pub use app_config::{AppConfig, ConfigError, DataSourceKind, DEFAULT_MAX_DATA_ALLOWANCE_MB};
pub use database::establish_connection;
