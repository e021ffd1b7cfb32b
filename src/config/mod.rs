//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, LogFormat, LoggingConfig, ServerConfig, StoreBackend, StoreConfig,
};
