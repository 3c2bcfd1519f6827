pub mod app_config;
pub mod error;
pub mod model;

pub use app_config::{load_config, setup_resolver};
pub use error::ConfigError;
pub use model::MonitorConfig;
