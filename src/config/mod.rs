mod config_loader;
pub use self::config_loader::ConfigLoader;
pub mod khaload_config;
pub use self::khaload_config::{DocumentStoreConfig, GraphStoreConfig, KhaloadConfig};
