//! Configuration primitives for the page manager.
//! 頁面管理器的設定模組。

pub mod config;

pub use config::{
    CategorySeed, ConfigError, PageManagerConfig, PageSeed, RenderOptions, DEFAULT_STYLE_PREFIX,
};
