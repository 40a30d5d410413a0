//! 配置管理模块
//!
//! 提供 ping 选项的默认值合并、配置文件解析和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_config_path, load_config, ConfigLoader, TomlConfigLoader};
pub use types::{
    default_options, resolve, validate_config, Config, Options, DEFAULT_BASE_URL,
    DEFAULT_MAX_RETRIES,
};
