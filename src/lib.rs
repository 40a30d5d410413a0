//! hcping - Healthchecks ping 客户端
//!
//! 通过简单的 HTTP ping 上报周期性任务的存活状态：
//! - 开始 / 成功 / 失败 / 带退出码失败 四类信号
//! - 传输层失败时按 1s、2s、4s…… 指数退避重试
//! - 按响应体精确匹配分类服务器结果
//! - TOML 配置文件与环境变量覆盖
//!
//! ```no_run
//! # async fn run() -> Result<(), hcping::PingError> {
//! let check = hcping::Check::new("5f1a0b52-3e2c-4b8a-9d7e-0c1f2a3b4c5d", None)?;
//! check.start().await?;
//! // ... 执行任务 ...
//! check.success().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod ping;

// 重新导出主要类型
pub use config::{default_options, resolve, Config, Options};
pub use error::{ConfigError, HcPingError, PingError};
pub use ping::{Check, PingOutcome, PingTransport, ReqwestTransport, Signal};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
