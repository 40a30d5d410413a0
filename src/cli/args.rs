//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::Options;
use crate::logging::LogConfig;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// hcping - Healthchecks ping 客户端
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hcping",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "HCPING_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别，未指定时使用配置文件中的值
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "HCPING_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 是否启用详细输出
    #[arg(short, long, help = "启用详细输出")]
    pub verbose: bool,

    /// 模块日志级别，如 `hcping::ping=debug`，可重复指定
    #[arg(
        long = "log-module",
        value_name = "TARGET=LEVEL",
        value_parser = parse_module_level,
        value_delimiter = ',',
        help = "模块日志级别（TARGET=LEVEL），可重复指定",
        env = "HCPING_LOG_MODULE"
    )]
    pub log_modules: Vec<(String, LevelFilter)>,

    /// 以JSON格式输出日志
    #[arg(long, help = "以JSON格式输出日志")]
    pub log_json: bool,

    /// 检查ID
    #[arg(
        short = 'i',
        long,
        value_name = "UUID",
        help = "检查ID",
        env = "HCPING_CHECK_ID"
    )]
    pub check_id: Option<String>,

    /// ping API 地址
    #[arg(long, value_name = "URL", help = "ping API 地址", env = "HCPING_BASE_URL")]
    pub base_url: Option<String>,

    /// 最大尝试次数（0 表示使用默认值）
    #[arg(
        long,
        value_name = "COUNT",
        help = "最大尝试次数",
        env = "HCPING_MAX_RETRIES"
    )]
    pub max_retries: Option<u8>,

    /// User-Agent
    #[arg(
        long,
        value_name = "STRING",
        help = "请求使用的 User-Agent",
        env = "HCPING_USER_AGENT"
    )]
    pub user_agent: Option<String>,

    /// 单次退避等待上限（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        help = "单次退避等待上限（秒）",
        env = "HCPING_MAX_BACKOFF"
    )]
    pub max_backoff: Option<u64>,

    /// 单次请求超时（秒）
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        help = "单次请求超时（秒）",
        env = "HCPING_TIMEOUT"
    )]
    pub timeout: Option<u64>,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 通知任务开始执行
    Start,

    /// 通知任务成功结束
    Success,

    /// 通知任务仍然存活（与 success 相同）
    Ping,

    /// 通知任务失败
    Fail,

    /// 通知任务以指定退出码结束
    FailCode {
        /// 退出码（0-255）
        #[arg(value_name = "CODE", help = "退出码（0-255）")]
        code: u8,
    },

    /// 执行命令并根据退出码上报结果
    Exec {
        /// 不发送开始信号
        #[arg(long, help = "不发送开始信号")]
        no_start: bool,

        /// 要执行的命令及其参数
        #[arg(
            value_name = "COMMAND",
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<String>,
    },

    /// 显示合并后的配置
    ShowConfig {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

/// 解析 `TARGET=LEVEL` 形式的模块日志级别
fn parse_module_level(value: &str) -> Result<(String, LevelFilter), String> {
    let (target, level) = value
        .split_once('=')
        .ok_or_else(|| format!("格式应为 TARGET=LEVEL: {}", value))?;
    let target = target.trim();
    if target.is_empty() {
        return Err(format!("模块名不能为空: {}", value));
    }
    let level = level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("无效的日志级别: {}", level))?;
    Ok((target.to_string(), level))
}

impl Args {
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// 命令行与环境变量中指定的选项，未指定的字段保持未设置
    pub fn option_overrides(&self) -> Options {
        Options {
            base_url: self.base_url.clone().unwrap_or_default(),
            max_retries: self.max_retries.unwrap_or(0),
            user_agent: self.user_agent.clone(),
            max_backoff_seconds: self.max_backoff,
            request_timeout_seconds: self.timeout,
        }
    }

    /// 是否启用详细输出
    pub fn is_verbose(&self) -> bool {
        self.verbose || matches!(self.log_level, Some(LogLevel::Debug))
    }

    /// 构建日志配置
    ///
    /// # 参数
    /// * `file_level` - 配置文件中的日志级别，命令行未指定时使用
    ///
    /// # 返回
    /// * `LogConfig` - 命令行 > 配置文件 > info
    pub fn log_config(&self, file_level: &str) -> LogConfig {
        let level = if self.is_verbose() {
            LevelFilter::Debug
        } else {
            match &self.log_level {
                Some(level) => level.clone().into(),
                None => file_level.parse().unwrap_or(LevelFilter::Info),
            }
        };

        LogConfig {
            level,
            json_format: self.log_json,
            module_levels: self.log_modules.iter().cloned().collect(),
        }
    }
}
