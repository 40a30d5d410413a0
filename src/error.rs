//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// 传输层错误的统一装箱类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// hcping 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum HcPingError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// Ping 相关错误
    #[error("Ping错误: {0}")]
    Ping(#[from] PingError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// Ping 错误类型
///
/// 一次 dispatch 要么成功，要么恰好返回其中一个错误。
#[derive(Error, Debug)]
pub enum PingError {
    /// 所有尝试都未能获得任何响应
    #[error("{attempts} 次请求均未获得响应")]
    TransportExhausted {
        attempts: u8,
        #[source]
        source: BoxError,
    },

    /// 服务器无法识别该检查ID
    #[error("服务器找不到ID为 {check_id:?} 的检查")]
    CheckNotFound { check_id: String },

    /// 服务器限流（一分钟内 5 次及以上的 ping）
    #[error("服务器提示该检查 ping 过于频繁（一分钟内 5 次以上）")]
    RateLimited,

    /// 无法识别的响应内容
    #[error("服务器返回未知响应: {body}")]
    UnknownServerResponse { body: String },

    /// 读取响应体失败
    #[error("读取响应体失败")]
    ResponseRead(#[source] BoxError),

    /// URL 无法被传输层接受
    #[error("无效的 ping URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP 客户端创建失败
    #[error("HTTP客户端创建失败: {0}")]
    Client(#[from] reqwest::Error),
}

impl PingError {
    /// 判断错误是否来自服务器的明确答复（而非网络层）
    pub fn is_server_response(&self) -> bool {
        matches!(
            self,
            PingError::CheckNotFound { .. }
                | PingError::RateLimited
                | PingError::UnknownServerResponse { .. }
        )
    }
}

/// 将错误及其 source 链拼成一行，已出现在上层消息中的原因不再重复
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, HcPingError>;
