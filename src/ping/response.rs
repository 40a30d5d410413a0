//! ping 响应分类
//!
//! 服务器通过响应体文本（而非状态码）表达结果，这里集中维护文本到结果的映射

use crate::error::PingError;

/// 成功
pub const RESPONSE_OK: &str = "OK";
/// 检查ID不存在
pub const RESPONSE_NOT_FOUND: &str = "OK (not found)";
/// 被限流
pub const RESPONSE_RATE_LIMITED: &str = "OK (rate limited)";

/// 响应体对应的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingOutcome {
    /// 服务器已接受
    Accepted,
    /// 检查ID不存在
    NotFound,
    /// 被限流
    RateLimited,
    /// 无法识别的响应体
    Unknown(String),
}

impl PingOutcome {
    /// 转换为 dispatch 的返回值
    pub fn into_result(self, check_id: &str) -> Result<(), PingError> {
        match self {
            PingOutcome::Accepted => Ok(()),
            PingOutcome::NotFound => Err(PingError::CheckNotFound {
                check_id: check_id.to_string(),
            }),
            PingOutcome::RateLimited => Err(PingError::RateLimited),
            PingOutcome::Unknown(body) => Err(PingError::UnknownServerResponse { body }),
        }
    }
}

/// 根据响应体分类（精确匹配，区分大小写）
pub fn classify(body: &str) -> PingOutcome {
    match body {
        RESPONSE_OK => PingOutcome::Accepted,
        RESPONSE_NOT_FOUND => PingOutcome::NotFound,
        RESPONSE_RATE_LIMITED => PingOutcome::RateLimited,
        other => PingOutcome::Unknown(other.to_string()),
    }
}
