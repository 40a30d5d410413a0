//! ping 分发器
//!
//! 负责发送单个 ping：传输层失败时按指数退避重试，拿到响应后按响应体分类结果

use crate::config::Options;
use crate::error::{BoxError, PingError};
use crate::ping::response::classify;
use crate::ping::transport::{PingRequest, PingTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 计算第 `failed_attempts` 次失败之后的退避时间
///
/// 1s、2s、4s……依次翻倍，不加抖动；`cap` 为单次等待的上限。
/// `failed_attempts` 为 0 时不等待。
pub fn backoff_delay(failed_attempts: u32, cap: Option<Duration>) -> Duration {
    if failed_attempts == 0 {
        return Duration::ZERO;
    }

    let secs = 1u64.checked_shl(failed_attempts - 1).unwrap_or(u64::MAX);
    let delay = Duration::from_secs(secs);

    match cap {
        Some(cap) => delay.min(cap),
        None => delay,
    }
}

/// ping 分发器
#[derive(Clone)]
pub struct Dispatcher {
    /// 传输层
    transport: Arc<dyn PingTransport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// 创建新的分发器
    pub fn new(transport: Arc<dyn PingTransport>) -> Self {
        Self { transport }
    }

    /// 发送一个 ping
    ///
    /// # 参数
    /// * `check_id` - 检查ID，用于错误信息
    /// * `url` - 完整的 ping URL
    /// * `options` - 已解析的选项
    ///
    /// # 返回
    /// * `Result<(), PingError>` - 服务器接受时返回 `Ok(())`
    pub async fn dispatch(
        &self,
        check_id: &str,
        url: &str,
        options: &Options,
    ) -> Result<(), PingError> {
        // 请求无法构建时直接失败，不进入重试
        url::Url::parse(url).map_err(|source| PingError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let request = PingRequest {
            url: url.to_string(),
            user_agent: options.effective_user_agent().map(str::to_string),
        };

        // 未经解析的选项可能为 0，至少发送一次
        let max_attempts = options.max_retries.max(1);
        let cap = options.max_backoff();

        let mut attempts: u8 = 0;
        let mut last_error: Option<BoxError> = None;

        while attempts < max_attempts {
            if attempts != 0 {
                let delay = backoff_delay(u32::from(attempts), cap);
                debug!("第 {} 次尝试前等待 {:?}: {}", attempts + 1, delay, url);
                tokio::time::sleep(delay).await;
            }

            debug!("发送 ping (第 {}/{} 次): {}", attempts + 1, max_attempts, url);

            match self.transport.post(&request).await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.map_err(PingError::ResponseRead)?;
                    let outcome = classify(&body);
                    debug!("ping 响应: HTTP {} -> {:?}", status, outcome);
                    return outcome.into_result(check_id);
                }
                Err(e) => {
                    attempts += 1;
                    warn!(
                        "ping 请求失败 ({}/{}): {}: {}",
                        attempts, max_attempts, url, e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(PingError::TransportExhausted {
            attempts,
            source: last_error.unwrap_or_else(|| "没有发送任何请求".into()),
        })
    }
}
