//! ping 传输层
//!
//! 定义发送 ping 请求的抽象接口，以及基于 reqwest 的实现

use crate::error::{BoxError, PingError};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;

/// 一次 ping 请求（POST，无请求体）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingRequest {
    /// 完整的 ping URL
    pub url: String,
    /// 覆盖默认 User-Agent，`None` 时使用传输层默认值
    pub user_agent: Option<String>,
}

/// 已收到的响应，响应体只能读取一次
#[async_trait]
pub trait PingResponse: Send {
    /// HTTP 状态码
    fn status(&self) -> u16;

    /// 读取完整的响应体文本
    async fn text(self: Box<Self>) -> Result<String, BoxError>;
}

/// ping 传输层trait
///
/// 返回 `Err` 表示没有拿到任何响应（连接失败、超时、DNS 失败等），
/// 调用方会据此重试；任何收到的响应（包括 4xx/5xx）都应返回 `Ok`。
#[async_trait]
pub trait PingTransport: Send + Sync {
    /// 发送一次 POST 请求
    ///
    /// # 参数
    /// * `request` - ping 请求
    ///
    /// # 返回
    /// * `Result<Box<dyn PingResponse>, BoxError>` - 响应或传输层错误
    async fn post(&self, request: &PingRequest) -> Result<Box<dyn PingResponse>, BoxError>;
}

/// 基于 reqwest 的传输层实现
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// HTTP客户端
    client: Client,
}

impl ReqwestTransport {
    /// 创建新的传输层
    ///
    /// # 参数
    /// * `timeout` - 单次请求超时，`None` 表示不设置
    ///
    /// # 返回
    /// * `Result<Self, PingError>` - 传输层实例
    pub fn new(timeout: Option<Duration>) -> Result<Self, PingError> {
        let mut builder =
            Client::builder().user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        Ok(Self { client })
    }
}

struct ReqwestResponse(reqwest::Response);

#[async_trait]
impl PingResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.0.status().as_u16()
    }

    async fn text(self: Box<Self>) -> Result<String, BoxError> {
        Ok(self.0.text().await?)
    }
}

#[async_trait]
impl PingTransport for ReqwestTransport {
    async fn post(&self, request: &PingRequest) -> Result<Box<dyn PingResponse>, BoxError> {
        let mut builder = self.client.post(&request.url);

        if let Some(user_agent) = &request.user_agent {
            builder = builder.header(USER_AGENT, user_agent);
        }

        let response = builder.send().await?;
        Ok(Box::new(ReqwestResponse(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reqwest_transport_creation() {
        assert!(ReqwestTransport::new(None).is_ok());
        assert!(ReqwestTransport::new(Some(Duration::from_secs(5))).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // 绑定后立即释放端口，确保没有服务在监听
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new(Some(Duration::from_secs(2))).unwrap();
        let request = PingRequest {
            url: format!("http://{}/check", addr),
            user_agent: None,
        };

        assert!(transport.post(&request).await.is_err());
    }
}
