//! 受监控的检查
//!
//! 一个 `Check` 对应一个周期性任务，通过 ping 上报其开始、成功与失败

use crate::config::{resolve, Options};
use crate::error::PingError;
use crate::ping::dispatcher::Dispatcher;
use crate::ping::transport::{PingTransport, ReqwestTransport};
use std::sync::Arc;

/// ping 信号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// 任务开始
    Start,
    /// 任务成功结束或仍然存活
    Success,
    /// 任务失败
    Fail,
    /// 任务以指定退出码失败
    ExitCode(u8),
}

impl Signal {
    /// 该信号在检查URL之后追加的路径
    fn suffix(&self) -> Option<String> {
        match self {
            Signal::Start => Some("start".to_string()),
            Signal::Success => None,
            Signal::Fail => Some("fail".to_string()),
            Signal::ExitCode(code) => Some(code.to_string()),
        }
    }
}

/// 一个受监控的周期性任务
#[derive(Debug, Clone)]
pub struct Check {
    /// 检查ID（通常为 UUID，不做校验）
    id: String,
    /// 已解析的选项
    options: Options,
    /// ping 分发器
    dispatcher: Dispatcher,
}

impl Check {
    /// 使用默认的 reqwest 传输层创建检查
    ///
    /// # 参数
    /// * `id` - 检查ID
    /// * `options` - 用户指定的选项，未设置的字段使用默认值
    ///
    /// # 返回
    /// * `Result<Self, PingError>` - 检查实例，HTTP客户端创建失败时返回错误
    pub fn new(id: impl Into<String>, options: Option<Options>) -> Result<Self, PingError> {
        let options = resolve(options.as_ref());
        let transport = ReqwestTransport::new(options.request_timeout())?;
        Ok(Self::from_parts(id.into(), options, Arc::new(transport)))
    }

    /// 使用自定义传输层创建检查
    pub fn with_transport(
        id: impl Into<String>,
        options: Option<Options>,
        transport: Arc<dyn PingTransport>,
    ) -> Self {
        Self::from_parts(id.into(), resolve(options.as_ref()), transport)
    }

    fn from_parts(id: String, options: Options, transport: Arc<dyn PingTransport>) -> Self {
        Self {
            id,
            options,
            dispatcher: Dispatcher::new(transport),
        }
    }

    /// 检查ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 已解析的选项
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// 构建指定信号的 ping URL
    pub fn url_for(&self, signal: Signal) -> String {
        match signal.suffix() {
            Some(suffix) => format!("{}{}/{}", self.options.base_url, self.id, suffix),
            None => format!("{}{}", self.options.base_url, self.id),
        }
    }

    /// 发送指定信号
    pub async fn signal(&self, signal: Signal) -> Result<(), PingError> {
        let url = self.url_for(signal);
        self.dispatcher.dispatch(&self.id, &url, &self.options).await
    }

    /// 通知任务开始执行
    pub async fn start(&self) -> Result<(), PingError> {
        self.signal(Signal::Start).await
    }

    /// 通知任务成功结束
    pub async fn success(&self) -> Result<(), PingError> {
        self.signal(Signal::Success).await
    }

    /// 通知任务成功结束或仍然存活，与 [`Check::success`] 相同
    pub async fn ping(&self) -> Result<(), PingError> {
        self.success().await
    }

    /// 通知任务失败
    pub async fn fail(&self) -> Result<(), PingError> {
        self.signal(Signal::Fail).await
    }

    /// 通知任务以指定退出码结束
    pub async fn fail_code(&self, code: u8) -> Result<(), PingError> {
        self.signal(Signal::ExitCode(code)).await
    }
}
