//! ping 模块
//!
//! 提供检查信号、ping 分发（重试与退避）、响应分类和传输层抽象

pub mod check;
pub mod dispatcher;
pub mod response;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出主要类型
pub use check::{Check, Signal};
pub use dispatcher::{backoff_delay, Dispatcher};
pub use response::{classify, PingOutcome};
pub use transport::{PingRequest, PingResponse, PingTransport, ReqwestTransport};
