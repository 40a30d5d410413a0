//! 测试用的脚本化传输层

use crate::error::BoxError;
use crate::ping::transport::{PingRequest, PingResponse, PingTransport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// 每次请求的预设结果
#[derive(Debug, Clone)]
pub enum Step {
    /// 没有拿到响应
    Fail(&'static str),
    /// 返回指定状态码和响应体
    Respond(u16, &'static str),
    /// 拿到响应但读取响应体失败
    BrokenBody,
}

/// 按脚本依次返回结果，并记录每次请求及其发生时间
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    /// 脚本用完后重复最后一步
    last: Mutex<Option<Step>>,
    calls: Mutex<Vec<(PingRequest, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn always(step: Step) -> Self {
        Self {
            last: Mutex::new(Some(step)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(PingRequest, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|(req, _)| req.url).collect()
    }
}

struct ScriptedResponse {
    status: u16,
    body: Option<&'static str>,
}

#[async_trait]
impl PingResponse for ScriptedResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn text(self: Box<Self>) -> Result<String, BoxError> {
        self.body
            .map(str::to_string)
            .ok_or_else(|| "connection reset while reading body".into())
    }
}

#[async_trait]
impl PingTransport for ScriptedTransport {
    async fn post(&self, request: &PingRequest) -> Result<Box<dyn PingResponse>, BoxError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));

        let step = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            match script.pop_front() {
                Some(step) => {
                    *last = Some(step.clone());
                    step
                }
                None => last.clone().expect("scripted transport has no steps"),
            }
        };

        match step {
            Step::Fail(reason) => Err(reason.into()),
            Step::Respond(status, body) => Ok(Box::new(ScriptedResponse {
                status,
                body: Some(body),
            })),
            Step::BrokenBody => Ok(Box::new(ScriptedResponse {
                status: 200,
                body: None,
            })),
        }
    }
}
