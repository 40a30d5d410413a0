//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{resolve, Config, Options};
use crate::error::{error_chain, ConfigError, HcPingError, PingError, Result};
use crate::ping::{Check, Signal};
use async_trait::async_trait;
use serde::Serialize;
use std::process::ExitStatus;
use tracing::{error, info, warn};

/// 命令执行上下文
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// 命令行参数
    pub args: Args,
    /// 配置文件内容（不存在时为默认配置）
    pub config: Config,
}

impl CommandContext {
    /// 创建执行上下文
    pub fn new(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    /// 合并后的选项：命令行/环境变量 > 配置文件 > 内置默认值
    pub fn resolved_options(&self) -> Options {
        let layered = self.args.option_overrides().layered_over(&self.config.options);
        resolve(Some(&layered))
    }

    /// 检查ID：命令行/环境变量优先，其次是配置文件，空白值视为未设置
    pub fn check_id(&self) -> Option<&str> {
        fn non_blank(id: &&str) -> bool {
            !id.trim().is_empty()
        }

        self.args
            .check_id
            .as_deref()
            .filter(non_blank)
            .or_else(|| self.config.check_id.as_deref().filter(non_blank))
    }

    /// 根据上下文构建检查
    pub fn build_check(&self) -> Result<Check> {
        let check_id = self.check_id().ok_or_else(|| {
            ConfigError::ValidationError(
                "未指定检查ID，请使用 --check-id、HCPING_CHECK_ID 或配置文件中的 check_id"
                    .to_string(),
            )
        })?;

        Ok(Check::new(check_id, Some(self.resolved_options()))?)
    }
}

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    ///
    /// # 返回
    /// * `Result<i32>` - 进程退出码
    async fn execute(&self, ctx: &CommandContext) -> Result<i32>;
}

/// 根据子命令选择处理器
pub fn command_for(command: &Commands) -> Box<dyn Command> {
    match command {
        Commands::Start => Box::new(SignalCommand(Signal::Start)),
        Commands::Success | Commands::Ping => Box::new(SignalCommand(Signal::Success)),
        Commands::Fail => Box::new(SignalCommand(Signal::Fail)),
        Commands::FailCode { code } => Box::new(SignalCommand(Signal::ExitCode(*code))),
        Commands::Exec { no_start, command } => Box::new(ExecCommand {
            send_start: !no_start,
            command: command.clone(),
        }),
        Commands::ShowConfig { format } => Box::new(ShowConfigCommand {
            format: format.clone(),
        }),
        Commands::Version { format } => Box::new(VersionCommand {
            format: format.clone(),
        }),
    }
}

/// 发送单个信号
pub struct SignalCommand(pub Signal);

#[async_trait]
impl Command for SignalCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let check = ctx.build_check()?;
        check.signal(self.0).await?;
        info!("已发送 {:?} 信号: {}", self.0, check.id());
        Ok(0)
    }
}

/// 执行命令并上报结果
pub struct ExecCommand {
    /// 是否先发送开始信号
    pub send_start: bool,
    /// 命令及参数
    pub command: Vec<String>,
}

impl ExecCommand {
    /// 根据子进程退出状态选择要发送的信号
    pub fn signal_for(status: &ExitStatus) -> Signal {
        match status.code() {
            Some(0) => Signal::Success,
            Some(code) => Signal::ExitCode(u8::try_from(code).unwrap_or(u8::MAX)),
            None => Signal::Fail,
        }
    }

    /// 记录上报失败：服务器明确拒绝时告警，未获得响应时报错
    fn log_report_failure(signal: Signal, err: &PingError) {
        if err.is_server_response() {
            warn!("服务器拒绝了 {:?} 信号: {}", signal, err);
        } else {
            error!("发送 {:?} 信号失败: {}", signal, error_chain(err));
        }
    }

    /// 子进程退出状态对应的本进程退出码
    fn exit_code(status: &ExitStatus) -> i32 {
        if let Some(code) = status.code() {
            return code;
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return 128 + signal;
            }
        }

        1
    }
}

#[async_trait]
impl Command for ExecCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let check = ctx.build_check()?;

        let Some((program, program_args)) = self.command.split_first() else {
            return Err(ConfigError::ValidationError("未指定要执行的命令".to_string()).into());
        };

        // 监控失败不影响任务本身的执行
        if self.send_start {
            if let Err(e) = check.start().await {
                Self::log_report_failure(Signal::Start, &e);
            }
        }

        info!("执行命令: {}", self.command.join(" "));
        let status = match tokio::process::Command::new(program)
            .args(program_args)
            .status()
            .await
        {
            Ok(status) => status,
            Err(e) => {
                error!("启动命令失败: {}: {}", program, e);
                if let Err(ping_err) = check.fail().await {
                    Self::log_report_failure(Signal::Fail, &ping_err);
                }
                return Err(HcPingError::Io(e));
            }
        };

        let signal = Self::signal_for(&status);
        info!("命令结束: {}，发送 {:?} 信号", status, signal);
        if let Err(e) = check.signal(signal).await {
            Self::log_report_failure(signal, &e);
        }

        Ok(Self::exit_code(&status))
    }
}

/// 合并后配置的输出结构
#[derive(Debug, Serialize)]
struct ResolvedConfig<'a> {
    check_id: Option<&'a str>,
    log_level: &'a str,
    options: Options,
}

/// 显示合并后的配置
pub struct ShowConfigCommand {
    /// 输出格式
    pub format: OutputFormat,
}

#[async_trait]
impl Command for ShowConfigCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        let log_level = ctx
            .args
            .log_level
            .as_ref()
            .map(|level| level.to_string())
            .unwrap_or_else(|| ctx.config.log_level.clone());

        let resolved = ResolvedConfig {
            check_id: ctx.check_id(),
            log_level: &log_level,
            options: ctx.resolved_options(),
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
            OutputFormat::Text => {
                let opts = &resolved.options;
                println!("check_id:        {}", resolved.check_id.unwrap_or("(未设置)"));
                println!("log_level:       {}", resolved.log_level);
                println!("base_url:        {}", opts.base_url);
                println!("max_retries:     {}", opts.max_retries);
                println!(
                    "user_agent:      {}",
                    opts.effective_user_agent().unwrap_or("(默认)")
                );
                println!(
                    "max_backoff:     {}",
                    opts.max_backoff_seconds
                        .map(|s| format!("{}s", s))
                        .unwrap_or_else(|| "(不限)".to_string())
                );
                println!(
                    "request_timeout: {}",
                    opts.request_timeout_seconds
                        .map(|s| format!("{}s", s))
                        .unwrap_or_else(|| "(不限)".to_string())
                );
            }
        }

        Ok(0)
    }
}

/// 版本命令
pub struct VersionCommand {
    /// 输出格式
    pub format: OutputFormat,
}

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, _ctx: &CommandContext) -> Result<i32> {
        match self.format {
            OutputFormat::Json => {
                let version_info = serde_json::json!({
                    "name": crate::APP_NAME,
                    "version": crate::VERSION,
                    "description": crate::APP_DESCRIPTION
                });
                println!("{}", serde_json::to_string_pretty(&version_info)?);
            }
            OutputFormat::Text => {
                println!("{} v{}", crate::APP_NAME, crate::VERSION);
                println!("{}", crate::APP_DESCRIPTION);
            }
        }
        Ok(0)
    }
}
