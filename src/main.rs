//! hcping 主程序入口

use anyhow::{Context, Result};
use hcping::cli::args::Args;
use hcping::cli::{command_for, CommandContext};
use hcping::config::load_config;
use hcping::error::error_chain;
use hcping::logging::LoggingSystem;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse_args();

    // 加载配置文件（日志初始化前，失败时直接输出到 stderr）
    let config = load_config(args.config.as_deref())
        .await
        .context("加载配置失败")?;

    // 初始化日志系统：命令行 > 配置文件
    let log_config = args.log_config(&config.log_level);
    LoggingSystem::setup_logging(&log_config).context("初始化日志系统失败")?;

    debug!("hcping v{} 启动", hcping::VERSION);

    let command = command_for(&args.command);
    let ctx = CommandContext::new(args, config);

    match command.execute(&ctx).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("命令执行失败: {}", error_chain(&e));
            std::process::exit(1);
        }
    }
}
