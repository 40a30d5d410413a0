//! 配置数据结构定义
//!
//! 定义 ping 选项、配置文件结构体以及默认值合并逻辑

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// 默认的 ping API 地址
pub const DEFAULT_BASE_URL: &str = "https://hc-ping.com/";

/// 默认的最大尝试次数
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// 全局默认选项，进程内只初始化一次且只读
static DEFAULT_OPTIONS: OnceLock<Options> = OnceLock::new();

/// ping 过程中所有可配置的选项
///
/// `Default` 得到的是"全部未设置"的覆盖项，而不是内置默认值；
/// 内置默认值见 [`default_options`]。未设置的含义：空字符串、`0` 或 `None`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// ping API 地址前缀，解析后总是以 `/` 结尾
    pub base_url: String,
    /// 总尝试次数（不是额外重试次数）。`0` 表示未设置，会被替换为默认值
    pub max_retries: u8,
    /// 覆盖传输层默认的 User-Agent
    pub user_agent: Option<String>,
    /// 单次退避等待的上限（秒），未设置或为 `0` 时不封顶
    pub max_backoff_seconds: Option<u64>,
    /// 单次请求超时（秒），未设置或为 `0` 时由传输层决定
    pub request_timeout_seconds: Option<u64>,
}

/// 获取全局默认选项
pub fn default_options() -> &'static Options {
    DEFAULT_OPTIONS.get_or_init(|| Options {
        base_url: DEFAULT_BASE_URL.to_string(),
        max_retries: DEFAULT_MAX_RETRIES,
        user_agent: None,
        max_backoff_seconds: None,
        request_timeout_seconds: None,
    })
}

/// 将用户指定的选项与默认值合并
///
/// # 参数
/// * `overrides` - 用户指定的选项，`None` 时直接返回默认选项
///
/// # 返回
/// * `Options` - 所有字段均已设置的选项
pub fn resolve(overrides: Option<&Options>) -> Options {
    let defaults = default_options();

    let Some(overrides) = overrides else {
        return defaults.clone();
    };

    let mut opts = overrides.clone().layered_over(defaults);

    // 确保 base URL 以斜杠结尾
    if !opts.base_url.ends_with('/') {
        opts.base_url.push('/');
    }

    opts
}

impl Options {
    /// 设置 base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 设置最大尝试次数
    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 设置 User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// 设置单次退避等待上限
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff_seconds = Some(max_backoff.as_secs());
        self
    }

    /// 设置单次请求超时
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_seconds = Some(timeout.as_secs());
        self
    }

    /// 以 `self` 为高优先级叠加在 `lower` 之上
    ///
    /// `self` 中未设置的字段取 `lower` 的值，已设置的字段原样保留。
    pub fn layered_over(self, lower: &Options) -> Options {
        Options {
            base_url: if self.base_url.is_empty() {
                lower.base_url.clone()
            } else {
                self.base_url
            },
            max_retries: if self.max_retries == 0 {
                lower.max_retries
            } else {
                self.max_retries
            },
            user_agent: self
                .user_agent
                .filter(|ua| !ua.is_empty())
                .or_else(|| lower.user_agent.clone()),
            max_backoff_seconds: positive(self.max_backoff_seconds)
                .or_else(|| positive(lower.max_backoff_seconds)),
            request_timeout_seconds: positive(self.request_timeout_seconds)
                .or_else(|| positive(lower.request_timeout_seconds)),
        }
    }

    /// 实际生效的 User-Agent（空字符串视为未设置）
    pub fn effective_user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref().filter(|ua| !ua.is_empty())
    }

    /// 单次退避等待上限
    pub fn max_backoff(&self) -> Option<Duration> {
        positive(self.max_backoff_seconds).map(Duration::from_secs)
    }

    /// 单次请求超时
    pub fn request_timeout(&self) -> Option<Duration> {
        positive(self.request_timeout_seconds).map(Duration::from_secs)
    }
}

/// 秒数类选项中 `0` 等同于未设置
fn positive(seconds: Option<u64>) -> Option<u64> {
    seconds.filter(|secs| *secs > 0)
}

/// 配置文件结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 默认使用的检查ID
    pub check_id: Option<String>,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// ping 选项（均可省略）
    #[serde(default)]
    pub options: Options,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_id: None,
            log_level: default_log_level(),
            options: Options::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.log_level, valid_log_levels
        ));
    }

    // 验证URL格式
    let base_url = &config.options.base_url;
    if !base_url.is_empty() && !base_url.starts_with("http://") && !base_url.starts_with("https://")
    {
        return Err(format!("base_url 格式无效: {}", base_url));
    }

    if let Some(check_id) = &config.check_id {
        if check_id.trim().is_empty() {
            return Err("check_id 不能为空".to_string());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_without_overrides_returns_defaults() {
        let opts = resolve(None);
        assert_eq!(&opts, default_options());
        assert_eq!(opts.base_url, "https://hc-ping.com/");
        assert_eq!(opts.max_retries, 3);
        assert!(opts.user_agent.is_none());
    }

    #[test]
    fn test_resolve_merges_partial_overrides() {
        let overrides = Options::default().with_user_agent("hcping tests");
        let opts = resolve(Some(&overrides));

        assert_eq!(opts.user_agent.as_deref(), Some("hcping tests"));
        assert_eq!(opts.base_url, default_options().base_url);
        assert_eq!(opts.max_retries, default_options().max_retries);
    }

    #[test]
    fn test_resolve_preserves_explicit_fields() {
        let overrides = Options::default()
            .with_base_url("https://hc.example.com/ping/")
            .with_max_retries(7)
            .with_max_backoff(Duration::from_secs(30));
        let opts = resolve(Some(&overrides));

        assert_eq!(opts.base_url, "https://hc.example.com/ping/");
        assert_eq!(opts.max_retries, 7);
        assert_eq!(opts.max_backoff(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_resolve_zero_retries_means_default() {
        let overrides = Options::default().with_max_retries(0);
        assert_eq!(resolve(Some(&overrides)).max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_resolve_appends_single_trailing_slash() {
        for (input, expected) in [
            ("https://hc.example.com", "https://hc.example.com/"),
            ("https://hc.example.com/ping", "https://hc.example.com/ping/"),
            ("https://hc.example.com/ping/", "https://hc.example.com/ping/"),
            ("x", "x/"),
        ] {
            let opts = resolve(Some(&Options::default().with_base_url(input)));
            assert_eq!(opts.base_url, expected, "input: {input}");
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let once = resolve(Some(&Options::default().with_base_url("http://localhost:8000")));
        let twice = resolve(Some(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_does_not_touch_defaults() {
        let overrides = Options::default()
            .with_base_url("http://localhost")
            .with_user_agent("ua");
        let _ = resolve(Some(&overrides));
        assert_eq!(default_options().base_url, DEFAULT_BASE_URL);
        assert!(default_options().user_agent.is_none());
    }

    #[test]
    fn test_empty_user_agent_is_unset() {
        let overrides = Options::default().with_user_agent("");
        let opts = resolve(Some(&overrides));
        assert!(opts.user_agent.is_none());
        assert!(opts.effective_user_agent().is_none());
    }

    #[test]
    fn test_layered_over_prefers_upper_layer() {
        let file = Options::default()
            .with_base_url("https://file.example/")
            .with_max_retries(5)
            .with_user_agent("file-ua");
        let cli = Options::default().with_max_retries(2);

        let merged = cli.layered_over(&file);
        assert_eq!(merged.base_url, "https://file.example/");
        assert_eq!(merged.max_retries, 2);
        assert_eq!(merged.user_agent.as_deref(), Some("file-ua"));
    }

    #[test]
    fn test_zero_seconds_are_unset() {
        let opts = Options {
            max_backoff_seconds: Some(0),
            request_timeout_seconds: Some(0),
            ..Options::default()
        };
        assert!(opts.max_backoff().is_none());
        assert!(opts.request_timeout().is_none());

        let resolved = resolve(Some(&opts));
        assert_eq!(resolved.max_backoff_seconds, None);
        assert_eq!(resolved.request_timeout_seconds, None);
    }

    #[test]
    fn test_zero_seconds_fall_through_when_layering() {
        let file = Options::default()
            .with_max_backoff(Duration::from_secs(30))
            .with_request_timeout(Duration::from_secs(10));
        let cli = Options {
            max_backoff_seconds: Some(0),
            request_timeout_seconds: Some(0),
            ..Options::default()
        };

        let merged = cli.layered_over(&file);
        assert_eq!(merged.max_backoff(), Some(Duration::from_secs(30)));
        assert_eq!(merged.request_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_validate_config() {
        let mut config = Config::default();
        assert!(validate_config(&config).is_ok());

        config.options.base_url = "ftp://hc.example.com".to_string();
        assert!(validate_config(&config).is_err());

        config.options.base_url = String::new();
        config.log_level = "trace".to_string();
        assert!(validate_config(&config).is_err());

        config.log_level = "debug".to_string();
        config.check_id = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }
}
