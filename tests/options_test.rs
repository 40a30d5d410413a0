//! 选项合并测试
//!
//! 验证新建检查时用户选项与默认选项的合并结果

use hcping::config::{DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES};
use hcping::{default_options, Check, Options};

const CHECK_ID: &str = "00000000-0000-0000-0000-000000000000";

#[tokio::test]
async fn test_default_options() {
    let check = Check::new(CHECK_ID, None).unwrap();

    assert_eq!(check.options().base_url, default_options().base_url);
    assert_eq!(check.options().max_retries, default_options().max_retries);
    assert_eq!(check.options().user_agent, default_options().user_agent);
}

#[tokio::test]
async fn test_merged_options() {
    let opts = Options::default().with_user_agent("hcping tests");
    let check = Check::new(CHECK_ID, Some(opts.clone())).unwrap();

    assert_eq!(check.options().user_agent, opts.user_agent);
    assert_eq!(check.options().base_url, DEFAULT_BASE_URL);
    assert_eq!(check.options().max_retries, DEFAULT_MAX_RETRIES);
}

#[tokio::test]
async fn test_options_from_toml_fragment() {
    let opts: Options = toml::from_str("max_retries = 0\nbase_url = \"http://localhost:8000\"").unwrap();
    let check = Check::new(CHECK_ID, Some(opts)).unwrap();

    assert_eq!(check.options().base_url, "http://localhost:8000/");
    assert_eq!(check.options().max_retries, DEFAULT_MAX_RETRIES);
}
