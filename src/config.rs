use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::services::RetryPolicy;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 测试服务地址
    pub api_base_url: String,
    /// 受访者的测试码（codigo）
    pub codigo: String,
    /// 原始 Cookie 字符串，用于提取 csrftoken
    pub cookie: Option<String>,
    /// 单次请求超时（毫秒）
    pub request_timeout_ms: u64,
    /// 单个答案提交的额外重试次数
    pub submit_max_retries: usize,
    /// 重试间隔（毫秒）
    pub submit_retry_delay_ms: u64,
    /// 答题后是否自动滚动到下一题
    pub auto_scroll: bool,
    /// 浏览器调试端口，未设置时使用模拟视口
    pub browser_debug_port: Option<u16>,
    /// 浏览器中打开的问卷页面
    pub target_url: String,
    /// 题目列表容器的 CSS 选择器，未设置时使用 `[data-preguntas]`
    pub question_list_selector: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 会话日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            codigo: String::new(),
            cookie: None,
            request_timeout_ms: 5000,
            submit_max_retries: 3,
            submit_retry_delay_ms: 1000,
            auto_scroll: true,
            browser_debug_port: None,
            target_url: "http://localhost:8000/tests/".to_string(),
            question_list_selector: None,
            verbose_logging: false,
            output_log_file: "session.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件，缺省字段使用默认值，再叠加环境变量
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            codigo: std::env::var("TEST_CODIGO").unwrap_or(self.codigo),
            cookie: std::env::var("TEST_COOKIE").ok().or(self.cookie),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_ms),
            submit_max_retries: std::env::var("SUBMIT_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.submit_max_retries),
            submit_retry_delay_ms: std::env::var("SUBMIT_RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.submit_retry_delay_ms),
            auto_scroll: std::env::var("AUTO_SCROLL").ok().and_then(|v| v.parse().ok()).unwrap_or(self.auto_scroll),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).or(self.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(self.target_url),
            question_list_selector: std::env::var("QUESTION_LIST_SELECTOR").ok().or(self.question_list_selector),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 校验必填项
    pub fn validate(&self) -> AppResult<()> {
        if self.codigo.trim().is_empty() {
            return Err(AppError::Config(ConfigError::MissingValue {
                name: "codigo".to_string(),
            }));
        }
        if let Err(e) = url::Url::parse(&self.api_base_url) {
            return Err(AppError::Config(ConfigError::InvalidValue {
                name: "api_base_url".to_string(),
                value: self.api_base_url.clone(),
                reason: e.to_string(),
            }));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 答案提交、开始/结束测试共用的重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.submit_max_retries,
            Duration::from_millis(self.submit_retry_delay_ms),
        )
    }
}
