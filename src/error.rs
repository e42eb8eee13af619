use std::fmt;

use crate::models::QuestionId;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 测试服务 API 错误
    Api(ApiError),
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 答题流程错误（本地禁止的操作）
    Flow(FlowError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Flow(e) => write!(f, "流程错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Browser(e) => Some(e),
            AppError::Flow(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 测试服务 API 错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败（连接、超时等）
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务返回非预期状态码
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 无法构造请求地址
    InvalidUrl {
        url: String,
    },
}

impl ApiError {
    /// 面向受访者的错误信息
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::BadResponse { message, .. } => message,
            _ => "Algo salió mal",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "API请求失败 ({}): {}", endpoint, source)
            }
            ApiError::BadResponse {
                endpoint,
                status,
                message,
            } => {
                write!(
                    f,
                    "API返回错误响应 ({}): status={}, message={}",
                    endpoint, status, message
                )
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
            ApiError::InvalidUrl { url } => write!(f, "无效的请求地址: {}", url),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 答题流程错误
///
/// 这些操作在界面上本应是禁用状态，调用方绕过禁用时返回此类错误，不会发出请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// 题目不属于本次测试
    UnknownQuestion { question_id: QuestionId },
    /// 该题的答案正在提交或正在批量重试
    AnswerLocked { question_id: QuestionId },
    /// 尚未接受条款
    TermsNotAccepted,
    /// 尚未选择面谈时间
    NoTimeSelected,
    /// 当前阶段不允许此操作
    WrongPhase {
        action: &'static str,
        phase: String,
    },
    /// 还有未完成或未保存的答案
    AnswersIncomplete,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::UnknownQuestion { question_id } => {
                write!(f, "题目 {} 不属于当前测试", question_id)
            }
            FlowError::AnswerLocked { question_id } => {
                write!(f, "题目 {} 的答案正在提交，暂时不能修改", question_id)
            }
            FlowError::TermsNotAccepted => write!(f, "尚未接受条款"),
            FlowError::NoTimeSelected => write!(f, "尚未选择面谈时间"),
            FlowError::WrongPhase { action, phase } => {
                write!(f, "当前阶段 {} 不允许操作: {}", phase, action)
            }
            FlowError::AnswersIncomplete => write!(f, "还有未完成或未保存的答案"),
        }
    }
}

impl std::error::Error for FlowError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 缺少必填项
    MissingValue { name: String },
    /// 配置值无效
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    /// 配置文件读取或解析失败
    FileFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingValue { name } => write!(f, "缺少配置项: {}", name),
            ConfigError::InvalidValue {
                name,
                value,
                reason,
            } => {
                write!(f, "配置项 {} 的值 '{}' 无效: {}", name, value, reason)
            }
            ConfigError::FileFailed { path, source } => {
                write!(f, "配置文件处理失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::Flow(err)
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FileFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API错误响应
    pub fn api_bad_response(
        endpoint: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        })
    }

    /// 创建配置文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Config(ConfigError::FileFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 面向受访者展示的信息，非 API 错误统一为通用提示
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(e) => e.user_message().to_string(),
            _ => "Algo salió mal".to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
