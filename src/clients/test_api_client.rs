/// 测试服务 API 客户端
///
/// 封装所有与远程测试服务相关的 HTTP 调用
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::clients::csrf::{self, CSRF_HEADER};
use crate::clients::TestService;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{
    AnswerCode, AvailabilityResponse, AvailableDay, BookingRequest, BookingResponse, QuestionId,
    TestDefinition,
};

const TEST_PATH: &str = "api/tests/tests/";
const START_PATH: &str = "api/tests/tests/iniciar/";
const FINISH_PATH: &str = "api/tests/tests/finalizar/";
const ANSWER_PATH: &str = "api/tests/respuestas-likert-noas/";
const SLOTS_PATH: &str = "api/entrevistas/horarios-disponibles/";
const BOOKING_PATH: &str = "api/entrevistas/crear-entrevista/";

/// 服务端没有给出可读信息时的默认提示
pub const FALLBACK_ERROR_MESSAGE: &str = "Algo salió mal";

/// 测试服务客户端
pub struct TestApiClient {
    http: Client,
    base_url: Url,
    csrf_token: Option<String>,
}

impl TestApiClient {
    /// 创建新的客户端，csrftoken 从配置中的 Cookie 提取
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Other(format!("无法创建 HTTP 客户端: {}", e)))?;

        let base_url = normalize_base_url(&config.api_base_url)?;
        let csrf_token = config.cookie.as_deref().and_then(csrf::token_from_cookie);

        if csrf_token.is_none() {
            warn!("⚠️ 未找到 csrftoken，修改类请求可能被服务端拒绝");
        }

        Ok(Self {
            http,
            base_url,
            csrf_token,
        })
    }

    /// 替换 csrftoken（例如从已连接的浏览器页面读取后）
    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// 构建带 `codigo` 查询参数的完整地址
    pub fn endpoint_url(&self, path: &str, codigo: &str) -> AppResult<Url> {
        let mut url = self.base_url.join(path).map_err(|_| {
            AppError::Api(ApiError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
            })
        })?;
        url.query_pairs_mut().append_pair("codigo", codigo);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, codigo: &str) -> AppResult<T> {
        let url = self.endpoint_url(path, codigo)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        let response = ensure_success(path, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Api(ApiError::JsonParseFailed { source: Box::new(e) }))
    }

    /// 发送带 CSRF 头的 POST 请求
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        codigo: &str,
        body: &B,
    ) -> AppResult<Response> {
        let url = self.endpoint_url(path, codigo)?;
        debug!("POST {}", url);

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        ensure_success(path, response).await
    }
}

#[async_trait]
impl TestService for TestApiClient {
    async fn fetch_test(&self, codigo: &str) -> AppResult<TestDefinition> {
        let test: TestDefinition = self.get_json(TEST_PATH, codigo).await?;
        debug!("获取到 {} 道题目", test.questions.len());
        Ok(test)
    }

    async fn submit_answer(
        &self,
        codigo: &str,
        question_id: QuestionId,
        answer: AnswerCode,
    ) -> AppResult<()> {
        let body = json!({
            "pregunta": question_id,
            "alternativa": answer.code(),
        });
        self.post(ANSWER_PATH, codigo, &body).await?;
        Ok(())
    }

    async fn start_test(&self, codigo: &str) -> AppResult<()> {
        self.post(START_PATH, codigo, &json!({})).await?;
        Ok(())
    }

    async fn finish_test(&self, codigo: &str) -> AppResult<()> {
        self.post(FINISH_PATH, codigo, &json!({})).await?;
        Ok(())
    }

    async fn available_slots(&self, codigo: &str) -> AppResult<Vec<AvailableDay>> {
        let response: AvailabilityResponse = self.get_json(SLOTS_PATH, codigo).await?;
        Ok(response.dias)
    }

    async fn book_interview(&self, codigo: &str, fecha: &str) -> AppResult<BookingResponse> {
        let body = BookingRequest {
            fecha: fecha.to_string(),
        };
        let response = self.post(BOOKING_PATH, codigo, &body).await?;
        response
            .json::<BookingResponse>()
            .await
            .map_err(|e| AppError::Api(ApiError::JsonParseFailed { source: Box::new(e) }))
    }
}

// ========== 辅助函数 ==========

/// 保证基础地址以 `/` 结尾，使相对路径拼接在其后
fn normalize_base_url(raw: &str) -> AppResult<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash).map_err(|_| {
        AppError::Api(ApiError::InvalidUrl {
            url: raw.to_string(),
        })
    })
}

/// 非 2xx 响应转换为 BadResponse，并尽量取出服务端的错误说明
async fn ensure_success(endpoint: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = error_message(&body);
    warn!("API 返回错误 ({}): {} {}", endpoint, status.as_u16(), message);

    Err(AppError::api_bad_response(endpoint, status.as_u16(), message))
}

/// 提取错误信息：数组首元素 → `detail` → `error` → 默认提示
pub fn error_message(body: &Value) -> String {
    body.get(0)
        .and_then(Value::as_str)
        .or_else(|| body.get("detail").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}
