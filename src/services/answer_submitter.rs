//! 答案提交服务 - 业务能力层
//!
//! 只负责"保存一道题的答案"，带传输层重试，不关心界面状态。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::TestService;
use crate::models::{SubmitOutcome, SubmitRequest, SubmitResult};
use crate::services::RetryPolicy;

/// 答案提交服务
///
/// 可廉价克隆，供每个提交任务各持一份。
#[derive(Clone)]
pub struct AnswerSubmitter {
    service: Arc<dyn TestService>,
    codigo: String,
    policy: RetryPolicy,
}

impl AnswerSubmitter {
    pub fn new(service: Arc<dyn TestService>, codigo: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            service,
            codigo: codigo.into(),
            policy,
        }
    }

    pub fn codigo(&self) -> &str {
        &self.codigo
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 提交一道题的答案，失败时按策略重试，最终结果不会是 Err
    pub async fn submit(&self, request: SubmitRequest) -> SubmitResult {
        let label = format!("保存题目 {} 的答案", request.question_id);
        debug!("{} ({})", label, request.answer);

        let service = self.service.as_ref();
        let codigo = self.codigo.as_str();
        let (result, attempts) = self
            .policy
            .run_counted(&label, move || {
                service.submit_answer(codigo, request.question_id, request.answer)
            })
            .await;

        let outcome = match result {
            Ok(()) => SubmitOutcome::Saved,
            Err(e) => {
                warn!("⚠️ 题目 {} 的答案未能保存: {}", request.question_id, e);
                SubmitOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        SubmitResult {
            request,
            outcome,
            attempts,
        }
    }
}
