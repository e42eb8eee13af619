use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{AnswerCode, AvailableDay, BookingResponse, QuestionId, TestDefinition};

/// 远程测试服务提供的全部能力
///
/// 所有请求都以受访者的 `codigo` 作为查询参数。
#[async_trait]
pub trait TestService: Send + Sync {
    /// 获取测试的题目列表
    async fn fetch_test(&self, codigo: &str) -> AppResult<TestDefinition>;

    /// 保存单题答案
    async fn submit_answer(
        &self,
        codigo: &str,
        question_id: QuestionId,
        answer: AnswerCode,
    ) -> AppResult<()>;

    /// 标记测试开始
    async fn start_test(&self, codigo: &str) -> AppResult<()>;

    /// 标记测试结束
    async fn finish_test(&self, codigo: &str) -> AppResult<()>;

    /// 可预约的面谈时段
    async fn available_slots(&self, codigo: &str) -> AppResult<Vec<AvailableDay>>;

    /// 预约面谈，`fecha` 为所选时段的开始时间
    async fn book_interview(&self, codigo: &str, fecha: &str) -> AppResult<BookingResponse>;
}
