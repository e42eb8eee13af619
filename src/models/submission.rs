use std::fmt;

use super::{AnswerCode, QuestionId};

/// 单题答案的提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionState {
    /// 尚未作答
    #[default]
    Unsent,
    /// 请求进行中（含传输层自动重试）
    Pending,
    /// 服务端已保存
    Settled,
    /// 自动重试用尽后仍失败
    Errored,
}

impl SubmissionState {
    pub fn is_pending(self) -> bool {
        self == SubmissionState::Pending
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Unsent => "unsent",
            SubmissionState::Pending => "pending",
            SubmissionState::Settled => "settled",
            SubmissionState::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// 一次答案提交
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitRequest {
    pub question_id: QuestionId,
    pub answer: AnswerCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Failed { message: String },
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved)
    }
}

/// 提交任务回传给会话的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub request: SubmitRequest,
    pub outcome: SubmitOutcome,
    /// 实际发出的请求次数
    pub attempts: usize,
}

impl SubmitResult {
    pub fn question_id(&self) -> QuestionId {
        self.request.question_id
    }
}
