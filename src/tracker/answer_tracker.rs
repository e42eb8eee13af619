//! 答案状态跟踪
//!
//! 记录每道题的答案和提交状态。纯状态，不发请求：`record_answer` 返回待提交的
//! `SubmitRequest`，由调用方交给提交服务，结果再通过 `on_submit_result` 回写。

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::FlowError;
use crate::models::{AnswerCode, Question, QuestionId, SubmissionState, SubmitOutcome, SubmitRequest};

/// 整体完成情况，决定问题列表下方显示什么
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// 还有题目未作答
    InProgress,
    /// 全部作答，仍有答案在提交
    Saving,
    /// 全部作答，部分答案保存失败（或批量重试尚未结束）
    NeedsRetry,
    /// 全部作答且全部保存
    Complete,
}

/// 答案状态跟踪器
#[derive(Debug, Clone)]
pub struct AnswerTracker {
    questions: Vec<Question>,
    positions: HashMap<QuestionId, usize>,
    answers: HashMap<QuestionId, AnswerCode>,
    states: HashMap<QuestionId, SubmissionState>,
    last_errors: HashMap<QuestionId, String>,
}

impl AnswerTracker {
    pub fn new(questions: Vec<Question>) -> Self {
        let positions = questions
            .iter()
            .enumerate()
            .map(|(index, q)| (q.id, index))
            .collect();

        Self {
            questions,
            positions,
            answers: HashMap::new(),
            states: HashMap::new(),
            last_errors: HashMap::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 题目在列表中的位置
    pub fn position(&self, question_id: QuestionId) -> Option<usize> {
        self.positions.get(&question_id).copied()
    }

    pub fn answer(&self, question_id: QuestionId) -> Option<AnswerCode> {
        self.answers.get(&question_id).copied()
    }

    pub fn state(&self, question_id: QuestionId) -> SubmissionState {
        self.states.get(&question_id).copied().unwrap_or_default()
    }

    /// 最近一次提交失败的原因
    pub fn last_error(&self, question_id: QuestionId) -> Option<&str> {
        self.last_errors.get(&question_id).map(String::as_str)
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.contains_key(&question_id)
    }

    /// 已作答题目的 id 集合
    pub fn answered_ids(&self) -> BTreeSet<QuestionId> {
        self.answers.keys().copied().collect()
    }

    /// 该题的选项当前是否可点击
    pub fn can_answer(&self, question_id: QuestionId) -> bool {
        self.positions.contains_key(&question_id) && !self.state(question_id).is_pending()
    }

    /// 记录（或覆盖）答案并标记为提交中
    pub fn record_answer(
        &mut self,
        question_id: QuestionId,
        answer: AnswerCode,
    ) -> Result<SubmitRequest, FlowError> {
        if !self.positions.contains_key(&question_id) {
            return Err(FlowError::UnknownQuestion { question_id });
        }
        if self.state(question_id).is_pending() {
            return Err(FlowError::AnswerLocked { question_id });
        }

        self.answers.insert(question_id, answer);
        self.states.insert(question_id, SubmissionState::Pending);
        debug!("题目 {} 作答: {}", question_id, answer);

        Ok(SubmitRequest {
            question_id,
            answer,
        })
    }

    /// 把保存失败的题目重新标记为提交中，返回需要重新发送的请求
    pub fn mark_for_retry(&mut self, question_id: QuestionId) -> Option<SubmitRequest> {
        if self.state(question_id) != SubmissionState::Errored {
            return None;
        }
        let answer = self.answer(question_id)?;
        self.states.insert(question_id, SubmissionState::Pending);

        Some(SubmitRequest {
            question_id,
            answer,
        })
    }

    /// 回写提交结果。只接受处于提交中的题目，其他情况视为过期结果并忽略
    ///
    /// 返回结果是否被采纳。
    pub fn on_submit_result(&mut self, question_id: QuestionId, outcome: &SubmitOutcome) -> bool {
        if !self.state(question_id).is_pending() {
            debug!("忽略题目 {} 的过期提交结果", question_id);
            return false;
        }

        match outcome {
            SubmitOutcome::Saved => {
                self.states.insert(question_id, SubmissionState::Settled);
                self.last_errors.remove(&question_id);
            }
            SubmitOutcome::Failed { message } => {
                self.states.insert(question_id, SubmissionState::Errored);
                self.last_errors.insert(question_id, message.clone());
            }
        }
        true
    }

    fn count_in(&self, state: SubmissionState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn pending_count(&self) -> usize {
        self.count_in(SubmissionState::Pending)
    }

    pub fn settled_count(&self) -> usize {
        self.count_in(SubmissionState::Settled)
    }

    pub fn errored_count(&self) -> usize {
        self.count_in(SubmissionState::Errored)
    }

    /// 保存失败的题目，按题目顺序、无重复
    pub fn errored_ids(&self) -> Vec<QuestionId> {
        self.questions
            .iter()
            .map(|q| q.id)
            .filter(|id| self.state(*id) == SubmissionState::Errored)
            .collect()
    }

    /// 每道题都有答案
    pub fn all_answered(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    pub fn has_unresolved_errors(&self) -> bool {
        self.errored_count() > 0
    }

    /// `retrying` 为真时，即使没有失败题目也视为需要重试（批量重试未结束）
    pub fn completion(&self, retrying: bool) -> CompletionStatus {
        if !self.all_answered() {
            CompletionStatus::InProgress
        } else if self.pending_count() > 0 {
            CompletionStatus::Saving
        } else if self.has_unresolved_errors() || retrying {
            CompletionStatus::NeedsRetry
        } else {
            CompletionStatus::Complete
        }
    }
}
