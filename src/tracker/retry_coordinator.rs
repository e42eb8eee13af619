//! 批量重试
//!
//! 把所有保存失败的答案一次性重新提交，重试期间锁定作答控件。

use std::collections::BTreeSet;

use tracing::info;

use crate::models::{QuestionId, SubmitRequest};
use crate::tracker::AnswerTracker;

#[derive(Debug, Clone, Default)]
pub struct RetryCoordinator {
    in_flight: BTreeSet<QuestionId>,
}

impl RetryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仍有重试中的答案
    pub fn is_retrying(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_in_flight(&self, question_id: QuestionId) -> bool {
        self.in_flight.contains(&question_id)
    }

    /// 把当前全部失败题目转为提交中，返回需要重新发送的请求
    ///
    /// 没有失败题目时不做任何事。
    pub fn retry_all(&mut self, tracker: &mut AnswerTracker) -> Vec<SubmitRequest> {
        let requests: Vec<SubmitRequest> = tracker
            .errored_ids()
            .into_iter()
            .filter_map(|id| tracker.mark_for_retry(id))
            .collect();

        if requests.is_empty() {
            return requests;
        }

        info!("🔁 重新提交 {} 个保存失败的答案", requests.len());
        self.in_flight
            .extend(requests.iter().map(|r| r.question_id));
        requests
    }

    /// 某题的结果已回写；最后一个结束时重试状态解除
    pub fn on_result(&mut self, question_id: QuestionId) {
        if self.in_flight.remove(&question_id) && self.in_flight.is_empty() {
            info!("✓ 批量重试结束");
        }
    }
}
