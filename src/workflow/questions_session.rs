//! 答题会话 - 流程层
//!
//! 把答案跟踪、滚动导航、批量重试和提交服务组装在一起。
//!
//! 所有状态只在会话所有者上修改。每次提交都是一个独立的 tokio 任务，
//! 结果经 mpsc 通道回到会话，由 `next_result` / `drain_results` 逐条回写。
//! 会话被丢弃后，仍在进行的任务照常结束，结果因通道关闭而被丢弃。

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::error::{AppResult, FlowError};
use crate::infrastructure::Viewport;
use crate::models::{AnswerCode, Question, QuestionId, SubmissionState, SubmitRequest, SubmitResult};
use crate::services::AnswerSubmitter;
use crate::tracker::{AnswerTracker, CompletionStatus, Navigator, RetryCoordinator};

/// 一条提交结果回写后的变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub question_id: QuestionId,
    /// 结果是否被采纳（过期结果为 false）
    pub applied: bool,
    /// 回写后的提交状态
    pub state: SubmissionState,
    /// 本次回写使整份问卷首次完成
    pub completed: bool,
}

/// 单题的展示状态
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView<'a> {
    pub index: usize,
    pub question: &'a Question,
    pub answer: Option<AnswerCode>,
    pub state: SubmissionState,
    pub focused: bool,
    /// 选项是否可点击
    pub enabled: bool,
    pub last_error: Option<&'a str>,
}

/// 答题会话
pub struct QuestionsSession {
    tracker: AnswerTracker,
    navigator: Navigator,
    retry: RetryCoordinator,
    submitter: AnswerSubmitter,
    viewport: Arc<dyn Viewport>,
    results_tx: UnboundedSender<SubmitResult>,
    results_rx: UnboundedReceiver<SubmitResult>,
    completion_announced: bool,
}

impl QuestionsSession {
    pub fn new(
        questions: Vec<Question>,
        submitter: AnswerSubmitter,
        viewport: Arc<dyn Viewport>,
        auto_scroll: bool,
    ) -> Self {
        let navigator = Navigator::new(&questions, auto_scroll);
        let tracker = AnswerTracker::new(questions);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        info!(
            "📋 开始答题: {} 道题, 自动滚动 {}",
            tracker.len(),
            if auto_scroll { "开启" } else { "关闭" }
        );

        Self {
            tracker,
            navigator,
            retry: RetryCoordinator::new(),
            submitter,
            viewport,
            results_tx,
            results_rx,
            completion_announced: false,
        }
    }

    // ========== 读取状态 ==========

    pub fn tracker(&self) -> &AnswerTracker {
        &self.tracker
    }

    pub fn questions(&self) -> &[Question] {
        self.tracker.questions()
    }

    pub fn focused(&self) -> Option<QuestionId> {
        self.navigator.focused()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.navigator.focused_index()
    }

    pub fn auto_scroll(&self) -> bool {
        self.navigator.auto_scroll()
    }

    pub fn state(&self, question_id: QuestionId) -> SubmissionState {
        self.tracker.state(question_id)
    }

    pub fn all_answered(&self) -> bool {
        self.tracker.all_answered()
    }

    pub fn has_unresolved_errors(&self) -> bool {
        self.tracker.has_unresolved_errors()
    }

    pub fn retrying(&self) -> bool {
        self.retry.is_retrying()
    }

    pub fn completion(&self) -> CompletionStatus {
        self.tracker.completion(self.retry.is_retrying())
    }

    pub fn is_complete(&self) -> bool {
        self.completion() == CompletionStatus::Complete
    }

    /// 还有提交任务未回写
    pub fn has_pending(&self) -> bool {
        self.tracker.pending_count() > 0
    }

    /// 该题的选项当前是否可点击：提交中或批量重试期间都不可点
    pub fn can_answer(&self, question_id: QuestionId) -> bool {
        !self.retry.is_retrying() && self.tracker.can_answer(question_id)
    }

    pub fn question_views(&self) -> Vec<QuestionView<'_>> {
        self.tracker
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| QuestionView {
                index,
                question,
                answer: self.tracker.answer(question.id),
                state: self.tracker.state(question.id),
                focused: self.navigator.is_focused(question.id),
                enabled: self.can_answer(question.id),
                last_error: self.tracker.last_error(question.id),
            })
            .collect()
    }

    // ========== 用户操作 ==========

    /// 作答：记录答案、后台提交，自动滚动模式下滚到下一道未答题
    pub async fn record_answer(&mut self, question_id: QuestionId, answer: AnswerCode) -> AppResult<()> {
        if self.retry.is_retrying() {
            return Err(FlowError::AnswerLocked { question_id }.into());
        }

        let request = self.tracker.record_answer(question_id, answer)?;
        self.spawn_submit(request);

        if let Err(e) = self.auto_advance(question_id).await {
            warn!("⚠️ 自动滚动失败: {}", e);
        }
        Ok(())
    }

    /// 重新提交全部失败的答案，返回重新提交的数量
    pub fn retry_all(&mut self) -> usize {
        let requests = self.retry.retry_all(&mut self.tracker);
        let count = requests.len();
        for request in requests {
            self.spawn_submit(request);
        }
        count
    }

    pub fn set_auto_scroll(&mut self, enabled: bool) {
        debug!("自动滚动: {}", enabled);
        self.navigator.set_auto_scroll(enabled);
    }

    /// 滚动事件：按当前滚动位置更新聚焦题目
    pub async fn on_scroll(&mut self) -> AppResult<Option<QuestionId>> {
        let metrics = self.viewport.metrics().await?;
        Ok(self.navigator.on_scroll(&metrics))
    }

    /// 点击第 index 道题的卡片
    pub async fn click_question(&mut self, index: usize) -> AppResult<Option<QuestionId>> {
        let metrics = self.viewport.metrics().await?;
        if let Some(command) = self.navigator.click(index, &metrics) {
            self.viewport.scroll_to(command).await?;
        }
        Ok(self.navigator.focused())
    }

    // ========== 提交结果 ==========

    /// 等待下一条提交结果并回写；没有进行中的提交时立即返回 None
    pub async fn next_result(&mut self) -> Option<SessionUpdate> {
        if !self.has_pending() {
            return None;
        }
        let result = self.results_rx.recv().await?;
        Some(self.apply_result(result))
    }

    /// 回写所有已到达的结果，不等待
    pub fn drain_results(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        loop {
            match self.results_rx.try_recv() {
                Ok(result) => updates.push(self.apply_result(result)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        updates
    }

    /// 等到所有进行中的提交都回写完毕
    pub async fn wait_idle(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_result().await {
            updates.push(update);
        }
        updates
    }

    pub fn apply_result(&mut self, result: SubmitResult) -> SessionUpdate {
        let question_id = result.question_id();
        let applied = self.tracker.on_submit_result(question_id, &result.outcome);

        if applied {
            self.retry.on_result(question_id);
            if result.outcome.is_saved() {
                debug!("✓ 题目 {} 已保存 ({} 次请求)", question_id, result.attempts);
            }
        }

        let completed = !self.completion_announced && self.is_complete();
        if completed {
            self.completion_announced = true;
            info!("🎉 全部 {} 道题已作答并保存", self.tracker.len());
        }

        SessionUpdate {
            question_id,
            applied,
            state: self.tracker.state(question_id),
            completed,
        }
    }

    // ========== 辅助函数 ==========

    fn spawn_submit(&self, request: SubmitRequest) {
        let submitter = self.submitter.clone();
        let tx = self.results_tx.clone();

        tokio::spawn(async move {
            let result = submitter.submit(request).await;
            // 会话已丢弃时结果无人接收
            let _ = tx.send(result);
        });
    }

    async fn auto_advance(&mut self, answered_id: QuestionId) -> AppResult<()> {
        if !self.navigator.auto_scroll() {
            return Ok(());
        }

        let metrics = self.viewport.metrics().await?;
        let answered = self.tracker.answered_ids();
        let questions = self.tracker.questions();
        if let Some(command) = self
            .navigator
            .after_answer(questions, &answered, answered_id, &metrics)
        {
            self.viewport.scroll_to(command).await?;
        }
        Ok(())
    }
}
