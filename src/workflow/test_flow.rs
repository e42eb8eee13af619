//! 页面流程 - 流程层
//!
//! 加载 → 介绍 → 答题 → 预约面谈 → 完成，任何阶段都可以直接结束。

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::TestService;
use crate::error::{AppError, AppResult, FlowError};
use crate::infrastructure::Viewport;
use crate::models::{Interview, Question};
use crate::services::{AnswerSubmitter, RetryPolicy};
use crate::workflow::{InterviewScheduler, QuestionsSession};

pub const START_FAILED_MESSAGE: &str = "Ocurrió un error, por favor intenta de nuevo.";
pub const FINISH_FAILED_MESSAGE: &str = "Ocurrió un error inesperado, por favor intenta de nuevo.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    /// 加载题目失败，显示服务端给出的信息
    LoadFailed { message: String },
    Intro,
    Questions,
    Scheduling,
    Scheduled,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::LoadFailed { .. } => "load_failed",
            Phase::Intro => "intro",
            Phase::Questions => "questions",
            Phase::Scheduling => "scheduling",
            Phase::Scheduled => "scheduled",
            Phase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// 一次访问的完整流程
pub struct TestFlow {
    service: Arc<dyn TestService>,
    codigo: String,
    policy: RetryPolicy,
    auto_scroll: bool,
    phase: Phase,
    questions: Vec<Question>,
    terms_accepted: bool,
    start_banner: Option<&'static str>,
    finish_banner: Option<&'static str>,
    session: Option<QuestionsSession>,
    scheduler: InterviewScheduler,
    interview: Option<Interview>,
}

impl TestFlow {
    pub fn new(
        service: Arc<dyn TestService>,
        codigo: impl Into<String>,
        policy: RetryPolicy,
        auto_scroll: bool,
    ) -> Self {
        Self {
            service,
            codigo: codigo.into(),
            policy,
            auto_scroll,
            phase: Phase::Loading,
            questions: Vec::new(),
            terms_accepted: false,
            start_banner: None,
            finish_banner: None,
            session: None,
            scheduler: InterviewScheduler::new(),
            interview: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn codigo(&self) -> &str {
        &self.codigo
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn start_banner(&self) -> Option<&'static str> {
        self.start_banner
    }

    pub fn finish_banner(&self) -> Option<&'static str> {
        self.finish_banner
    }

    pub fn session(&self) -> Option<&QuestionsSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QuestionsSession> {
        self.session.as_mut()
    }

    pub fn scheduler(&self) -> &InterviewScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut InterviewScheduler {
        &mut self.scheduler
    }

    pub fn interview(&self) -> Option<&Interview> {
        self.interview.as_ref()
    }

    /// 是否显示顶部标志
    pub fn shows_logo(&self) -> bool {
        matches!(
            self.phase,
            Phase::Loading | Phase::LoadFailed { .. } | Phase::Intro | Phase::Closed | Phase::Scheduled
        )
    }

    /// 加载题目，失败时进入 LoadFailed
    pub async fn load(&mut self) -> AppResult<()> {
        self.expect_phase("load", |p| matches!(p, Phase::Loading | Phase::LoadFailed { .. }))?;
        self.phase = Phase::Loading;

        match self.service.fetch_test(&self.codigo).await {
            Ok(test) => {
                info!("✓ 测试加载完成: {} 道题", test.questions.len());
                self.questions = test.questions;
                self.phase = Phase::Intro;
                Ok(())
            }
            Err(e) => {
                error!("❌ 加载测试失败: {}", e);
                self.phase = Phase::LoadFailed {
                    message: e.user_message(),
                };
                Err(e)
            }
        }
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    pub fn can_start(&self) -> bool {
        self.phase == Phase::Intro && self.terms_accepted
    }

    /// 标记测试开始并进入答题阶段
    pub async fn start(&mut self, viewport: Arc<dyn Viewport>) -> AppResult<()> {
        self.expect_phase("start", |p| *p == Phase::Intro)?;
        if !self.terms_accepted {
            return Err(FlowError::TermsNotAccepted.into());
        }

        self.start_banner = None;
        let service = self.service.as_ref();
        let codigo = self.codigo.as_str();
        let result = self
            .policy
            .run("开始测试", move || service.start_test(codigo))
            .await;

        if let Err(e) = result {
            warn!("⚠️ 无法开始测试: {}", e);
            self.start_banner = Some(START_FAILED_MESSAGE);
            return Err(e);
        }

        let submitter = AnswerSubmitter::new(self.service.clone(), self.codigo.clone(), self.policy);
        self.session = Some(QuestionsSession::new(
            self.questions.clone(),
            submitter,
            viewport,
            self.auto_scroll,
        ));
        self.phase = Phase::Questions;
        Ok(())
    }

    /// 全部答案保存后是否可以结束答题
    pub fn can_finish(&self) -> bool {
        self.phase == Phase::Questions && self.session.as_ref().map_or(false, QuestionsSession::is_complete)
    }

    /// 标记测试结束并进入预约阶段
    pub async fn finish(&mut self) -> AppResult<()> {
        self.expect_phase("finish", |p| *p == Phase::Questions)?;
        if !self.can_finish() {
            return Err(FlowError::AnswersIncomplete.into());
        }

        self.finish_banner = None;
        let service = self.service.as_ref();
        let codigo = self.codigo.as_str();
        let result = self
            .policy
            .run("结束测试", move || service.finish_test(codigo))
            .await;

        if let Err(e) = result {
            warn!("⚠️ 无法结束测试: {}", e);
            self.finish_banner = Some(FINISH_FAILED_MESSAGE);
            return Err(e);
        }

        info!("✓ 测试已结束，进入面谈预约");
        self.phase = Phase::Scheduling;
        Ok(())
    }

    /// 读取可预约时段
    pub async fn load_slots(&mut self) -> AppResult<()> {
        self.expect_phase("load_slots", |p| *p == Phase::Scheduling)?;
        self.scheduler.load(self.service.as_ref(), &self.codigo).await;
        Ok(())
    }

    /// 预约所选时段，成功后进入 Scheduled
    pub async fn book_interview(&mut self) -> AppResult<Interview> {
        self.expect_phase("book_interview", |p| *p == Phase::Scheduling)?;
        let interview = self.scheduler.book(self.service.as_ref(), &self.codigo).await?;
        self.interview_booked(interview.clone());
        Ok(interview)
    }

    pub fn interview_booked(&mut self, interview: Interview) {
        self.interview = Some(interview);
        self.phase = Phase::Scheduled;
    }

    /// 结束访问，丢弃答题会话
    pub fn close(&mut self) {
        info!("👋 结束本次访问 (阶段: {})", self.phase);
        self.session = None;
        self.phase = Phase::Closed;
    }

    fn expect_phase(&self, action: &'static str, allowed: impl Fn(&Phase) -> bool) -> Result<(), AppError> {
        if allowed(&self.phase) {
            Ok(())
        } else {
            Err(FlowError::WrongPhase {
                action,
                phase: self.phase.to_string(),
            }
            .into())
        }
    }
}
