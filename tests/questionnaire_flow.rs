mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FakeService;
use impulse_test_client::error::FlowError;
use impulse_test_client::infrastructure::{PageLayout, SimulatedViewport};
use impulse_test_client::workflow::scheduler::LOADING_HEADING;
use impulse_test_client::workflow::test_flow::{FINISH_FAILED_MESSAGE, START_FAILED_MESSAGE};
use impulse_test_client::{
    AnswerCode, AppError, CompletionStatus, Phase, RetryPolicy, SubmissionState, TestFlow,
};

fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1000))
}

fn flow_with(service: Arc<FakeService>, auto_scroll: bool) -> TestFlow {
    TestFlow::new(service, "ABC123", policy(), auto_scroll)
}

fn viewport(n: usize) -> Arc<SimulatedViewport> {
    Arc::new(SimulatedViewport::new(PageLayout::default(), n))
}

/// 加载并开始，返回处于答题阶段的流程
async fn started(service: Arc<FakeService>, auto_scroll: bool) -> (TestFlow, Arc<SimulatedViewport>) {
    let n = service.questions.len();
    let mut flow = flow_with(service, auto_scroll);
    flow.load().await.unwrap();
    flow.set_terms_accepted(true);
    let vp = viewport(n);
    flow.start(vp.clone()).await.unwrap();
    (flow, vp)
}

#[tokio::test(start_paused = true)]
async fn test_full_happy_path() {
    let service = Arc::new(FakeService::with_questions(3));
    let mut flow = flow_with(service.clone(), true);
    assert_eq!(flow.phase(), &Phase::Loading);
    assert!(flow.shows_logo());

    flow.load().await.unwrap();
    assert_eq!(flow.phase(), &Phase::Intro);
    assert_eq!(flow.questions().len(), 3);
    assert!(!flow.can_start());

    // 未接受条款不能开始，也不会发请求
    let err = flow.start(viewport(3)).await.unwrap_err();
    assert!(matches!(err, AppError::Flow(FlowError::TermsNotAccepted)));
    assert_eq!(*service.started.lock().unwrap(), 0);

    flow.set_terms_accepted(true);
    assert!(flow.can_start());
    flow.start(viewport(3)).await.unwrap();
    assert_eq!(flow.phase(), &Phase::Questions);
    assert!(!flow.shows_logo());

    let session = flow.session_mut().unwrap();
    session.record_answer(1, AnswerCode::Never).await.unwrap();
    session.record_answer(2, AnswerCode::Often).await.unwrap();
    session.record_answer(3, AnswerCode::Always).await.unwrap();
    session.wait_idle().await;
    assert_eq!(session.completion(), CompletionStatus::Complete);
    assert_eq!(service.saved.lock().unwrap().get(&2), Some(&AnswerCode::Often));

    assert!(flow.can_finish());
    flow.finish().await.unwrap();
    assert_eq!(flow.phase(), &Phase::Scheduling);

    flow.load_slots().await.unwrap();
    assert_eq!(flow.scheduler().heading(), ("Lunes", "3 de Junio"));
    assert!(!flow.scheduler().can_submit());

    let err = flow.book_interview().await.unwrap_err();
    assert!(matches!(err, AppError::Flow(FlowError::NoTimeSelected)));
    assert!(service.booked.lock().unwrap().is_empty());

    assert!(flow.scheduler_mut().next_day());
    assert!(flow.scheduler_mut().select(1));
    let interview = flow.book_interview().await.unwrap();

    assert_eq!(interview.id, 42);
    assert_eq!(
        service.booked.lock().unwrap().as_slice(),
        ["2024-06-04 09:20".to_string()]
    );
    assert_eq!(flow.phase(), &Phase::Scheduled);
    assert!(flow.shows_logo());
}

#[tokio::test]
async fn test_load_failure_shows_server_message() {
    let service = Arc::new(FakeService {
        load_error: Some("No parece que tengas acceso a un test.".to_string()),
        ..FakeService::default()
    });
    let mut flow = flow_with(service, true);

    assert!(flow.load().await.is_err());
    assert_eq!(
        flow.phase(),
        &Phase::LoadFailed {
            message: "No parece que tengas acceso a un test.".to_string()
        }
    );
    assert!(flow.shows_logo());
}

#[tokio::test(start_paused = true)]
async fn test_start_retries_then_shows_banner() {
    let service = Arc::new(FakeService {
        start_failures: 2.into(),
        ..FakeService::with_questions(2)
    });
    let mut flow = flow_with(service.clone(), true);
    flow.load().await.unwrap();
    flow.set_terms_accepted(true);
    flow.start(viewport(2)).await.unwrap();
    assert_eq!(*service.started.lock().unwrap(), 3);
    assert_eq!(flow.start_banner(), None);

    let service = Arc::new(FakeService {
        start_failures: 100.into(),
        ..FakeService::with_questions(2)
    });
    let mut flow = flow_with(service.clone(), true);
    flow.load().await.unwrap();
    flow.set_terms_accepted(true);
    assert!(flow.start(viewport(2)).await.is_err());
    assert_eq!(*service.started.lock().unwrap(), 4);
    assert_eq!(flow.start_banner(), Some(START_FAILED_MESSAGE));
    assert_eq!(flow.phase(), &Phase::Intro);
}

#[tokio::test(start_paused = true)]
async fn test_finish_requires_all_saved_and_recovers() {
    let service = Arc::new(FakeService {
        finish_failures: 4.into(),
        ..FakeService::with_questions(2)
    });
    let (mut flow, _) = started(service.clone(), false).await;

    flow.session_mut()
        .unwrap()
        .record_answer(1, AnswerCode::Never)
        .await
        .unwrap();
    let err = flow.finish().await.unwrap_err();
    assert!(matches!(err, AppError::Flow(FlowError::AnswersIncomplete)));
    assert_eq!(*service.finished.lock().unwrap(), 0);

    let session = flow.session_mut().unwrap();
    session.record_answer(2, AnswerCode::Never).await.unwrap();
    session.wait_idle().await;

    // 第一轮四次全部失败
    assert!(flow.finish().await.is_err());
    assert_eq!(flow.finish_banner(), Some(FINISH_FAILED_MESSAGE));
    assert_eq!(flow.phase(), &Phase::Questions);

    flow.finish().await.unwrap();
    assert_eq!(flow.finish_banner(), None);
    assert_eq!(flow.phase(), &Phase::Scheduling);
    assert_eq!(*service.finished.lock().unwrap(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_failed_answer_is_retried_in_bulk() {
    let service = Arc::new(FakeService::with_questions(4));
    service.fail_answer(2);
    service.fail_answer(4);
    let (mut flow, _) = started(service.clone(), true).await;
    let session = flow.session_mut().unwrap();

    for id in 1..=4 {
        session.record_answer(id, AnswerCode::Occasionally).await.unwrap();
    }
    session.wait_idle().await;

    // 传输层已经各自重试 3 次
    assert_eq!(service.calls_for(2), 4);
    assert_eq!(session.state(2), SubmissionState::Errored);
    assert_eq!(session.state(4), SubmissionState::Errored);
    assert!(session.all_answered());
    assert!(session.has_unresolved_errors());
    assert_eq!(session.completion(), CompletionStatus::NeedsRetry);

    service.heal_answer(2);
    service.heal_answer(4);
    assert_eq!(session.retry_all(), 2);
    assert!(session.retrying());
    assert_eq!(session.state(2), SubmissionState::Pending);
    assert_eq!(session.state(1), SubmissionState::Settled);

    // 重试期间答案锁定
    let err = session.record_answer(1, AnswerCode::Always).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Flow(FlowError::AnswerLocked { question_id: 1 })
    ));

    session.wait_idle().await;
    assert!(!session.retrying());
    assert_eq!(session.completion(), CompletionStatus::Complete);
    assert_eq!(session.retry_all(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_retrying_stays_set_until_last_result() {
    let mut service = FakeService::with_questions(3);
    service.delays.insert(3, Duration::from_millis(3000));
    let service = Arc::new(service);
    service.fail_answer(1);
    service.fail_answer(3);
    let (mut flow, _) = started(service.clone(), false).await;
    let session = flow.session_mut().unwrap();

    for id in 1..=3 {
        session.record_answer(id, AnswerCode::Often).await.unwrap();
    }
    session.wait_idle().await;

    service.heal_answer(1);
    assert_eq!(session.retry_all(), 2);

    // 题目 1 立即返回成功，题目 3 仍在失败重试中
    let first = session.next_result().await.unwrap();
    assert_eq!(first.question_id, 1);
    assert!(session.retrying());
    assert_eq!(session.completion(), CompletionStatus::Saving);

    let second = session.next_result().await.unwrap();
    assert_eq!(second.question_id, 3);
    assert_eq!(second.state, SubmissionState::Errored);
    assert!(!session.retrying());
    assert_eq!(session.completion(), CompletionStatus::NeedsRetry);
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_results_apply_to_their_question() {
    let mut service = FakeService::with_questions(3);
    service.delays.insert(1, Duration::from_millis(500));
    let service = Arc::new(service);
    service.fail_answer(2);
    let (mut flow, _) = started(service.clone(), false).await;
    let session = flow.session_mut().unwrap();

    session.record_answer(1, AnswerCode::Never).await.unwrap();
    session.record_answer(3, AnswerCode::Always).await.unwrap();

    let first = session.next_result().await.unwrap();
    assert_eq!(first.question_id, 3);
    assert_eq!(session.state(3), SubmissionState::Settled);
    assert_eq!(session.state(1), SubmissionState::Pending);

    let second = session.next_result().await.unwrap();
    assert_eq!(second.question_id, 1);
    assert_eq!(session.state(1), SubmissionState::Settled);
    assert_eq!(session.state(2), SubmissionState::Unsent);
}

#[tokio::test(start_paused = true)]
async fn test_completion_reached_once_and_stable_under_scroll() {
    let service = Arc::new(FakeService::with_questions(4));
    let (mut flow, vp) = started(service, true).await;
    let session = flow.session_mut().unwrap();

    for id in 1..=4 {
        session.record_answer(id, AnswerCode::Often).await.unwrap();
    }
    let updates = session.wait_idle().await;
    assert_eq!(updates.iter().filter(|u| u.completed).count(), 1);

    // 全部作答后自动滚动到底部
    assert_eq!(vp.scroll_y(), vp.max_scroll());

    for y in [0.0, 250.0, 900.0, 10_000.0] {
        vp.set_scroll(y);
        session.on_scroll().await.unwrap();
        assert_eq!(session.completion(), CompletionStatus::Complete);
        assert!(session.drain_results().is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn test_manual_mode_tracks_scroll_position() {
    let service = Arc::new(FakeService::with_questions(5));
    let (mut flow, vp) = started(service, false).await;
    let session = flow.session_mut().unwrap();
    assert_eq!(session.focused(), Some(1));

    session.record_answer(1, AnswerCode::Never).await.unwrap();
    // 手动模式下作答不移动聚焦
    assert_eq!(session.focused(), Some(1));
    assert_eq!(vp.scroll_y(), 0.0);

    // 5 题：文档 2200，最大滚动 1400，区间 800，每题 160
    vp.set_scroll(200.0 + 160.0 * 3.0 + 10.0);
    assert_eq!(session.on_scroll().await.unwrap(), Some(4));
    assert_eq!(session.focused_index(), Some(3));

    assert_eq!(session.click_question(0).await.unwrap(), Some(1));
    assert_eq!(vp.scroll_y(), 690.0);
}

#[tokio::test(start_paused = true)]
async fn test_manual_click_survives_idle_scroll_sync() {
    let service = Arc::new(FakeService::with_questions(5));
    let (mut flow, vp) = started(service, false).await;
    let session = flow.session_mut().unwrap();

    assert_eq!(session.click_question(3).await.unwrap(), Some(4));
    assert_eq!(vp.scroll_y(), 0.0);

    // 页面没有移动，定时同步不应改变聚焦
    for _ in 0..3 {
        assert_eq!(session.on_scroll().await.unwrap(), Some(4));
    }
    assert_eq!(session.focused_index(), Some(3));

    vp.set_scroll(200.0 + 160.0 + 10.0);
    assert_eq!(session.on_scroll().await.unwrap(), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_close_drops_session() {
    let service = Arc::new(FakeService::with_questions(2));
    let (mut flow, _) = started(service, true).await;
    flow.session_mut()
        .unwrap()
        .record_answer(1, AnswerCode::Never)
        .await
        .unwrap();

    flow.close();
    assert_eq!(flow.phase(), &Phase::Closed);
    assert!(flow.session().is_none());
    assert!(flow.shows_logo());

    // 被丢弃会话的任务仍会结束
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_failures_keep_it_usable() {
    let service = Arc::new(FakeService {
        slots_fail: true,
        ..FakeService::with_questions(1)
    });
    let (mut flow, _) = started(service, false).await;
    let session = flow.session_mut().unwrap();
    session.record_answer(1, AnswerCode::Never).await.unwrap();
    session.wait_idle().await;
    flow.finish().await.unwrap();

    flow.load_slots().await.unwrap();
    assert!(flow.scheduler().days().is_empty());
    assert_eq!(flow.scheduler().heading(), (LOADING_HEADING, ""));
    assert!(flow.scheduler().notice().is_some());

    let service = Arc::new(FakeService {
        booking_fail: true,
        ..FakeService::with_questions(1)
    });
    let (mut flow, _) = started(service, false).await;
    let session = flow.session_mut().unwrap();
    session.record_answer(1, AnswerCode::Never).await.unwrap();
    session.wait_idle().await;
    flow.finish().await.unwrap();
    flow.load_slots().await.unwrap();

    flow.scheduler_mut().select(0);
    assert!(flow.book_interview().await.is_err());
    assert_eq!(flow.phase(), &Phase::Scheduling);
    assert!(flow.scheduler().can_submit());
    assert!(flow
        .scheduler()
        .notice()
        .unwrap()
        .contains("El horario ya no está disponible"));
}

#[tokio::test]
async fn test_actions_in_wrong_phase_are_rejected() {
    let service = Arc::new(FakeService::with_questions(1));
    let mut flow = flow_with(service, true);

    let err = flow.finish().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Flow(FlowError::WrongPhase { action: "finish", .. })
    ));
    assert!(flow.book_interview().await.is_err());
}
