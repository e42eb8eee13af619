//! # Impulse Test Client
//!
//! "Control de impulsos" 在线问卷的客户端：介绍与条款、李克特量表答题、
//! 面谈预约。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `Viewport` - 测量与滚动；`BrowserViewport` 走真实页面，`SimulatedViewport` 按固定布局计算
//! - `clients/` - `TestService` 抽象与基于 reqwest 的 `TestApiClient`
//!
//! ### ② 核心状态（Tracker）
//! - `AnswerTracker` - 每道题的答案与提交状态
//! - `Navigator` - 滚动位置与聚焦题目的双向换算
//! - `RetryCoordinator` - 失败答案的批量重试
//!
//! ### ③ 业务能力层（Services）
//! - `RetryPolicy` - 有限次数、固定间隔的传输层重试
//! - `AnswerSubmitter` - 保存一道题的答案
//!
//! ### ④ 流程层（Workflow）
//! - `QuestionsSession` - 组装核心状态，后台提交并回写结果
//! - `TestFlow` - 页面阶段：加载 → 介绍 → 答题 → 预约 → 完成
//! - `InterviewScheduler` - 面谈时段的浏览与预约
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/app` - 管理资源，把终端命令翻译成流程操作

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod tracker;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use clients::{TestApiClient, TestService};
pub use config::Config;
pub use error::{AppError, AppResult, FlowError};
pub use infrastructure::{BrowserViewport, JsExecutor, PageLayout, SimulatedViewport, Viewport};
pub use models::{AnswerCode, Question, QuestionId, SubmissionState};
pub use orchestrator::App;
pub use services::{AnswerSubmitter, RetryPolicy};
pub use tracker::{AnswerTracker, CompletionStatus, FocusTarget, Navigator, RetryCoordinator, ViewportMetrics};
pub use workflow::{InterviewScheduler, Phase, QuestionsSession, TestFlow};
