//! 答题核心状态机
//!
//! - `answer_tracker` - 答案与提交状态
//! - `navigator` - 滚动位置与聚焦题目的换算
//! - `retry_coordinator` - 失败答案的批量重试

pub mod answer_tracker;
pub mod navigator;
pub mod retry_coordinator;

pub use answer_tracker::{AnswerTracker, CompletionStatus};
pub use navigator::{find_next_question, FocusTarget, Navigator, ScrollCommand, ViewportMetrics};
pub use retry_coordinator::RetryCoordinator;
