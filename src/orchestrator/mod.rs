//! 编排层（Orchestration Layer）
//!
//! 管理应用生命周期：初始化日志、API 客户端和浏览器资源，
//! 再把终端输入翻译成流程层的操作。
//!
//! ```text
//! App (终端循环, 资源)
//!     ↓
//! workflow::TestFlow / QuestionsSession
//!     ↓
//! tracker (纯状态) + services (提交、重试)
//!     ↓
//! clients / infrastructure
//! ```

pub mod app;
pub mod command;

pub use app::App;
pub use command::{Command, CommandError};
