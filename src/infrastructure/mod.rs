//! 基础设施层
//!
//! 持有稀缺资源（浏览器页面），只暴露能力。

pub mod browser_viewport;
pub mod js_executor;
pub mod viewport;

pub use browser_viewport::BrowserViewport;
pub use js_executor::JsExecutor;
pub use viewport::{PageLayout, SimulatedViewport, Viewport};
