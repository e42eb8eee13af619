//! 浏览器视口 - 基础设施层
//!
//! 通过 `JsExecutor` 在真实页面上测量滚动位置、执行 `window.scrollTo`。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::{JsExecutor, Viewport};
use crate::tracker::{ScrollCommand, ViewportMetrics};

/// 默认的题目列表选择器
///
/// 问卷页面需要在题目列表容器上带 `data-preguntas` 属性，否则通过
/// `Config::question_list_selector` 指定。找不到容器时列表前后的高度记为 0，
/// 滚动区间按整篇文档均分。
pub const DEFAULT_LIST_SELECTOR: &str = "[data-preguntas]";

pub struct BrowserViewport {
    executor: Arc<JsExecutor>,
    list_selector: String,
}

impl BrowserViewport {
    pub fn new(executor: Arc<JsExecutor>) -> Self {
        Self::with_selector(executor, DEFAULT_LIST_SELECTOR)
    }

    pub fn with_selector(executor: Arc<JsExecutor>, list_selector: impl Into<String>) -> Self {
        Self {
            executor,
            list_selector: list_selector.into(),
        }
    }
}

#[async_trait]
impl Viewport for BrowserViewport {
    async fn metrics(&self) -> AppResult<ViewportMetrics> {
        self.executor.eval_as(metrics_script(&self.list_selector)).await
    }

    async fn scroll_to(&self, command: ScrollCommand) -> AppResult<()> {
        debug!("页面滚动到 {:.0}px", command.top);
        self.executor.eval(scroll_script(command)).await?;
        Ok(())
    }
}

fn metrics_script(list_selector: &str) -> String {
    let selector = serde_json::Value::String(list_selector.to_string());
    format!(
        r#"(() => {{
            const doc = document.documentElement;
            const documentHeight = Math.max(doc.scrollHeight, document.body ? document.body.scrollHeight : 0);
            const list = document.querySelector({selector});
            let before = 0;
            let after = 0;
            if (list) {{
                const rect = list.getBoundingClientRect();
                before = rect.top + window.scrollY;
                after = Math.max(documentHeight - (rect.bottom + window.scrollY), 0);
            }}
            return {{
                scroll_y: window.scrollY,
                viewport_height: window.innerHeight,
                document_height: documentHeight,
                offset_before: before,
                offset_after: after
            }};
        }})()"#,
        selector = selector
    )
}

fn scroll_script(command: ScrollCommand) -> String {
    let behavior = if command.smooth { "smooth" } else { "auto" };
    format!(
        "window.scrollTo({{ top: {}, behavior: '{}' }}); true",
        command.top, behavior
    )
}
