//! 视口能力 - 基础设施层
//!
//! 导航器只做算术，测量和滚动交给 `Viewport`。

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::AppResult;
use crate::tracker::{ScrollCommand, ViewportMetrics};

/// 可测量、可滚动的视口
#[async_trait]
pub trait Viewport: Send + Sync {
    /// 当前的滚动与布局测量值
    async fn metrics(&self) -> AppResult<ViewportMetrics>;

    /// 执行一次程序化滚动
    async fn scroll_to(&self, command: ScrollCommand) -> AppResult<()>;
}

/// 模拟页面布局
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// 题目列表之前的内容（标题、说明）
    pub header_height: f64,
    /// 每张题目卡片的高度
    pub card_height: f64,
    /// 题目列表之后的内容
    pub footer_height: f64,
    pub viewport_height: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            header_height: 200.0,
            card_height: 320.0,
            footer_height: 400.0,
            viewport_height: 800.0,
        }
    }
}

/// 无浏览器时使用的视口，按固定布局计算
///
/// 滚动位置以 f64 位模式存放在原子变量中，可在多个任务间共享。
#[derive(Debug)]
pub struct SimulatedViewport {
    layout: PageLayout,
    question_count: usize,
    scroll_bits: AtomicU64,
}

impl SimulatedViewport {
    pub fn new(layout: PageLayout, question_count: usize) -> Self {
        Self {
            layout,
            question_count,
            scroll_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    pub fn document_height(&self) -> f64 {
        self.layout.header_height
            + self.layout.card_height * self.question_count as f64
            + self.layout.footer_height
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.layout.viewport_height).max(0.0)
    }

    pub fn scroll_y(&self) -> f64 {
        f64::from_bits(self.scroll_bits.load(Ordering::SeqCst))
    }

    /// 用户滚动：限制在可滚动范围内，返回实际位置
    pub fn set_scroll(&self, y: f64) -> f64 {
        let clamped = if y.is_finite() {
            y.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
        self.scroll_bits.store(clamped.to_bits(), Ordering::SeqCst);
        clamped
    }

    pub fn snapshot(&self) -> ViewportMetrics {
        ViewportMetrics {
            scroll_y: self.scroll_y(),
            viewport_height: self.layout.viewport_height,
            document_height: self.document_height(),
            offset_before: self.layout.header_height,
            offset_after: self.layout.footer_height,
        }
    }
}

#[async_trait]
impl Viewport for SimulatedViewport {
    async fn metrics(&self) -> AppResult<ViewportMetrics> {
        Ok(self.snapshot())
    }

    async fn scroll_to(&self, command: ScrollCommand) -> AppResult<()> {
        self.set_scroll(command.top);
        Ok(())
    }
}
