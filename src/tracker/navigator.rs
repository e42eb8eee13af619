//! 滚动同步导航
//!
//! 滚动位置与"当前聚焦题目"之间的双向换算。所有计算都基于一次测得的
//! `ViewportMetrics`，不访问浏览器，滚动事件里可以放心高频调用。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Question, QuestionId};

/// 视口测量值（像素）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportMetrics {
    /// 当前滚动位置
    pub scroll_y: f64,
    /// 可视区域高度
    pub viewport_height: f64,
    /// 文档总高度
    pub document_height: f64,
    /// 题目列表之前的内容高度
    pub offset_before: f64,
    /// 题目列表之后的内容高度（完成提示、底部留白）
    pub offset_after: f64,
}

impl ViewportMetrics {
    /// 最大滚动距离
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// 题目列表可分配的滚动区间
    pub fn question_range(&self) -> f64 {
        (self.max_scroll() - self.offset_before - self.offset_after).max(0.0)
    }

    /// 每道题分到的滚动高度；没有题目时按一段计算
    pub fn per_question_height(&self, question_count: usize) -> f64 {
        self.question_range() / question_count.max(1) as f64
    }
}

/// 自动滚动的目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// 滚动到第 n 道题
    Question(usize),
    /// 全部作答，滚动到底部
    End,
}

/// 需要视口执行的滚动
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub top: f64,
    pub smooth: bool,
}

/// 寻找下一道要聚焦的题目
///
/// 从刚作答的题目之后向前找第一道未答题；找不到则回到整体第一道未答题；
/// 全部作答时返回 `FocusTarget::End`。
pub fn find_next_question(
    questions: &[Question],
    answered: &BTreeSet<QuestionId>,
    current_id: QuestionId,
) -> FocusTarget {
    let mut past_current = false;
    let mut first_unanswered = None;

    for (index, question) in questions.iter().enumerate() {
        if !answered.contains(&question.id) {
            if first_unanswered.is_none() {
                first_unanswered = Some(index);
            }
            if past_current {
                return FocusTarget::Question(index);
            }
        }
        if question.id == current_id {
            past_current = true;
        }
    }

    first_unanswered.map_or(FocusTarget::End, FocusTarget::Question)
}

/// 滚动同步导航器
#[derive(Debug, Clone)]
pub struct Navigator {
    question_ids: Vec<QuestionId>,
    auto_scroll: bool,
    focused: Option<QuestionId>,
    /// 上一次换算过的滚动位置
    last_scroll_y: Option<f64>,
}

impl Navigator {
    /// 创建导航器，初始聚焦第一道题
    pub fn new(questions: &[Question], auto_scroll: bool) -> Self {
        let question_ids: Vec<QuestionId> = questions.iter().map(|q| q.id).collect();
        let focused = question_ids.first().copied();

        Self {
            question_ids,
            auto_scroll,
            focused,
            last_scroll_y: None,
        }
    }

    pub fn auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
    }

    pub fn focused(&self) -> Option<QuestionId> {
        self.focused
    }

    pub fn focused_index(&self) -> Option<usize> {
        let focused = self.focused?;
        self.question_ids.iter().position(|id| *id == focused)
    }

    pub fn is_focused(&self, question_id: QuestionId) -> bool {
        self.focused == Some(question_id)
    }

    /// 根据滚动位置计算聚焦题目的下标；没有题目时返回 None
    pub fn index_for_scroll(&self, metrics: &ViewportMetrics) -> Option<usize> {
        let count = self.question_ids.len();
        if count == 0 {
            return None;
        }

        let per_question = metrics.per_question_height(count);
        if per_question <= 0.0 {
            return Some(0);
        }

        let raw = ((metrics.scroll_y - metrics.offset_before) / per_question).floor();
        let clamped = raw.max(0.0).min((count - 1) as f64);
        Some(clamped as usize)
    }

    /// 第 index 道题对应的滚动位置（该题分段的中点）
    pub fn scroll_top_for_index(&self, index: usize, metrics: &ViewportMetrics) -> f64 {
        let per_question = metrics.per_question_height(self.question_ids.len());
        metrics.offset_before + (index as f64 + 0.5) * per_question
    }

    pub fn scroll_top_for(&self, target: FocusTarget, metrics: &ViewportMetrics) -> f64 {
        match target {
            FocusTarget::Question(index) => self.scroll_top_for_index(index, metrics),
            FocusTarget::End => metrics.max_scroll(),
        }
    }

    /// 滚动事件：把聚焦题目同步为滚动位置对应的题目
    ///
    /// 滚动位置没有变化时保留当前聚焦，点击选中的题目不会被覆盖。
    pub fn on_scroll(&mut self, metrics: &ViewportMetrics) -> Option<QuestionId> {
        if self.last_scroll_y == Some(metrics.scroll_y) {
            return self.focused;
        }
        self.last_scroll_y = Some(metrics.scroll_y);

        if let Some(index) = self.index_for_scroll(metrics) {
            self.focused = Some(self.question_ids[index]);
        }
        self.focused
    }

    /// 作答后的自动滚动。关闭自动滚动时不做任何事
    pub fn after_answer(
        &mut self,
        questions: &[Question],
        answered: &BTreeSet<QuestionId>,
        answered_id: QuestionId,
        metrics: &ViewportMetrics,
    ) -> Option<ScrollCommand> {
        if !self.auto_scroll {
            return None;
        }

        let target = find_next_question(questions, answered, answered_id);
        if let FocusTarget::Question(index) = target {
            self.focused = self.question_ids.get(index).copied();
        }

        Some(ScrollCommand {
            top: self.scroll_top_for(target, metrics),
            smooth: true,
        })
    }

    /// 点击题目卡片：直接聚焦该题；自动滚动模式下同时滚动过去
    pub fn click(&mut self, index: usize, metrics: &ViewportMetrics) -> Option<ScrollCommand> {
        let question_id = *self.question_ids.get(index)?;
        self.focused = Some(question_id);
        self.last_scroll_y = Some(metrics.scroll_y);

        self.auto_scroll.then(|| ScrollCommand {
            top: self.scroll_top_for_index(index, metrics),
            smooth: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(ids: &[QuestionId]) -> Vec<Question> {
        ids.iter().map(|id| Question::new(*id, format!("q{}", id))).collect()
    }

    fn answered(ids: &[QuestionId]) -> BTreeSet<QuestionId> {
        ids.iter().copied().collect()
    }

    fn metrics(scroll_y: f64) -> ViewportMetrics {
        ViewportMetrics {
            scroll_y,
            viewport_height: 800.0,
            document_height: 2800.0,
            offset_before: 100.0,
            offset_after: 500.0,
        }
    }

    #[test]
    fn test_next_question_scans_forward() {
        let qs = questions(&[1, 2, 3, 4]);
        assert_eq!(
            find_next_question(&qs, &answered(&[1, 3]), 1),
            FocusTarget::Question(1)
        );
        assert_eq!(
            find_next_question(&qs, &answered(&[1, 2, 3]), 2),
            FocusTarget::Question(3)
        );
    }

    #[test]
    fn test_next_question_wraps_around() {
        let qs = questions(&[1, 2, 3]);
        assert_eq!(
            find_next_question(&qs, &answered(&[2]), 3),
            FocusTarget::Question(0)
        );
    }

    #[test]
    fn test_next_question_end_sentinel() {
        let qs = questions(&[1, 2, 3, 4]);
        assert_eq!(
            find_next_question(&qs, &answered(&[1, 2, 3, 4]), 4),
            FocusTarget::End
        );
        assert_eq!(find_next_question(&[], &answered(&[]), 1), FocusTarget::End);
    }

    #[test]
    fn test_index_for_scroll_clamps() {
        let nav = Navigator::new(&questions(&[10, 20, 30, 40]), false);
        // 区间 = 2000 - 100 - 500 = 1400，每题 350
        assert_eq!(nav.index_for_scroll(&metrics(0.0)), Some(0));
        assert_eq!(nav.index_for_scroll(&metrics(100.0)), Some(0));
        assert_eq!(nav.index_for_scroll(&metrics(450.0)), Some(1));
        assert_eq!(nav.index_for_scroll(&metrics(1449.0)), Some(3));
        assert_eq!(nav.index_for_scroll(&metrics(5000.0)), Some(3));
    }

    #[test]
    fn test_zero_questions_does_not_divide_by_zero() {
        let mut nav = Navigator::new(&[], true);
        assert_eq!(nav.index_for_scroll(&metrics(300.0)), None);
        assert_eq!(nav.on_scroll(&metrics(300.0)), None);
        let top = nav.scroll_top_for_index(0, &metrics(0.0));
        assert!(top.is_finite());
    }

    #[test]
    fn test_degenerate_viewport_maps_to_first() {
        let nav = Navigator::new(&questions(&[1, 2]), true);
        let flat = ViewportMetrics {
            scroll_y: 50.0,
            viewport_height: 1000.0,
            document_height: 900.0,
            ..ViewportMetrics::default()
        };
        assert_eq!(nav.index_for_scroll(&flat), Some(0));
    }

    #[test]
    fn test_on_scroll_updates_focus() {
        let mut nav = Navigator::new(&questions(&[10, 20, 30, 40]), false);
        assert_eq!(nav.focused(), Some(10));
        assert_eq!(nav.on_scroll(&metrics(800.0)), Some(30));
        assert_eq!(nav.focused_index(), Some(2));
    }

    #[test]
    fn test_after_answer_scrolls_only_in_auto_mode() {
        let qs = questions(&[1, 2, 3, 4]);
        let mut nav = Navigator::new(&qs, false);
        assert_eq!(nav.after_answer(&qs, &answered(&[1]), 1, &metrics(0.0)), None);

        nav.set_auto_scroll(true);
        let cmd = nav
            .after_answer(&qs, &answered(&[1]), 1, &metrics(0.0))
            .unwrap();
        assert!(cmd.smooth);
        assert_eq!(nav.focused(), Some(2));
        assert_eq!(nav.index_for_scroll(&metrics(cmd.top)), Some(1));

        let cmd = nav
            .after_answer(&qs, &answered(&[1, 2, 3, 4]), 4, &metrics(0.0))
            .unwrap();
        assert_eq!(cmd.top, metrics(0.0).max_scroll());
    }

    #[test]
    fn test_click_focuses_in_both_modes() {
        let qs = questions(&[1, 2, 3]);
        let mut nav = Navigator::new(&qs, false);
        assert_eq!(nav.click(2, &metrics(0.0)), None);
        assert_eq!(nav.focused(), Some(3));

        nav.set_auto_scroll(true);
        let cmd = nav.click(1, &metrics(0.0)).unwrap();
        assert_eq!(nav.focused(), Some(2));
        assert_eq!(nav.index_for_scroll(&metrics(cmd.top)), Some(1));

        assert_eq!(nav.click(9, &metrics(0.0)), None);
        assert_eq!(nav.focused(), Some(2));
    }

    #[test]
    fn test_click_survives_unchanged_scroll() {
        let mut nav = Navigator::new(&questions(&[1, 2, 3, 4]), false);

        // 尚未收到滚动事件时点击
        nav.click(3, &metrics(0.0));
        assert_eq!(nav.on_scroll(&metrics(0.0)), Some(4));

        nav.click(2, &metrics(0.0));
        assert_eq!(nav.on_scroll(&metrics(0.0)), Some(3));
        assert_eq!(nav.on_scroll(&metrics(0.0)), Some(3));

        // 真正滚动后重新按位置换算
        assert_eq!(nav.on_scroll(&metrics(450.0)), Some(2));
    }
}
