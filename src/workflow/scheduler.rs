//! 面谈预约 - 流程层

use tracing::{info, warn};

use crate::clients::TestService;
use crate::error::{AppResult, FlowError};
use crate::models::{AvailableDay, Interview, TimeBlock};

/// 还没有可显示的日期时的标题
pub const LOADING_HEADING: &str = "Cargando..";

/// 时段无法解析时显示的面谈时长（分钟）
pub const DEFAULT_INTERVIEW_MINUTES: i64 = 20;

/// 选中的时段：(日期下标, 时段下标)
type Selection = (usize, usize);

#[derive(Debug, Clone, Default)]
pub struct InterviewScheduler {
    days: Vec<AvailableDay>,
    current: usize,
    selected: Option<Selection>,
    notice: Option<String>,
}

impl InterviewScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取可预约时段。失败时列表保持为空并记录提示
    pub async fn load(&mut self, service: &dyn TestService, codigo: &str) {
        match service.available_slots(codigo).await {
            Ok(days) => {
                info!("📅 可预约日期: {} 天", days.len());
                self.days = days;
                self.current = 0;
                self.selected = None;
                self.notice = None;
            }
            Err(e) => {
                warn!("⚠️ 读取可预约时段失败: {}", e);
                self.days.clear();
                self.current = 0;
                self.selected = None;
                self.notice = Some(format!("Error cargando horarios disponibles: {}", e.user_message()));
            }
        }
    }

    pub fn days(&self) -> &[AvailableDay] {
        &self.days
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_day(&self) -> Option<&AvailableDay> {
        self.days.get(self.current)
    }

    /// 最近一次加载或预约失败的提示
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// 面谈时长，取当天第一个时段的长度
    pub fn interview_minutes(&self) -> i64 {
        self.current_day()
            .and_then(|day| day.bloques.first())
            .and_then(TimeBlock::duration_minutes)
            .unwrap_or(DEFAULT_INTERVIEW_MINUTES)
    }

    /// 标题：(星期, 日期)
    pub fn heading(&self) -> (&str, &str) {
        match self.current_day() {
            Some(day) if !day.day_name().is_empty() => (day.day_name(), day.date_label()),
            _ => (LOADING_HEADING, ""),
        }
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.days.len()
    }

    pub fn prev_day(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn next_day(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current += 1;
        true
    }

    /// 选中当天的第 block_index 个时段；下标越界时返回 false
    ///
    /// 换日不会清除选择，只有在所选日期上才会高亮。
    pub fn select(&mut self, block_index: usize) -> bool {
        let exists = self
            .current_day()
            .map_or(false, |day| block_index < day.bloques.len());
        if exists {
            self.selected = Some((self.current, block_index));
        }
        exists
    }

    pub fn selected(&self) -> Option<&TimeBlock> {
        let (day, block) = self.selected?;
        self.days.get(day)?.bloques.get(block)
    }

    /// 当天第 block_index 个时段是否为选中项
    pub fn is_selected(&self, block_index: usize) -> bool {
        self.selected == Some((self.current, block_index))
    }

    pub fn can_submit(&self) -> bool {
        self.selected().is_some()
    }

    /// 预约所选时段。未选择时直接返回错误，不发请求；
    /// 服务端失败时记录提示并保留选择
    pub async fn book(&mut self, service: &dyn TestService, codigo: &str) -> AppResult<Interview> {
        let fecha = self
            .selected()
            .map(|block| block.inicio.clone())
            .ok_or(FlowError::NoTimeSelected)?;

        match service.book_interview(codigo, &fecha).await {
            Ok(response) => {
                info!("✅ 面谈已预约: {}", response.entrevista.fecha_inicio);
                self.notice = None;
                Ok(response.entrevista)
            }
            Err(e) => {
                warn!("⚠️ 预约面谈失败: {}", e);
                self.notice = Some(format!("Error agendando entrevista: {}", e.user_message()));
                Err(e)
            }
        }
    }
}
