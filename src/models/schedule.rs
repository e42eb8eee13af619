//! 面谈排期相关的数据结构

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 服务端时间格式（`2024-06-03 10:20`）
pub const BLOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 可预约的时间段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub inicio: String,
    pub fin: String,
}

impl TimeBlock {
    /// 按钮上显示的时刻（空格后的部分）
    pub fn hour(&self) -> &str {
        self.inicio.split(' ').nth(1).unwrap_or(&self.inicio)
    }

    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.inicio, BLOCK_TIME_FORMAT).ok()
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.fin, BLOCK_TIME_FORMAT).ok()
    }

    /// 时段长度（分钟），无法解析时返回 None
    pub fn duration_minutes(&self) -> Option<i64> {
        Some((self.ends_at()? - self.starts_at()?).num_minutes())
    }
}

/// 某一天的可预约时段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableDay {
    /// 形如 `Lunes|3 de Junio`
    pub fecha: String,
    #[serde(default)]
    pub bloques: Vec<TimeBlock>,
}

impl AvailableDay {
    pub fn day_name(&self) -> &str {
        self.fecha.split('|').next().unwrap_or_default()
    }

    pub fn date_label(&self) -> &str {
        self.fecha.split('|').nth(1).unwrap_or_default()
    }
}

/// `GET /api/entrevistas/horarios-disponibles/` 的返回体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub dias: Vec<AvailableDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub fecha: String,
}

/// 已预约的面谈
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: i64,
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    #[serde(default)]
    pub mensaje: String,
    pub entrevista: Interview,
}
