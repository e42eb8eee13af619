use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 频率量表的答案代码（N/O/A/S）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerCode {
    /// 很少或从不
    #[serde(rename = "N")]
    Never,
    /// 偶尔
    #[serde(rename = "O")]
    Occasionally,
    /// 经常
    #[serde(rename = "A")]
    Often,
    /// 总是或几乎总是
    #[serde(rename = "S")]
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知的答案代码: '{0}'（可选 N/O/A/S）")]
pub struct UnknownAnswerCode(pub String);

impl AnswerCode {
    /// 按界面显示顺序排列的全部选项
    pub const ALL: [AnswerCode; 4] = [
        AnswerCode::Never,
        AnswerCode::Occasionally,
        AnswerCode::Often,
        AnswerCode::Always,
    ];

    /// 提交给服务端的单字母代码
    pub fn code(self) -> &'static str {
        match self {
            AnswerCode::Never => "N",
            AnswerCode::Occasionally => "O",
            AnswerCode::Often => "A",
            AnswerCode::Always => "S",
        }
    }

    /// 展示给受访者的文字
    pub fn label(self) -> &'static str {
        match self {
            AnswerCode::Never => "Rara vez o nunca",
            AnswerCode::Occasionally => "Ocasionalmente",
            AnswerCode::Often => "A menudo",
            AnswerCode::Always => "Siempre o casi siempre",
        }
    }
}

impl FromStr for AnswerCode {
    type Err = UnknownAnswerCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(AnswerCode::Never),
            "O" => Ok(AnswerCode::Occasionally),
            "A" => Ok(AnswerCode::Often),
            "S" => Ok(AnswerCode::Always),
            _ => Err(UnknownAnswerCode(s.to_string())),
        }
    }
}

impl fmt::Display for AnswerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
