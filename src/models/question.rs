use serde::{Deserialize, Serialize};

/// 题目 ID（服务端分配，稳定且唯一）
pub type QuestionId = i64;

/// 李克特量表题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "texto")]
    pub text: String,
}

impl Question {
    pub fn new(id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// `GET /api/tests/tests/` 的返回体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestDefinition {
    #[serde(rename = "preguntalikertnoas_set", default)]
    pub questions: Vec<Question>,
}
