//! 终端命令解析

use std::str::FromStr;

use crate::models::AnswerCode;

/// 终端上可输入的命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// 重新显示当前画面
    Show,
    AcceptTerms(bool),
    Start,
    /// 第 index 道题（从 0 开始）作答
    Answer { index: usize, answer: AnswerCode },
    AutoScroll(bool),
    /// 点击第 index 道题的卡片（从 0 开始）
    Click(usize),
    /// 手动滚动；模拟视口时带目标位置，浏览器视口时只同步聚焦
    Scroll(Option<f64>),
    Retry,
    /// 等待进行中的提交全部返回
    Wait,
    Finish,
    NextDay,
    PrevDay,
    /// 选择当天第 index 个时段（从 0 开始）
    Pick(usize),
    Book,
    Close,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("未知命令: {0}")]
    Unknown(String),
    #[error("缺少参数: {0}")]
    MissingArgument(&'static str),
    #[error("无效参数: {0}")]
    InvalidArgument(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let head = parts
            .next()
            .map(str::to_lowercase)
            .ok_or(CommandError::MissingArgument("命令"))?;

        let command = match head.as_str() {
            "help" | "ayuda" | "?" => Command::Help,
            "show" | "ver" => Command::Show,
            "acepto" | "terms" => Command::AcceptTerms(parse_switch(parts.next()).unwrap_or(true)),
            "start" | "comenzar" => Command::Start,
            "r" | "responder" => {
                let index = parse_position(parts.next(), "题号")?;
                let answer = parts
                    .next()
                    .ok_or(CommandError::MissingArgument("选项"))?
                    .parse::<AnswerCode>()
                    .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
                Command::Answer { index, answer }
            }
            "auto" => {
                let raw = parts.next().ok_or(CommandError::MissingArgument("on/off"))?;
                Command::AutoScroll(
                    parse_switch(Some(raw)).ok_or_else(|| CommandError::InvalidArgument(raw.to_string()))?,
                )
            }
            "click" | "ir" => Command::Click(parse_position(parts.next(), "题号")?),
            "scroll" => match parts.next() {
                Some(raw) => Command::Scroll(Some(
                    raw.parse::<f64>()
                        .map_err(|_| CommandError::InvalidArgument(raw.to_string()))?,
                )),
                None => Command::Scroll(None),
            },
            "retry" | "reintentar" => Command::Retry,
            "wait" | "esperar" => Command::Wait,
            "finish" | "finalizar" => Command::Finish,
            "next" | ">" => Command::NextDay,
            "prev" | "<" => Command::PrevDay,
            "hora" | "pick" => Command::Pick(parse_position(parts.next(), "时段")?),
            "agendar" | "book" => Command::Book,
            "cerrar" | "close" | "terminar" => Command::Close,
            "quit" | "exit" | "salir" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

pub const HELP_TEXT: &str = "\
命令:
  acepto [on|off]      接受条款
  comenzar             开始测试
  r <n> <N|O|A|S>      第 n 题作答
  auto <on|off>        自动滚动
  ir <n>               聚焦第 n 题
  scroll [y]           滚动（模拟视口）/ 同步聚焦（浏览器）
  reintentar           重新提交失败的答案
  esperar              等待提交完成
  finalizar            结束答题
  < / >                前一天 / 后一天
  hora <n>             选择第 n 个时段
  agendar              预约面谈
  cerrar               结束访问
  salir                退出程序";

// ========== 辅助函数 ==========

/// 用户输入从 1 开始的序号
fn parse_position(raw: Option<&str>, name: &'static str) -> Result<usize, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument(name))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::InvalidArgument(raw.to_string())),
    }
}

fn parse_switch(raw: Option<&str>) -> Option<bool> {
    match raw?.to_lowercase().as_str() {
        "on" | "si" | "sí" | "true" | "1" => Some(true),
        "off" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
