/// 日志工具模块
///
/// 会话日志文件和启动、结束时的横幅输出
use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::tracker::AnswerTracker;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 初始化会话日志文件（覆盖旧文件）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `codigo`: 受访者的测试码
pub fn init_log_file(log_file_path: &str, codigo: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n问卷会话日志 - {} - codigo {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format(TIME_FORMAT),
        codigo,
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| log_file_error(log_file_path, e))
}

/// 向会话日志追加一行，带时间戳
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| log_file_error(log_file_path, e))?;
    writeln!(file, "[{}] {}", chrono::Local::now().format(TIME_FORMAT), line)
        .map_err(|e| log_file_error(log_file_path, e))
}

fn log_file_error(path: &str, e: std::io::Error) -> AppError {
    AppError::Other(format!("写入日志文件 {} 失败: {}", path, e))
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 冲动控制问卷客户端");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!("🔁 提交重试: 最多 {} 次, 间隔 {}ms", config.submit_max_retries, config.submit_retry_delay_ms);
    match config.browser_debug_port {
        Some(port) => info!("🖥️ 浏览器视口: 调试端口 {}", port),
        None => info!("🖥️ 模拟视口（未配置浏览器调试端口）"),
    }
    info!("{}", "=".repeat(60));
}

/// 打印答题统计
pub fn print_session_stats(tracker: &AnswerTracker, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 答题统计");
    info!("完成时间: {}", chrono::Local::now().format(TIME_FORMAT));
    info!("{}", "=".repeat(60));
    info!("📝 已作答: {}/{}", tracker.answered_count(), tracker.len());
    info!("✅ 已保存: {}", tracker.settled_count());
    info!("⏳ 提交中: {}", tracker.pending_count());
    info!("❌ 保存失败: {}", tracker.errored_count());
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
