//! 重试策略 - 业务能力层
//!
//! 固定间隔、有限次数的重试，和界面状态无关。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// 重试策略：首次请求失败后最多再试 `max_retries` 次，每次间隔 `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// 只请求一次
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// 包含首次请求在内的总次数
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 执行操作直到成功或次数用尽
    pub async fn run<T, E, F, Fut>(&self, label: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_counted(label, op).await.0
    }

    /// 同 `run`，并返回实际请求次数
    pub async fn run_counted<T, E, F, Fut>(&self, label: &str, mut op: F) -> (Result<T, E>, usize)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} 在第 {} 次尝试成功", label, attempt);
                    }
                    return (Ok(value), attempt);
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        "{} 失败 (尝试 {}/{}): {}，{}ms 后重试...",
                        label,
                        attempt,
                        max_attempts,
                        e,
                        self.delay.as_millis()
                    );
                    sleep(self.delay).await;
                }
                Err(e) => {
                    warn!("{} 失败，已尝试 {} 次: {}", label, attempt, e);
                    return (Err(e), attempt);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    /// 每次失败后等待 1 秒，最多再试 3 次
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
