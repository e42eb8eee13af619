use std::time::Duration;

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};

/// 连接到已开启调试端口的浏览器，并找到（或打开）问卷页面
///
/// 优先复用 URL 以 `target_url` 开头的标签页，找不到时新开一个并导航过去。
pub async fn connect_to_browser_and_page(port: u16, target_url: &str) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    for page in pages.iter() {
        if let Ok(Some(url)) = page.url().await {
            if url.starts_with(target_url) {
                info!("✓ 复用已打开的问卷页面: {}", url);
                return Ok((browser, page.clone()));
            }
        }
    }

    warn!("⚠️ 未找到问卷页面，新开标签页");
    let page = browser.new_page("about:blank").await?;
    page.goto(target_url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", target_url, e);
        AppError::from(e)
    })?;
    info!("已导航到: {}", target_url);

    Ok((browser, page))
}
