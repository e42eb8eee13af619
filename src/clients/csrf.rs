//! CSRF 令牌提取
//!
//! 服务端把令牌写在 `csrftoken` Cookie 中，所有修改状态的请求都要通过
//! `X-CSRFToken` 头带回去。

pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// 从 `document.cookie` 形式的字符串中取出 csrftoken（已解码）
pub fn token_from_cookie(cookie: &str) -> Option<String> {
    let prefix = format!("{}=", CSRF_COOKIE_NAME);

    cookie
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(decode_component)
}

/// 等价于 JS 的 decodeURIComponent：`+` 保持原样
fn decode_component(raw: &str) -> String {
    // form_urlencoded 会把 '+' 当作空格，并按 '&' '=' 切分，先转义掉
    let escaped = raw
        .replace('+', "%2B")
        .replace('&', "%26")
        .replace('=', "%3D");

    url::form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}
