//! 链接列表解析

use url::Url;

/// 解析结果：有效链接与被跳过的输入
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedUrls {
    pub urls: Vec<String>,
    pub skipped: Vec<String>,
}

/// 按空白字符（空格、换行）切分输入，保留顺序
pub fn parse_urls(text: &str) -> ParsedUrls {
    let mut parsed = ParsedUrls::default();

    for token in text.split_whitespace() {
        if is_valid_url(token) {
            parsed.urls.push(token.to_string());
        } else {
            tracing::warn!(input = token, "跳过无效链接");
            parsed.skipped.push(token.to_string());
        }
    }

    parsed
}

/// 只接受带主机名的 http / https 链接
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}
