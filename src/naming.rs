//! 文件夹命名：页面标题优先，其次链接路径

use url::Url;

use crate::title::TitleSource;

/// 无可用名称时的兜底名
pub const FALLBACK_NAME: &str = "gallery";
/// 文件夹名最大字符数（Windows 单级路径上限为 255）
pub const MAX_NAME_CHARS: usize = 200;

const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// 名称来源；`Title` 保留清理前的原始标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    Title(String),
    UrlPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderName {
    pub name: String,
    pub source: NameSource,
}

fn trim_name(name: &str) -> &str {
    name.trim_matches(|c| c == ' ' || c == '.')
}

/// 生成在 Windows / Linux 上都合法的文件夹名
///
/// - 保留字符 `< > : " / \ | ? *` 替换为 `_`
/// - 去除控制字符
/// - 去掉首尾空格和点
/// - 超过 [`MAX_NAME_CHARS`] 时截断
pub fn sanitize_folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .filter(|&c| u32::from(c) >= 32)
        .collect();

    let trimmed = trim_name(&cleaned);
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    if trimmed.chars().count() <= MAX_NAME_CHARS {
        return trimmed.to_string();
    }

    let truncated: String = trimmed.chars().take(MAX_NAME_CHARS).collect();
    match trim_name(&truncated) {
        "" => FALLBACK_NAME.to_string(),
        name => name.to_string(),
    }
}

/// 从链接推导名称：最后一个非空路径段 > 域名 > `gallery`（未清理）
pub fn folder_name_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_NAME.to_string();
    };

    let last_segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    if let Some(segment) = last_segment {
        return urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string());
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => host.replace('.', "_"),
        _ => FALLBACK_NAME.to_string(),
    }
}

/// 确定文件夹名，优先使用页面标题
pub fn derive_folder_name(source: &dyn TitleSource, url: &str) -> FolderName {
    let title = match source.page_title(url) {
        Ok(title) => title,
        Err(e) => {
            tracing::warn!(url, "无法获取页面标题: {e:#}");
            None
        }
    };

    let folder = match title {
        Some(title) => {
            tracing::info!(url, title = %title, "找到页面标题");
            FolderName {
                name: sanitize_folder_name(&title),
                source: NameSource::Title(title),
            }
        }
        None => {
            tracing::info!(url, "未找到标题，使用链接路径");
            FolderName {
                name: sanitize_folder_name(&folder_name_from_url(url)),
                source: NameSource::UrlPath,
            }
        }
    };

    tracing::debug!(url, folder = %folder.name, "文件夹名");
    folder
}
