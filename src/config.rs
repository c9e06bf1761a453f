use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 获取页面标题时使用的浏览器 UA
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 网络请求配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// 外部下载工具配置
///
/// `args` 放在固定参数之前，例如 `program = "python3"`, `args = ["-m", "gallery_dl"]`。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: "gallery-dl".to_string(),
            args: Vec::new(),
        }
    }
}

/// 全局设置：内置默认值 < 配置文件 < 命令行参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub download_dir: PathBuf,
    pub http: HttpConfig,
    pub downloader: DownloaderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            http: HttpConfig::default(),
            downloader: DownloaderConfig::default(),
        }
    }
}

impl Settings {
    /// 下载目录的绝对路径（相对路径以当前工作目录为基准）
    pub fn absolute_download_dir(&self) -> PathBuf {
        if self.download_dir.is_absolute() {
            return self.download_dir.clone();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&self.download_dir))
            .unwrap_or_else(|_| self.download_dir.clone())
    }
}

/// 读取 TOML 配置文件；未指定路径时使用默认值。配置文件只读不写。
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let data = fs::read_to_string(path)
        .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
    let settings: Settings = toml::from_str(&data)
        .with_context(|| format!("配置文件格式错误 {}", path.display()))?;
    anyhow::ensure!(
        settings.http.timeout_secs > 0,
        "配置文件 {} 中 timeout_secs 必须大于 0",
        path.display()
    );

    tracing::debug!(path = %path.display(), "已加载配置文件");
    Ok(settings)
}
