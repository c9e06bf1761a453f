//! 调用外部 gallery-dl 进行下载

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::config::DownloaderConfig;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("无法创建目录 {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("未找到下载工具 `{program}`，请先安装: pip install gallery-dl")]
    NotFound { program: String },

    #[error("无法启动下载工具 `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("gallery-dl 执行失败，退出码 {0}")]
    ExitCode(i32),

    #[error("gallery-dl 被信号终止")]
    Terminated,
}

/// 下载器接口，批处理只依赖这个 trait
pub trait GalleryDownloader {
    /// 把 `url` 的图集下载到 `target_dir`（目录不存在时自动创建）
    fn download(&self, url: &str, target_dir: &Path) -> Result<(), DownloadError>;
}

/// gallery-dl 子进程封装
#[derive(Debug, Clone)]
pub struct GalleryDl {
    program: String,
    args: Vec<String>,
}

impl GalleryDl {
    pub fn new(config: &DownloaderConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// 构建命令：`<program> [args..] -f /O -D <target_dir> <url>`
    ///
    /// `-f /O` 尽量保留原始文件名，`-D` 指定确切的目标目录。
    pub fn command(&self, url: &str, target_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(["-f", "/O", "-D"])
            .arg(target_dir)
            .arg(url);
        cmd
    }
}

impl GalleryDownloader for GalleryDl {
    fn download(&self, url: &str, target_dir: &Path) -> Result<(), DownloadError> {
        std::fs::create_dir_all(target_dir).map_err(|source| DownloadError::CreateDir {
            path: target_dir.to_path_buf(),
            source,
        })?;

        tracing::info!(url, target = %target_dir.display(), "开始下载");

        // 子进程继承 stdout/stderr，直接显示 gallery-dl 自身的进度
        let status = self.command(url, target_dir).status().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DownloadError::NotFound {
                    program: self.program.clone(),
                }
            } else {
                DownloadError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            }
        })?;

        if status.success() {
            return Ok(());
        }

        let err = match status.code() {
            Some(code) => DownloadError::ExitCode(code),
            None => DownloadError::Terminated,
        };
        tracing::warn!(url, "{err}");
        Err(err)
    }
}
