//! 顺序批量下载，命令行与图形界面共用

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::downloader::{GalleryDl, GalleryDownloader};
use crate::naming::{derive_folder_name, FolderName};
use crate::title::{HttpTitleFetcher, TitleSource};

/// 单个链接的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemResult {
    Success { folder: String },
    Failed { error: String },
}

impl ItemResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemResult::Success { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// 处理过程中的状态事件，`index` 从 0 开始
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Analyzing {
        index: usize,
        url: String,
    },
    Downloading {
        index: usize,
        folder: FolderName,
        target_dir: PathBuf,
    },
    Finished {
        index: usize,
        url: String,
        result: ItemResult,
    },
    AllDone(BatchSummary),
}

pub struct BatchRunner<T, D> {
    titles: T,
    downloader: D,
}

impl BatchRunner<HttpTitleFetcher, GalleryDl> {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            HttpTitleFetcher::new(&settings.http),
            GalleryDl::new(&settings.downloader),
        )
    }
}

impl<T: TitleSource, D: GalleryDownloader> BatchRunner<T, D> {
    pub fn new(titles: T, downloader: D) -> Self {
        Self { titles, downloader }
    }

    /// 逐个处理链接；单个失败不会中断整个批次
    pub fn run(
        &self,
        urls: &[String],
        base_dir: &Path,
        mut on_event: impl FnMut(BatchEvent),
    ) -> BatchSummary {
        let mut summary = BatchSummary {
            total: urls.len(),
            succeeded: 0,
        };

        for (index, url) in urls.iter().enumerate() {
            on_event(BatchEvent::Analyzing {
                index,
                url: url.clone(),
            });

            let folder = derive_folder_name(&self.titles, url);
            let target_dir = base_dir.join(&folder.name);

            on_event(BatchEvent::Downloading {
                index,
                folder: folder.clone(),
                target_dir: target_dir.clone(),
            });

            let result = match self.downloader.download(url, &target_dir) {
                Ok(()) => {
                    summary.succeeded += 1;
                    ItemResult::Success { folder: folder.name }
                }
                Err(e) => ItemResult::Failed {
                    error: e.to_string(),
                },
            };

            on_event(BatchEvent::Finished {
                index,
                url: url.clone(),
                result,
            });
        }

        tracing::info!(
            succeeded = summary.succeeded,
            total = summary.total,
            "批量下载完成"
        );
        on_event(BatchEvent::AllDone(summary));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::DownloadError;
    use crate::naming::NameSource;
    use anyhow::Result;
    use std::cell::RefCell;

    struct TitleFromPath;

    impl TitleSource for TitleFromPath {
        fn page_title(&self, url: &str) -> Result<Option<String>> {
            Ok(url.contains("titled").then(|| "Titled: Set".to_string()))
        }
    }

    /// 链接含 "bad" 时失败，并记录调用
    #[derive(Default)]
    struct RecordingDownloader {
        calls: RefCell<Vec<(String, PathBuf)>>,
    }

    impl GalleryDownloader for RecordingDownloader {
        fn download(&self, url: &str, target_dir: &Path) -> Result<(), DownloadError> {
            self.calls
                .borrow_mut()
                .push((url.to_string(), target_dir.to_path_buf()));
            if url.contains("bad") {
                Err(DownloadError::ExitCode(1))
            } else {
                Ok(())
            }
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn runs_every_url_in_order() {
        let runner = BatchRunner::new(TitleFromPath, RecordingDownloader::default());
        let base = Path::new("/galleries");
        let input = urls(&[
            "https://x.example/titled",
            "https://x.example/bad/one",
            "https://x.example/g/two",
        ]);

        let summary = runner.run(&input, base, |_| {});

        assert_eq!(summary, BatchSummary { total: 3, succeeded: 2 });
        assert_eq!(summary.failed(), 1);
        let calls = runner.downloader.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                (input[0].clone(), base.join("Titled_ Set")),
                (input[1].clone(), base.join("one")),
                (input[2].clone(), base.join("two")),
            ]
        );
    }

    #[test]
    fn event_sequence() {
        let runner = BatchRunner::new(TitleFromPath, RecordingDownloader::default());
        let mut events = Vec::new();
        runner.run(&urls(&["https://x.example/bad"]), Path::new("out"), |e| events.push(e));

        assert_eq!(
            events,
            vec![
                BatchEvent::Analyzing {
                    index: 0,
                    url: "https://x.example/bad".into(),
                },
                BatchEvent::Downloading {
                    index: 0,
                    folder: FolderName {
                        name: "bad".into(),
                        source: NameSource::UrlPath,
                    },
                    target_dir: PathBuf::from("out/bad"),
                },
                BatchEvent::Finished {
                    index: 0,
                    url: "https://x.example/bad".into(),
                    result: ItemResult::Failed {
                        error: DownloadError::ExitCode(1).to_string(),
                    },
                },
                BatchEvent::AllDone(BatchSummary { total: 1, succeeded: 0 }),
            ]
        );
    }

    #[test]
    fn empty_batch_still_reports_done() {
        let runner = BatchRunner::new(TitleFromPath, RecordingDownloader::default());
        let mut events = Vec::new();
        let summary = runner.run(&[], Path::new("out"), |e| events.push(e));
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(events, vec![BatchEvent::AllDone(BatchSummary::default())]);
    }
}
