use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::batch::{BatchEvent, BatchRunner, BatchSummary, ItemResult};
use crate::config::Settings;
use crate::icons::{icon, icon_text};
use crate::urls::parse_urls;

const PRIMARY: egui::Color32 = egui::Color32::from_rgb(19, 78, 74);
const TEXT_DARK: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);
const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(107, 114, 128);
const SUCCESS: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const FAILURE: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);

#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemStatus {
    Queued,
    Analyzing,
    Downloading(String),
    Success(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusItem {
    url: String,
    status: ItemStatus,
}

impl StatusItem {
    fn line(&self) -> String {
        let url = &self.url;
        match &self.status {
            ItemStatus::Queued => format!("[排队] {url}"),
            ItemStatus::Analyzing => format!("[...] 正在分析链接... - {url}"),
            ItemStatus::Downloading(folder) => format!("[...] 正在下载到 \"{folder}\"... - {url}"),
            ItemStatus::Success(folder) => format!("[✓] 成功: \"{folder}\" - {url}"),
            ItemStatus::Failed(error) => format!("[✗] 失败: {error} - {url}"),
        }
    }

    fn color(&self) -> egui::Color32 {
        match self.status {
            ItemStatus::Queued => TEXT_MUTED,
            ItemStatus::Analyzing | ItemStatus::Downloading(_) => PRIMARY,
            ItemStatus::Success(_) => SUCCESS,
            ItemStatus::Failed(_) => FAILURE,
        }
    }
}

/// 工作线程与界面线程共享的状态
#[derive(Debug, Default)]
struct DownloadState {
    items: Vec<StatusItem>,
    completed: usize,
    active: Option<usize>,
    is_downloading: bool,
    // 界面线程取走后弹出完成提示
    finished: Option<BatchSummary>,
}

impl DownloadState {
    fn start(&mut self, urls: &[String]) {
        self.items = urls
            .iter()
            .map(|url| StatusItem {
                url: url.clone(),
                status: ItemStatus::Queued,
            })
            .collect();
        self.completed = 0;
        self.active = None;
        self.is_downloading = true;
        self.finished = None;
    }

    fn set_status(&mut self, index: usize, status: ItemStatus) {
        if let Some(item) = self.items.get_mut(index) {
            item.status = status;
        }
        self.active = Some(index);
    }

    fn apply(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Analyzing { index, .. } => self.set_status(index, ItemStatus::Analyzing),
            BatchEvent::Downloading { index, folder, .. } => {
                self.set_status(index, ItemStatus::Downloading(folder.name))
            }
            BatchEvent::Finished { index, url, result } => {
                self.completed += 1;
                let mark = if result.is_success() { "✓" } else { "✗" };
                let status = match result {
                    ItemResult::Success { folder } => ItemStatus::Success(folder),
                    ItemResult::Failed { error } => ItemStatus::Failed(error),
                };
                tracing::info!("[{}/{}] {} {}", self.completed, self.items.len(), mark, url);
                self.set_status(index, status);
            }
            BatchEvent::AllDone(summary) => {
                self.is_downloading = false;
                self.active = None;
                self.finished = Some(summary);
            }
        }
    }

    fn fraction(&self) -> f32 {
        if self.items.is_empty() {
            0.0
        } else {
            self.completed as f32 / self.items.len() as f32
        }
    }
}

fn show_message(level: rfd::MessageLevel, title: &str, description: &str) {
    rfd::MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

pub struct GalleryDownloaderApp {
    settings: Settings,
    folder_input: String,
    urls_input: String,
    status_message: String,
    // 最近一次滚动到的条目，避免每帧重复滚动
    scrolled_to: Option<usize>,
    state: Arc<Mutex<DownloadState>>,
}

impl GalleryDownloaderApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let folder_input = settings.absolute_download_dir().display().to_string();
        Self {
            settings,
            folder_input,
            urls_input: String::new(),
            status_message: "请输入图集链接".to_string(),
            scrolled_to: None,
            state: Arc::new(Mutex::new(DownloadState::default())),
        }
    }

    fn is_downloading(&self) -> bool {
        self.state.lock().map(|s| s.is_downloading).unwrap_or(false)
    }

    fn browse_folder(&mut self) {
        let mut dialog = rfd::FileDialog::new().set_title("选择下载目录");
        let current = PathBuf::from(self.folder_input.trim());
        if current.is_dir() {
            dialog = dialog.set_directory(&current);
        }
        if let Some(folder) = dialog.pick_folder() {
            self.folder_input = folder.display().to_string();
        }
    }

    fn start_download(&mut self, ctx: &egui::Context) {
        if self.is_downloading() {
            show_message(rfd::MessageLevel::Warning, "正在下载", "已有下载任务在进行中！");
            return;
        }

        if self.urls_input.trim().is_empty() {
            show_message(rfd::MessageLevel::Error, "没有链接", "请至少输入一个图集链接。");
            return;
        }

        let urls = parse_urls(&self.urls_input).urls;
        if urls.is_empty() {
            show_message(
                rfd::MessageLevel::Error,
                "链接无效",
                "未找到有效链接，链接必须以 http:// 或 https:// 开头",
            );
            return;
        }

        let folder = self.folder_input.trim();
        if folder.is_empty() {
            show_message(rfd::MessageLevel::Error, "没有目录", "请选择下载目录。");
            return;
        }
        let base_dir = PathBuf::from(folder);

        if let Ok(mut state) = self.state.lock() {
            state.start(&urls);
        }
        self.scrolled_to = None;
        self.status_message = format!("正在下载 {} 个图集...", urls.len());
        tracing::info!(count = urls.len(), target = %base_dir.display(), "开始批量下载");

        let runner = BatchRunner::from_settings(&self.settings);
        let state = Arc::clone(&self.state);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            runner.run(&urls, &base_dir, |event| {
                if let Ok(mut state) = state.lock() {
                    state.apply(event);
                }
                ctx.request_repaint();
            });
        });
    }

    fn download_finished(&mut self, summary: BatchSummary) {
        self.status_message = format!("下载完成: {}/{} 成功", summary.succeeded, summary.total);
        show_message(
            rfd::MessageLevel::Info,
            "下载完成",
            &format!(
                "下载完成！\n\n成功: {}/{}\n文件保存在: {}",
                summary.succeeded,
                summary.total,
                self.folder_input.trim()
            ),
        );
    }
}

/// 绘制卡片风格的容器
fn draw_card<R>(
    ui: &mut egui::Ui,
    title: &str,
    icon: &str,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> R {
    egui::Frame::none()
        .fill(egui::Color32::WHITE)
        .rounding(12.0)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(229, 231, 235)))
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(icon_text(icon, 18.0).color(PRIMARY));
                ui.add_space(4.0);
                ui.label(egui::RichText::new(title).strong().size(15.0).color(TEXT_DARK));
            });
            ui.add_space(8.0);
            add_contents(ui)
        })
        .inner
}

impl eframe::App for GalleryDownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (items, fraction, completed, active, downloading) = match self.state.lock() {
            Ok(state) => (
                state.items.clone(),
                state.fraction(),
                state.completed,
                state.active,
                state.is_downloading,
            ),
            Err(_) => (Vec::new(), 0.0, 0, None, false),
        };

        let mut should_browse = false;
        let mut should_start = false;

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(ctx.style().as_ref()).fill(egui::Color32::from_rgb(243, 244, 246)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new("图集批量下载工具").size(20.0).strong().color(PRIMARY));
                    });
                    ui.add_space(8.0);

                    draw_card(ui, "下载目录", icon::FOLDER_OPEN, |ui| {
                        ui.horizontal(|ui| {
                            let browse_width = 90.0;
                            ui.add_enabled(
                                !downloading,
                                egui::TextEdit::singleline(&mut self.folder_input)
                                    .desired_width(ui.available_width() - browse_width - 8.0),
                            );
                            let browse_btn = ui.add_enabled(
                                !downloading,
                                egui::Button::new("浏览...").min_size(egui::vec2(browse_width, 0.0)),
                            );
                            if browse_btn.clicked() {
                                should_browse = true;
                            }
                        });
                    });

                    ui.add_space(8.0);

                    draw_card(ui, "图集链接（每行一个）", icon::LINK, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.urls_input)
                                .font(egui::TextStyle::Monospace)
                                .desired_rows(8)
                                .desired_width(f32::INFINITY)
                                .hint_text("https://..."),
                        );
                    });

                    ui.add_space(8.0);

                    draw_card(ui, "进度", icon::LIST, |ui| {
                        ui.add(
                            egui::ProgressBar::new(fraction)
                                .text(format!("{}/{}", completed, items.len()))
                                .fill(PRIMARY),
                        );
                        ui.add_space(6.0);

                        egui::Frame::none()
                            .fill(egui::Color32::from_rgb(249, 250, 251))
                            .rounding(6.0)
                            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(229, 231, 235)))
                            .inner_margin(6.0)
                            .show(ui, |ui| {
                                egui::ScrollArea::vertical()
                                    .id_source("status_list")
                                    .max_height(180.0)
                                    .auto_shrink([false, false])
                                    .show(ui, |ui| {
                                        if items.is_empty() {
                                            ui.label(egui::RichText::new("暂无任务").color(TEXT_MUTED));
                                        }
                                        for (idx, item) in items.iter().enumerate() {
                                            let response = ui.label(
                                                egui::RichText::new(item.line())
                                                    .monospace()
                                                    .size(12.0)
                                                    .color(item.color()),
                                            );
                                            if active == Some(idx) && self.scrolled_to != active {
                                                response.scroll_to_me(Some(egui::Align::Center));
                                                self.scrolled_to = active;
                                            }
                                        }
                                    });
                            });
                    });

                    ui.add_space(12.0);

                    ui.horizontal(|ui| {
                        let button_width = (ui.available_width() - 12.0) / 2.0;
                        let label = if downloading {
                            format!("{} 下载中...", icon::PENDING)
                        } else {
                            format!("{} 下载", icon::DOWNLOAD)
                        };
                        let download_btn = ui.add_enabled(
                            !downloading,
                            egui::Button::new(egui::RichText::new(label).size(15.0).strong().color(egui::Color32::WHITE))
                                .fill(PRIMARY)
                                .rounding(8.0)
                                .min_size(egui::vec2(button_width, 40.0)),
                        );
                        if download_btn.clicked() {
                            should_start = true;
                        }

                        let exit_btn = ui.add(
                            egui::Button::new(egui::RichText::new(format!("{} 退出", icon::EXIT)).size(15.0))
                                .fill(egui::Color32::WHITE)
                                .rounding(8.0)
                                .min_size(egui::vec2(button_width, 40.0)),
                        );
                        if exit_btn.clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });

                    ui.add_space(8.0);
                    ui.separator();
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(format!("{} 状态:", icon::INFO)).size(12.0).color(PRIMARY));
                        ui.label(egui::RichText::new(&self.status_message).size(12.0).color(TEXT_MUTED));
                    });
                });
            });

        if should_browse {
            self.browse_folder();
        }
        if should_start {
            self.start_download(ctx);
        }

        let finished = self.state.lock().ok().and_then(|mut state| state.finished.take());
        if let Some(summary) = finished {
            self.download_finished(summary);
        }
    }
}
