use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

mod app;
mod batch;
mod config;
mod console;
mod downloader;
mod icons;
mod logging;
mod naming;
mod title;
mod urls;

use app::GalleryDownloaderApp;
use config::Settings;

/// 批量下载图集：按页面标题或链接路径建立文件夹，交给 gallery-dl 下载
#[derive(Parser, Debug)]
#[command(name = "gallery-downloader", version, about)]
struct Cli {
    /// 打开图形界面
    #[arg(long)]
    gui: bool,

    /// 下载根目录（默认 ./downloads）
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 获取页面标题的超时秒数
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// 图集链接；留空则在终端中提示输入
    urls: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 命令行模式自己打印进度，只输出警告以上的日志
    logging::init_logging(if cli.gui { "info" } else { "warn" });

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.dir {
        settings.download_dir = dir;
    }
    if let Some(timeout) = cli.timeout {
        settings.http.timeout_secs = timeout;
    }

    if cli.gui {
        run_gui(settings)
    } else {
        console::run(&settings, &cli.urls)
    }
}

fn run_gui(settings: Settings) -> anyhow::Result<()> {
    // 中文字体较大，放到后台线程读取
    let font_paths = [
        "C:\\Windows\\Fonts\\msyh.ttc",
        "C:\\Windows\\Fonts\\simhei.ttf",
        "/System/Library/Fonts/PingFang.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    ];

    let font_handle = std::thread::spawn(move || {
        font_paths
            .iter()
            .find_map(|path| std::fs::read(path).ok())
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 700.0])
            .with_min_inner_size([600.0, 500.0]),
        ..Default::default()
    };

    tracing::info!("图形界面已启动");

    eframe::run_native(
        "Image Gallery Downloader",
        options,
        Box::new(move |cc| {
            let mut fonts = egui::FontDefinitions::default();

            match font_handle.join() {
                Ok(Some(font_data)) => {
                    fonts
                        .font_data
                        .insert("cjk".to_owned(), egui::FontData::from_owned(font_data));
                    // 放在默认字体之后，保留拉丁字形与图标
                    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                        fonts.families.entry(family).or_default().push("cjk".to_owned());
                    }
                }
                _ => tracing::warn!("未找到中文字体，界面文字可能无法显示"),
            }

            cc.egui_ctx.set_fonts(fonts);
            configure_custom_style(&cc.egui_ctx);

            Ok(Box::new(GalleryDownloaderApp::new(cc, settings)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("图形界面启动失败: {e}"))?;

    tracing::info!("图形界面已关闭");
    Ok(())
}

/// 全局浅色样式
fn configure_custom_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::new(18.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::new(14.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::new(14.0, egui::FontFamily::Proportional),
    );

    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);

    let mut visuals = egui::Visuals::light();
    visuals.window_rounding = egui::Rounding::same(12.0);
    visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);
    visuals.widgets.hovered.rounding = egui::Rounding::same(6.0);
    visuals.widgets.active.rounding = egui::Rounding::same(6.0);

    visuals.panel_fill = egui::Color32::from_rgb(249, 250, 251);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(229, 231, 235));

    // 主题色 #134e4a
    let primary_color = egui::Color32::from_rgb(19, 78, 74);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.5, primary_color);
    visuals.selection.bg_fill = egui::Color32::from_rgb(204, 251, 241);
    visuals.selection.stroke = egui::Stroke::new(1.0, primary_color);

    style.visuals = visuals;
    ctx.set_style(style);
}
