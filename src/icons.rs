//! 界面图标工具模块

use eframe::egui;

/// egui 默认字体中自带的图标字符
pub mod icon {
    pub const FOLDER_OPEN: &str = "🗁";
    pub const LINK: &str = "🔗";
    pub const DOWNLOAD: &str = "⬇";
    pub const LIST: &str = "☰";
    pub const INFO: &str = "ℹ";
    pub const PENDING: &str = "⏳";
    pub const EXIT: &str = "⏻";
}

/// 创建一个图标文本
pub fn icon_text(icon: &str, size: f32) -> egui::RichText {
    egui::RichText::new(icon).font(egui::FontId::new(size, egui::FontFamily::Proportional))
}
