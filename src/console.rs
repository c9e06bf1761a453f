//! 命令行交互模式

use anyhow::Result;
use std::io::{self, BufRead};

use crate::batch::{BatchEvent, BatchRunner, ItemResult};
use crate::config::Settings;
use crate::naming::NameSource;
use crate::urls::parse_urls;

fn print_rule() {
    println!("{}", "=".repeat(60));
}

/// 读取多行输入，遇到空行或 EOF 结束
pub fn read_until_blank(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// 运行命令行模式。`args` 非空时直接使用，否则提示用户粘贴链接。
pub fn run(settings: &Settings, args: &[String]) -> Result<()> {
    print_rule();
    println!("图集批量下载工具");
    print_rule();
    println!();

    let lines = if args.is_empty() {
        println!("粘贴一个或多个图集链接（空格或换行分隔）。");
        println!("输入完成后连按两次回车：");
        println!();
        read_until_blank(io::stdin().lock())?
    } else {
        args.to_vec()
    };

    if lines.is_empty() {
        println!("未提供任何链接，退出。");
        return Ok(());
    }

    let parsed = parse_urls(&lines.join(" "));
    for skipped in &parsed.skipped {
        println!("警告: 跳过无效链接: {skipped}");
    }

    if parsed.urls.is_empty() {
        println!("未找到有效链接，退出。");
        return Ok(());
    }

    let total = parsed.urls.len();
    println!();
    println!("共 {total} 个链接待处理");
    println!();

    let base_dir = settings.absolute_download_dir();
    let runner = BatchRunner::from_settings(settings);
    let summary = runner.run(&parsed.urls, &base_dir, |event| report(&event, total));

    print_rule();
    println!("下载完成: {}/{} 成功", summary.succeeded, summary.total);
    if summary.failed() > 0 {
        println!("失败: {} 个", summary.failed());
    }
    println!("文件保存在: {}", base_dir.display());
    print_rule();

    Ok(())
}

fn report(event: &BatchEvent, total: usize) {
    for line in describe(event, total) {
        println!("{line}");
    }
}

/// 单个事件对应的终端输出行
fn describe(event: &BatchEvent, total: usize) -> Vec<String> {
    match event {
        BatchEvent::Analyzing { index, url } => vec![
            format!("[{}/{}] 正在处理: {}", index + 1, total, url),
            format!("  分析链接: {url}"),
        ],
        BatchEvent::Downloading {
            folder, target_dir, ..
        } => {
            let source = match &folder.source {
                NameSource::Title(title) => format!("  找到标题: {title}"),
                NameSource::UrlPath => "  未找到标题，使用链接路径".to_string(),
            };
            vec![
                source,
                format!("  文件夹名: {}", folder.name),
                format!("  下载到: {}", target_dir.display()),
            ]
        }
        BatchEvent::Finished { result, .. } => match result {
            ItemResult::Success { .. } => vec!["  ✓ 成功".to_string(), String::new()],
            ItemResult::Failed { error } => vec![
                format!("  错误: {error}"),
                "  ✗ 失败".to_string(),
                String::new(),
            ],
        },
        BatchEvent::AllDone(_) => Vec::new(),
    }
}
