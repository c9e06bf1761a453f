//! 页面标题获取

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::HttpConfig;

/// 标题来源，网络实现之外也便于在测试中替换
pub trait TitleSource {
    /// 返回页面 `<title>`；页面没有标题时返回 `Ok(None)`
    fn page_title(&self, url: &str) -> Result<Option<String>>;
}

/// 通过 HTTP GET 抓取页面标题
pub struct HttpTitleFetcher {
    agent: ureq::Agent,
}

impl HttpTitleFetcher {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }
}

impl TitleSource for HttpTitleFetcher {
    fn page_title(&self, url: &str) -> Result<Option<String>> {
        // 非 2xx 状态由 ureq 转为 Error::Status
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| anyhow!("网络请求失败: {e}"))?;

        let body = response.into_string()?;
        Ok(extract_title(&body))
    }
}

fn title_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("title").expect("valid title selector"))
}

/// `<title>` 按 RCDATA 解析，子标签会以文本形式出现
fn looks_like_markup(text: &str) -> bool {
    text.match_indices('<').any(|(i, _)| {
        text[i + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
    })
}

/// 提取第一个 `<title>` 的文本，实体由 HTML 解析器解码，空白压缩为单个空格
///
/// 注释与脚本中的 `<title>` 不计入。标题内含子标签或内容为空时视为没有标题。
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let element = document.select(title_selector()).next()?;

    if element.children().any(|child| child.value().is_element()) {
        return None;
    }

    let raw: String = element.text().collect();
    if looks_like_markup(&raw) {
        return None;
    }

    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{derive_folder_name, NameSource};
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Instant;

    /// 本地单次 HTTP 服务：返回固定响应，线程结果为收到的请求头
    fn serve_once(head: &str, body: &[u8]) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let mut response = format!(
            "{head}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                request.push_str(&line);
            }
            reader.get_mut().write_all(&response).unwrap();
            request
        });

        (format!("http://{addr}"), handle)
    }

    fn fetcher(user_agent: &str, timeout_secs: u64) -> HttpTitleFetcher {
        HttpTitleFetcher::new(&HttpConfig {
            timeout_secs,
            user_agent: user_agent.to_string(),
        })
    }

    #[test]
    fn simple_title() {
        let html = "<html><head><title>  My Gallery  </title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("My Gallery"));
    }

    #[test]
    fn case_insensitive_with_attributes() {
        let html = "<HEAD><TITLE lang=\"en\">\n  Summer\n   Trip\n</TITLE></HEAD>";
        assert_eq!(extract_title(html).as_deref(), Some("Summer Trip"));
    }

    #[test]
    fn first_title_wins() {
        let html = "<title>One</title><title>Two</title>";
        assert_eq!(extract_title(html).as_deref(), Some("One"));
    }

    #[test]
    fn missing_or_empty_title() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title("<title><b>nested</b></title>"), None);
        assert_eq!(extract_title("<titles>x</titles>"), None);
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        let html = "<title>Tom&rsquo;s Gallery &ndash; Part 1 &hellip; &copy;2024 &amp; &#x4E2D;</title>";
        assert_eq!(
            extract_title(html).as_deref(),
            Some("Tom\u{2019}s Gallery \u{2013} Part 1 \u{2026} \u{a9}2024 & \u{4e2d}")
        );
    }

    #[test]
    fn ignores_commented_out_title() {
        let html = "<!-- <title>stale</title> --><title>Real Title</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Real Title"));
    }

    #[test]
    fn ignores_title_inside_script() {
        let html = "<script>var s='<title>x</title>';</script><title>Real</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Real"));
    }

    #[test]
    fn fetch_sends_user_agent_and_reads_title() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8",
            b"<html><head><title>Hello Set</title></head></html>",
        );
        let title = fetcher("GalleryTest/1.0", 5).page_title(&format!("{url}/g/1")).unwrap();
        assert_eq!(title.as_deref(), Some("Hello Set"));

        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /g/1 "));
        assert!(request.contains("user-agent: gallerytest/1.0"));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/html",
            b"<title>Not Found</title>",
        );
        let fetcher = fetcher(crate::config::BROWSER_USER_AGENT, 5);
        let page = format!("{url}/g/slug404");
        assert!(fetcher.page_title(&page).is_err());
        server.join().unwrap();

        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/html",
            b"<title>Not Found</title>",
        );
        let folder = derive_folder_name(&fetcher, &format!("{url}/g/slug404"));
        assert_eq!(folder.name, "slug404");
        assert_eq!(folder.source, NameSource::UrlPath);
        server.join().unwrap();
    }

    #[test]
    fn declared_charset_is_honored() {
        // GBK 编码的 "图集"
        let mut body = b"<html><head><title>".to_vec();
        body.extend_from_slice(&[0xCD, 0xBC, 0xBC, 0xAF]);
        body.extend_from_slice(b"</title></head></html>");
        let (url, server) = serve_once("HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=gbk", &body);

        let title = fetcher(crate::config::BROWSER_USER_AGENT, 5).page_title(&url).unwrap();
        assert_eq!(title.as_deref(), Some("\u{56fe}\u{96c6}"));
        server.join().unwrap();
    }

    #[test]
    fn slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(5));
                drop(stream);
            }
        });

        let started = Instant::now();
        let result = fetcher(crate::config::BROWSER_USER_AGENT, 1).page_title(&format!("http://{addr}/"));
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
