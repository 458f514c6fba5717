//! 外部参考源检索：Wikipedia 与 Python docs
//!
//! 页面结构无契约保证，本质是尽力而为：激进超时、失败类型化、摘要截断。
//! HTML 用 html2text 提取可读文本，失败时退化为简易去标签。

use async_trait::async_trait;
use html2text::from_read;
use reqwest::Client;
use thiserror::Error;

/// 检索失败
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("no usable content")]
    NoContent,
}

/// 参考源：topic → 截断摘要
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// 展示名（用于回复文案，如 "Wikipedia"）
    fn name(&self) -> &str;

    async fn fetch_summary(&self, topic: &str) -> Result<String, FetchError>;
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

/// 简易去除 HTML 标签（html2text 失败时的回退）
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn html_to_text(html: &str) -> String {
    match from_read(html.as_bytes(), 120) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => strip_html_tags(html),
    }
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status().as_u16()));
    }
    let mut body = resp
        .text()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;
    if body.starts_with('\u{FEFF}') {
        body = body[1..].to_string();
    }
    Ok(html_to_text(&body))
}

/// 截断到 cap 个字符并追加 "..."
fn truncate_summary(text: &str, cap: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= cap {
        format!("{}...", trimmed)
    } else {
        let cut: String = trimmed.chars().take(cap).collect();
        format!("{}...", cut)
    }
}

/// 提取第一个"像正文"的段落：空行分段，取第一个足够长的段
fn first_paragraph(text: &str, min_chars: usize) -> Option<&str> {
    text.split("\n\n")
        .map(str::trim)
        .find(|block| block.chars().count() >= min_chars)
}

/// Wikipedia 摘要源：GET en.wikipedia.org/wiki/<topic>，取首段正文
pub struct WikipediaSource {
    client: Client,
    max_summary_chars: usize,
}

impl WikipediaSource {
    pub fn new(timeout_secs: u64, max_summary_chars: usize) -> Self {
        Self {
            client: build_client(timeout_secs),
            max_summary_chars,
        }
    }
}

#[async_trait]
impl ReferenceSource for WikipediaSource {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    async fn fetch_summary(&self, topic: &str) -> Result<String, FetchError> {
        let url = format!(
            "https://en.wikipedia.org/wiki/{}",
            topic.trim().replace(' ', "_")
        );
        tracing::info!(url = %url, "wikipedia fetch");
        let text = fetch_text(&self.client, &url).await?;
        let para = first_paragraph(&text, 60).ok_or(FetchError::NoContent)?;
        Ok(truncate_summary(para, self.max_summary_chars))
    }
}

/// Python docs 检索源：搜索页的第一条命中摘要
pub struct PythonDocsSource {
    client: Client,
    max_summary_chars: usize,
}

impl PythonDocsSource {
    pub fn new(timeout_secs: u64, max_summary_chars: usize) -> Self {
        Self {
            client: build_client(timeout_secs),
            max_summary_chars,
        }
    }
}

#[async_trait]
impl ReferenceSource for PythonDocsSource {
    fn name(&self) -> &str {
        "Python docs"
    }

    async fn fetch_summary(&self, topic: &str) -> Result<String, FetchError> {
        let query = topic.trim().replace(' ', "+");
        let url = format!("https://docs.python.org/3/search.html?q={}", query);
        tracing::info!(url = %url, "python docs fetch");
        let text = fetch_text(&self.client, &url).await?;
        // 搜索页没有稳定结构：取第一个包含查询词的段落作为命中摘要
        let needle = topic.trim().to_lowercase();
        let hit = text
            .split("\n\n")
            .map(str::trim)
            .find(|block| block.chars().count() >= 20 && block.to_lowercase().contains(&needle))
            .ok_or(FetchError::NoContent)?;
        Ok(truncate_summary(hit, self.max_summary_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_summary_caps_and_marks() {
        let long = "a".repeat(500);
        let out = truncate_summary(&long, 400);
        assert_eq!(out.chars().count(), 403);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_truncate_short_text_keeps_marker() {
        assert_eq!(truncate_summary("short", 400), "short...");
    }

    #[test]
    fn test_first_paragraph_skips_noise() {
        let text = "nav\n\nmenu\n\nPython is a high-level, general-purpose programming language known for readability.";
        let para = first_paragraph(text, 60).unwrap();
        assert!(para.starts_with("Python is"));
    }

    #[test]
    fn test_first_paragraph_none_when_all_short() {
        assert!(first_paragraph("a\n\nb\n\nc", 60).is_none());
    }

    #[test]
    fn test_strip_html_tags() {
        let html = "<p>Hello <b>world</b></p>";
        assert_eq!(strip_html_tags(html), "Hello world");
    }
}
