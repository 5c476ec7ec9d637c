// src/fetch/mod.rs
use anyhow::{Context, Result};
use reqwest::Client;
use scraper::Html;
use std::ops::RangeInclusive;
use std::time::Duration;
use url::Url;

/// Chapters of the integrated tariff. The schedule is published as chapters
/// 01 through 99; nothing outside this range is ever requested.
pub const CHAPTERS: RangeInclusive<u8> = 1..=99;

/// Print view of one chapter, parameterized by zero-padded chapter number.
static BASE_URL: &str = "https://www.hmcustoms.gov.gi/portal/services/tariff/print.jsf";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by every chapter request.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building HTTP client")
}

/// URL of the print view for one chapter, e.g. `print.jsf?c=07`.
pub fn chapter_url(chapter: u8) -> Url {
    Url::parse(&format!("{}?c={:02}", BASE_URL, chapter)).expect("chapter URL should be valid")
}

/// Fetch one chapter's print view and flatten the markup to text lines.
/// A non-2xx status is an error; unpublished chapters surface as 404 here
/// and the caller decides whether to skip.
pub async fn fetch_chapter_text(client: &Client, chapter: u8) -> Result<String> {
    let url = chapter_url(chapter);
    let html = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    Ok(flatten_html(&html))
}

/// Flatten markup to one trimmed line per text-node line, in document order.
/// Blank lines are dropped, so the extractor only ever sees content lines.
pub fn flatten_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut lines: Vec<&str> = Vec::new();
    for chunk in doc.root_element().text() {
        for line in chunk.lines() {
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line);
            }
        }
    }
    lines.join("\n")
}
