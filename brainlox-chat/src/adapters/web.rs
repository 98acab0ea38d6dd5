//! Single-page corpus loader: fetch HTML, keep the visible text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::domain::Document;
use crate::error::ProviderError;
use crate::ports::CorpusLoader;

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "header", "footer", "li", "ul", "ol", "tr",
    "table", "h1", "h2", "h3", "h4", "h5", "h6", "br", "blockquote", "pre",
];

pub struct WebCorpusLoader {
    client: Client,
    url: String,
}

impl WebCorpusLoader {
    pub fn new(
        url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CorpusLoader for WebCorpusLoader {
    fn source_url(&self) -> &str {
        &self.url
    }

    async fn load(&self) -> Result<Vec<Document>, ProviderError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let html = resp.text().await?;
        let document = html_to_document(&html, &self.url);
        tracing::debug!(
            url = %self.url,
            bytes = document.content.len(),
            "Extracted page text"
        );
        Ok(vec![document])
    }
}

/// Converts an HTML page into a [`Document`] carrying `source`, `title` and `language`.
pub fn html_to_document(html: &str, source: &str) -> Document {
    let page = Html::parse_document(html);
    let selectors = PageSelectors::new();

    let mut lines = Vec::new();
    let root = page
        .select(&selectors.body)
        .next()
        .unwrap_or_else(|| page.root_element());
    collect_text(root, &mut lines);

    let mut document = Document::new(join_lines(&lines)).with_source(source);

    if let Some(title) = page.select(&selectors.title).next() {
        let title = collapse_whitespace(&title.text().collect::<String>());
        if !title.is_empty() {
            document = document.with_title(title);
        }
    }
    if let Some(lang) = page.root_element().value().attr("lang") {
        document = document.with_language(lang);
    }

    document
}

struct PageSelectors {
    body: Selector,
    title: Selector,
}

impl PageSelectors {
    fn new() -> Self {
        Self {
            body: Selector::parse("body").expect("body selector"),
            title: Selector::parse("title").expect("title selector"),
        }
    }
}

/// Walks the element tree, emitting one line per text node and an empty
/// line after each block element.
fn collect_text(element: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let tag = child_element.value().name();
            if SKIPPED_TAGS.contains(&tag) {
                continue;
            }
            collect_text(child_element, lines);
            if BLOCK_TAGS.contains(&tag) {
                lines.push(String::new());
            }
        } else if let Some(text) = child.value().as_text() {
            let text = collapse_whitespace(text);
            if !text.is_empty() {
                lines.push(text);
            }
        }
    }
}

/// Joins lines, collapsing runs of blank lines into one paragraph break.
fn join_lines(lines: &[String]) -> String {
    let mut out = String::new();
    let mut pending_break = false;
    for line in lines {
        if line.is_empty() {
            pending_break = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        pending_break = false;
    }
    out
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
