//! Page loading.
//!
//! A [`PageSource`] delivers the raw text of one logical page. Pages load
//! concurrently and each is parsed on its own; the results go to
//! [`ScheduleAssembler::assemble`](crate::pipeline::ScheduleAssembler::assemble)
//! in whatever order they finished.

pub mod file;
pub mod http;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::adapters::SourceAdapter;
use crate::error::Result;
use crate::models::RawPage;

pub use file::FileSource;
pub use http::HttpSource;

/// Where one page's text comes from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Path or URL, for logs.
    fn location(&self) -> &str;

    /// Load the page text.
    async fn load(&self) -> Result<String>;
}

/// Pick a source for a path or http(s) URL.
pub fn source_for(input: &str, client: &reqwest::Client) -> Box<dyn PageSource> {
    if input.starts_with("http://") || input.starts_with("https://") {
        Box::new(HttpSource::new(client.clone(), input))
    } else {
        Box::new(FileSource::new(input))
    }
}

/// Load and parse all pages, at most `max_concurrent` at a time.
///
/// Every page yields its own result so one broken page does not hide the
/// others.
pub async fn load_pages(
    sources: &[Box<dyn PageSource>],
    adapter: &dyn SourceAdapter,
    max_concurrent: usize,
) -> Vec<Result<RawPage>> {
    stream::iter(sources)
        .map(|source| async move {
            let page = source.load().await.and_then(|text| adapter.parse(&text));
            match &page {
                Ok(page) => log::info!(
                    "Loaded {} ({} day(s)) via {}",
                    source.location(),
                    page.days.len(),
                    adapter.name()
                ),
                Err(e) => log::warn!("Failed to load {}: {}", source.location(), e),
            }
            page
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await
}
