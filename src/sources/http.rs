//! Pages served over HTTP.

use async_trait::async_trait;

use super::PageSource;
use crate::error::Result;
use crate::utils::http::fetch_text;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn load(&self) -> Result<String> {
        fetch_text(&self.client, &self.url).await
    }
}
