//! Pages saved on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::PageSource;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    location: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let location = path.display().to_string();
        Self { path, location }
    }
}

#[async_trait]
impl PageSource for FileSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn load(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}
