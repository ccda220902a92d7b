//! Source adapters.
//!
//! An adapter knows one source format and turns a fetched document into the
//! common [`RawPage`] record. Adapters are handed to callers as trait
//! objects; the assembler never sees which format a page came from.

mod html;
mod json;

pub use html::HtmlTableAdapter;
pub use json::JsonPageAdapter;

use crate::error::Result;
use crate::models::{AdapterConfig, AdapterKind, RawPage};

/// Parses one source format into raw records.
pub trait SourceAdapter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Parse one already-fetched document.
    fn parse(&self, input: &str) -> Result<RawPage>;
}

/// Build the adapter an [`AdapterConfig`] asks for.
pub fn from_config(config: &AdapterConfig) -> Result<Box<dyn SourceAdapter>> {
    Ok(match config.kind {
        AdapterKind::Html => Box::new(HtmlTableAdapter::new(config)?),
        AdapterKind::Json => Box::new(JsonPageAdapter),
    })
}
