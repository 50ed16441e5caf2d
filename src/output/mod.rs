//! Output module for reporting crawl results
//!
//! This module turns [`CrawlResult`]s into a JSON array as they arrive.
//! Handlers are called from many crawl tasks at once and serialize their own
//! writes.

mod json;

pub use json::{JsonRecord, JsonWriter, OutputOptions};

use crate::crawler::CrawlResult;

/// Receives crawl results as they are produced
pub trait OutputHandler: Send + Sync {
    /// Writes the opening of the output, if any
    fn begin(&self) -> crate::Result<()>;

    /// Writes one result
    fn handle(&self, result: &CrawlResult) -> crate::Result<()>;

    /// Writes the closing of the output; later results are discarded
    fn finish(&self) -> crate::Result<()>;
}
