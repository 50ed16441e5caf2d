//! JSON array output
//!
//! Each result becomes one object of the form
//! `{"CrawledUrl": ..., "FoundUrls": [...], "Depth": n, "Error": "..."}`,
//! where `Error` is the empty string for pages without errors.

use crate::crawler::CrawlResult;
use crate::output::OutputHandler;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Serialized form of a [`CrawlResult`]
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JsonRecord<'a> {
    #[serde(rename = "CrawledUrl")]
    pub crawled_url: &'a str,

    #[serde(rename = "FoundUrls")]
    pub found_urls: &'a [String],

    #[serde(rename = "Depth")]
    pub depth: u32,

    #[serde(rename = "Error")]
    pub error: String,
}

impl<'a> From<&'a CrawlResult> for JsonRecord<'a> {
    fn from(result: &'a CrawlResult) -> Self {
        Self {
            crawled_url: &result.url,
            found_urls: &result.found_urls,
            depth: result.depth,
            error: result
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Pretty-print each object, indented with tabs
    pub indent: bool,

    /// Also report errors on stderr
    pub errors_to_stderr: bool,
}

/// Writes results as a JSON array, one object per result
///
/// Safe to share between crawl tasks: every write happens under one lock, so
/// objects never interleave.
pub struct JsonWriter<W> {
    state: Mutex<WriterState<W>>,
    options: OutputOptions,
}

struct WriterState<W> {
    out: W,
    written: usize,
    closed: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W, options: OutputOptions) -> Self {
        Self {
            state: Mutex::new(WriterState {
                out,
                written: 0,
                closed: false,
            }),
            options,
        }
    }

    /// Number of results written so far
    pub fn written(&self) -> usize {
        self.lock().written
    }

    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }

    fn lock(&self) -> MutexGuard<'_, WriterState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn encode(&self, record: &JsonRecord<'_>) -> crate::Result<Vec<u8>> {
        if self.options.indent {
            let mut buf = Vec::new();
            let mut serializer =
                Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
            record.serialize(&mut serializer)?;
            Ok(buf)
        } else {
            Ok(serde_json::to_vec(record)?)
        }
    }
}

impl<W: Write + Send> OutputHandler for JsonWriter<W> {
    fn begin(&self) -> crate::Result<()> {
        let mut state = self.lock();
        state.out.write_all(b"[\n")?;
        state.out.flush()?;
        Ok(())
    }

    fn handle(&self, result: &CrawlResult) -> crate::Result<()> {
        let record = JsonRecord::from(result);
        let encoded = self.encode(&record)?;

        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }

        if self.options.errors_to_stderr && !record.error.is_empty() {
            eprintln!("ERROR in `{}`: {}", record.crawled_url, record.error);
        }

        if state.written > 0 {
            state.out.write_all(b",\n")?;
        }
        state.out.write_all(&encoded)?;
        state.out.flush()?;
        state.written += 1;
        Ok(())
    }

    fn finish(&self) -> crate::Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        if state.written > 0 {
            state.out.write_all(b"\n")?;
        }
        state.out.write_all(b"]\n")?;
        state.out.flush()?;
        Ok(())
    }
}
