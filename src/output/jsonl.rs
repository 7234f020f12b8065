//! JSON Lines reading and writing
//!
//! Records are written one compact JSON object per line. Reading is
//! best-effort: blank lines and lines that fail to parse are skipped.

use crate::MinerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes serializable records as JSON Lines
pub struct JsonlWriter<W: Write> {
    inner: W,
    written: usize,
}

impl JsonlWriter<BufWriter<File>> {
    /// Creates (or truncates) a file for writing
    pub fn create(path: &Path) -> Result<Self, MinerError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Appends one record followed by a newline
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), MinerError> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the underlying writer
    pub fn finish(mut self) -> Result<W, MinerError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Writes all records to `path`, returning how many were written
pub fn write_jsonl<T: Serialize>(
    records: impl IntoIterator<Item = T>,
    path: &Path,
) -> Result<usize, MinerError> {
    let mut writer = JsonlWriter::create(path)?;
    for record in records {
        writer.write(&record)?;
    }
    let written = writer.written();
    writer.finish()?;
    Ok(written)
}

/// Reads every parsable record from a JSON Lines file
///
/// Lines that are blank, not valid UTF-8, or fail to deserialize as `T` are
/// skipped. Other I/O errors are returned.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, MinerError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::debug!("Skipping non-UTF-8 line {}: {}", line_no, e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => tracing::debug!("Skipping malformed line {}: {}", line_no, e),
        }
    }

    Ok(records)
}

/// Page text as consumed by extraction
///
/// Accepts both crawl output (`url`) and candidate-shaped input (`sourceUrl`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageInput {
    #[serde(default)]
    url: Option<String>,

    #[serde(default, rename = "sourceUrl")]
    source_url: Option<String>,

    #[serde(default)]
    text: Option<String>,
}

impl PageInput {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            source_url: None,
            text: Some(text.into()),
        }
    }

    /// The page URL, preferring `url` over `sourceUrl`; blank values count as missing
    pub fn url(&self) -> Option<&str> {
        [self.url.as_deref(), self.source_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|u| !u.trim().is_empty())
    }

    /// The page text, empty when absent
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Reads page inputs, dropping records without a URL
pub fn read_pages(path: &Path) -> Result<Vec<PageInput>, MinerError> {
    let pages = read_jsonl::<PageInput>(path)?
        .into_iter()
        .filter(|page| page.url().is_some())
        .collect();
    Ok(pages)
}
