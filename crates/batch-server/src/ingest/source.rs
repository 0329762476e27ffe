//! Record sources
//!
//! A [`RecordSource`] turns an uploaded byte stream into a sequence of
//! records. Each call yields exactly one read attempt, so the caller can
//! number rows by counting calls.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use csv_async::{AsyncReader, AsyncReaderBuilder, ByteRecord, ErrorKind};
use futures::io::AsyncRead;
use thiserror::Error;

use super::sniff::FileFormat;

/// Outcome of one read attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceItem {
    Record(Vec<String>),
    /// The attempt consumed input but did not yield a usable record.
    Malformed { raw: String, error: String },
}

/// Failure that leaves the source unusable
#[derive(Debug, Error)]
#[error("failed to read upload: {0}")]
pub struct SourceError(pub String);

#[async_trait]
pub trait RecordSource: Send {
    fn format(&self) -> FileFormat;

    /// Next read attempt, or `None` at end of input.
    async fn next_item(&mut self) -> Result<Option<SourceItem>, SourceError>;
}

// ============================================================================
// Delimited text
// ============================================================================

/// Comma-delimited text without a header row
///
/// Every record must have as many fields as the first one. Quoting is held
/// to the strict rules: a quote may only open a field, and a quoted field
/// must close before a delimiter, a line break or the end of input.
pub struct DelimitedSource<R> {
    reader: AsyncReader<RecordTap<R>>,
    record: ByteRecord,
}

impl<R> DelimitedSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .create_reader(RecordTap::new(input));

        Self {
            reader,
            record: ByteRecord::new(),
        }
    }

    fn raw_text(&self) -> String {
        self.record
            .iter()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Input bytes of the record just read, terminator included.
    fn take_raw(&mut self) -> Vec<u8> {
        let end = self.reader.position().byte();
        self.reader.get_mut().take_until(end)
    }
}

#[async_trait]
impl<R> RecordSource for DelimitedSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }

    async fn next_item(&mut self) -> Result<Option<SourceItem>, SourceError> {
        let result = self.reader.read_byte_record(&mut self.record).await;
        let raw = self.take_raw();

        match result {
            Ok(false) => Ok(None),
            Ok(true) => {
                if let Err(error) = check_quoting(&raw) {
                    return Ok(Some(SourceItem::Malformed {
                        raw: raw_line(&raw),
                        error,
                    }));
                }

                let mut fields = Vec::with_capacity(self.record.len());
                for (index, field) in self.record.iter().enumerate() {
                    match std::str::from_utf8(field) {
                        Ok(text) => fields.push(text.to_string()),
                        Err(e) => {
                            return Ok(Some(SourceItem::Malformed {
                                raw: self.raw_text(),
                                error: format!("field {}: invalid UTF-8: {}", index + 1, e),
                            }));
                        },
                    }
                }
                Ok(Some(SourceItem::Record(fields)))
            },
            Err(e) => match e.kind() {
                ErrorKind::Io(_) => Err(SourceError(e.to_string())),
                _ => Ok(Some(match check_quoting(&raw) {
                    Err(error) => SourceItem::Malformed {
                        raw: raw_line(&raw),
                        error,
                    },
                    Ok(()) => SourceItem::Malformed {
                        raw: self.raw_text(),
                        error: e.to_string(),
                    },
                })),
            },
        }
    }
}

/// Reader adapter that keeps every byte the parser has pulled until the
/// record containing it has been read.
///
/// The parser buffers ahead, so `pending` holds at most one buffer of
/// lookahead plus the current record.
struct RecordTap<R> {
    inner: R,
    /// Input offset of `pending[0]`
    base: u64,
    pending: Vec<u8>,
}

impl<R> RecordTap<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            base: 0,
            pending: Vec::new(),
        }
    }

    /// Remove and return the pending bytes before input offset `end`.
    fn take_until(&mut self, end: u64) -> Vec<u8> {
        let len = usize::try_from(end.saturating_sub(self.base))
            .unwrap_or(usize::MAX)
            .min(self.pending.len());
        self.base += len as u64;
        self.pending.drain(..len).collect()
    }
}

impl<R> AsyncRead for RecordTap<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(read)) = &poll {
            this.pending.extend_from_slice(&buf[..*read]);
        }
        poll
    }
}

#[derive(Debug, Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote seen inside a quoted field: either an escape or the close.
    QuotedQuote,
}

/// Check the raw bytes of one record against strict quoting.
///
/// The parser accepts a stray quote as literal text and lets an open quote
/// run to the end of input. Both are parse errors here.
fn check_quoting(raw: &[u8]) -> Result<(), String> {
    use QuoteState::*;

    let mut state = FieldStart;
    for &byte in raw {
        state = match (state, byte) {
            (Quoted, b'"') => QuotedQuote,
            (Quoted, _) => Quoted,
            (QuotedQuote, b'"') => Quoted,
            (QuotedQuote, b',' | b'\r' | b'\n') => FieldStart,
            (QuotedQuote, _) => {
                return Err("extraneous or missing \" in quoted field".to_string())
            },
            (FieldStart, b'"') => Quoted,
            (Unquoted, b'"') => return Err("bare \" in non-quoted field".to_string()),
            (_, b',' | b'\r' | b'\n') => FieldStart,
            (_, _) => Unquoted,
        };
    }

    match state {
        Quoted => Err("quoted field is not closed before end of input".to_string()),
        _ => Ok(()),
    }
}

/// Record bytes as text, without surrounding line breaks.
fn raw_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c| c == '\r' || c == '\n')
        .to_string()
}

// ============================================================================
// Columnar binary
// ============================================================================

/// Placeholder for columnar uploads
///
/// Row extraction from columnar files is not implemented. The source
/// yields one malformed item explaining that, then ends.
#[derive(Debug, Default)]
pub struct ColumnarSource {
    exhausted: bool,
}

impl ColumnarSource {
    pub const UNSUPPORTED: &'static str = "parquet row streaming is not supported";

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordSource for ColumnarSource {
    fn format(&self) -> FileFormat {
        FileFormat::Parquet
    }

    async fn next_item(&mut self) -> Result<Option<SourceItem>, SourceError> {
        if self.exhausted {
            return Ok(None);
        }
        self.exhausted = true;
        Ok(Some(SourceItem::Malformed {
            raw: String::new(),
            error: Self::UNSUPPORTED.to_string(),
        }))
    }
}
