//! Spooling uploads to an anonymous temporary file
//!
//! The request handler writes the multipart body here chunk by chunk and
//! enforces the size ceiling as it goes, so an oversized upload is rejected
//! without ever being held in memory.

use std::io::SeekFrom;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("file exceeds the {limit} byte upload limit")]
    TooLarge { limit: u64 },

    #[error("failed to spool upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload being written
pub struct UploadSpool {
    file: File,
    file_name: Option<String>,
    written: u64,
    limit: u64,
}

impl UploadSpool {
    pub fn create(file_name: Option<String>, limit: u64) -> Result<Self, SpoolError> {
        let file = tempfile::tempfile()?;
        Ok(Self {
            file: File::from_std(file),
            file_name,
            written: 0,
            limit,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), SpoolError> {
        let written = self.written + chunk.len() as u64;
        if written > self.limit {
            return Err(SpoolError::TooLarge { limit: self.limit });
        }
        self.file.write_all(chunk).await?;
        self.written = written;
        Ok(())
    }

    /// Flush and rewind, ready for reading.
    pub async fn finish(mut self) -> Result<SpooledUpload, SpoolError> {
        self.file.flush().await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        Ok(SpooledUpload {
            file: self.file,
            file_name: self.file_name,
            size: self.written,
        })
    }
}

/// Complete upload positioned at its first byte
///
/// The backing file is removed by the OS once the handle is dropped.
#[derive(Debug)]
pub struct SpooledUpload {
    pub file: File,
    pub file_name: Option<String>,
    pub size: u64,
}

impl SpooledUpload {
    /// Spool an in-memory buffer. Used by tests and tools.
    pub async fn from_bytes(file_name: Option<&str>, bytes: &[u8]) -> Result<Self, SpoolError> {
        let mut spool = UploadSpool::create(file_name.map(str::to_string), u64::MAX)?;
        spool.write(bytes).await?;
        spool.finish().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_spool_round_trip() {
        let mut spool = UploadSpool::create(Some("rows.csv".into()), 64).unwrap();
        spool.write(b"1,a\n").await.unwrap();
        spool.write(b"2,b\n").await.unwrap();

        let mut upload = spool.finish().await.unwrap();
        assert_eq!(upload.size, 8);
        assert_eq!(upload.file_name.as_deref(), Some("rows.csv"));

        let mut text = String::new();
        upload.file.read_to_string(&mut text).await.unwrap();
        assert_eq!(text, "1,a\n2,b\n");
    }

    #[tokio::test]
    async fn test_spool_enforces_limit() {
        let mut spool = UploadSpool::create(None, 4).unwrap();
        spool.write(b"1234").await.unwrap();
        let err = spool.write(b"5").await.unwrap_err();
        assert!(matches!(err, SpoolError::TooLarge { limit: 4 }));
    }
}
