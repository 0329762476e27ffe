//! Upload format detection

use std::io::SeekFrom;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Leading bytes of every Parquet file.
pub const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// Detected upload format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text
    Csv,
    /// Columnar binary
    Parquet,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SniffError {
    #[error("file is shorter than {} bytes", PARQUET_MAGIC.len())]
    TooShort,

    #[error("only .csv or .parquet files are allowed")]
    Unsupported,

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Classify from the first four bytes and the client-supplied file name.
///
/// Anything that does not start with the Parquet magic is treated as CSV,
/// except a file whose first byte is `P` and whose name does not carry a
/// `.csv` extension.
pub fn classify(magic: &[u8; 4], file_name: Option<&str>) -> Result<FileFormat, SniffError> {
    if magic == PARQUET_MAGIC {
        return Ok(FileFormat::Parquet);
    }

    let csv_extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.starts_with("csv"));

    if csv_extension || magic[0] != b'P' {
        Ok(FileFormat::Csv)
    } else {
        Err(SniffError::Unsupported)
    }
}

/// Read the magic bytes of `reader`, classify, and rewind to the start.
pub async fn sniff<R>(reader: &mut R, file_name: Option<&str>) -> Result<FileFormat, SniffError>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut magic = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut magic).await {
        return match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Err(SniffError::TooShort),
            _ => Err(SniffError::Io(e)),
        };
    }
    reader.seek(SeekFrom::Start(0)).await?;

    classify(&magic, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parquet_magic_wins_over_extension() {
        assert_eq!(classify(b"PAR1", Some("data.csv")).unwrap(), FileFormat::Parquet);
    }

    #[test]
    fn test_text_is_csv() {
        assert_eq!(classify(b"id,n", None).unwrap(), FileFormat::Csv);
        assert_eq!(classify(b"1,2\n", Some("rows.txt")).unwrap(), FileFormat::Csv);
    }

    #[test]
    fn test_leading_p_needs_csv_extension() {
        assert!(matches!(classify(b"PK\x03\x04", Some("archive.zip")), Err(SniffError::Unsupported)));
        assert!(matches!(classify(b"Plai", None), Err(SniffError::Unsupported)));
        assert_eq!(classify(b"Plai", Some("people.csv")).unwrap(), FileFormat::Csv);
    }

    #[tokio::test]
    async fn test_sniff_rewinds() {
        let mut reader = Cursor::new(b"a,b,c\n1,2,3\n".to_vec());
        assert_eq!(sniff(&mut reader, None).await.unwrap(), FileFormat::Csv);

        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "a,b,c\n1,2,3\n");
    }

    #[tokio::test]
    async fn test_sniff_short_file() {
        let mut reader = Cursor::new(b"ab".to_vec());
        assert!(matches!(sniff(&mut reader, None).await, Err(SniffError::TooShort)));
    }
}
