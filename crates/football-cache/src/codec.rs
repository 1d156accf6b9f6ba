//! Parquet encoding shared by the persistent stores.

use std::io::Cursor;

use football_core::{DataError, Result};
use polars::prelude::*;

/// Encodes a frame as parquet bytes.
pub(crate) fn encode(frame: &DataFrame) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut frame = frame.clone();
    ParquetWriter::new(&mut bytes)
        .finish(&mut frame)
        .map_err(|e| DataError::Cache(e.to_string()))?;
    Ok(bytes)
}

/// Decodes parquet bytes written by [`encode`].
pub(crate) fn decode(bytes: Vec<u8>) -> Result<DataFrame> {
    ParquetReader::new(Cursor::new(bytes))
        .finish()
        .map_err(|e| DataError::CacheCorruption(e.to_string()))
}
