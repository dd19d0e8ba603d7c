//! Fixture files on disk.

pub mod atomic;
pub mod csv;
pub mod json;

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::errors::GenerationError;
use crate::model::FileReport;

/// Write `data` under `out_dir` and describe the result.
pub fn write_artifact(
    out_dir: &Path,
    relative: &str,
    data: &[u8],
    records: u64,
) -> Result<FileReport, GenerationError> {
    atomic::write_bytes_atomic(&out_dir.join(relative), data)?;
    Ok(FileReport {
        file: relative.to_string(),
        records,
        bytes: data.len() as u64,
        sha256: sha256_hex(data),
    })
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
