use serde::Serialize;

use crate::errors::GenerationError;

/// Pretty JSON with a trailing newline.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, GenerationError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}
