use std::io::{Read, Write};

use flate2::bufread::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use super::error::DecompressError;

/// Upper bound on inflated payload size (1 MiB).
pub const DEFAULT_MAX_INFLATED_BYTES: usize = 1024 * 1024;

/// Inflate a raw DEFLATE stream (no zlib or gzip container) into UTF-8 text.
///
/// Output larger than `limit` bytes is rejected, as is any input left over
/// after the final block.
pub fn inflate(compressed: &[u8], limit: usize) -> Result<String, DecompressError> {
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut decoder = DeflateDecoder::new(compressed).take(cap);

    let mut out = Vec::with_capacity(compressed.len().saturating_mul(4).min(limit));
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DecompressError::Corrupt(e.to_string()))?;

    if out.len() > limit {
        return Err(DecompressError::TooLarge { limit });
    }

    let trailing = decoder.get_ref().get_ref().len();
    if trailing > 0 {
        return Err(DecompressError::Corrupt(format!(
            "{} bytes after end of stream",
            trailing
        )));
    }

    String::from_utf8(out).map_err(|e| DecompressError::InvalidUtf8(e.utf8_error().to_string()))
}

/// Raw DEFLATE compression of `text`.
pub fn deflate(text: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    encoder.finish()
}
