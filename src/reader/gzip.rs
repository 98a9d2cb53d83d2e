use super::ReadError;
use flate2::read::GzDecoder;
use std::borrow::Cow;
use std::io::Read;

pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

pub fn is_gzip(buf: &[u8]) -> bool {
    buf.len() >= 2 && buf[0] == 0x1f && buf[1] == 0x8b
}

/// Inflates a gzip envelope if one is present, otherwise hands the buffer back
/// untouched. Output beyond `limit` bytes is rejected rather than buffered.
pub fn decompress(buf: &[u8], limit: usize) -> Result<Cow<'_, [u8]>, ReadError> {
    if !is_gzip(buf) {
        return Ok(Cow::Borrowed(buf));
    }

    let mut decompressed = Vec::new();
    let mut decoder = GzDecoder::new(buf).take((limit as u64).saturating_add(1));
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| ReadError::Decompress(e.to_string()))?;

    if decompressed.len() > limit {
        return Err(ReadError::DecompressedTooLarge { limit });
    }

    log::debug!(
        "inflated gzip payload from {} to {} bytes",
        buf.len(),
        decompressed.len()
    );
    Ok(Cow::Owned(decompressed))
}
