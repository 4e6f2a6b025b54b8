use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Gzip-compresses a payload
pub fn gzip(payload: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    encoder.finish()
}
