use std::io::Read;

use flate2::read::GzDecoder;

/// Compression formats recognised in site responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

/// Magic-byte detection and decompression of fetched payloads
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        match infer::get(data) {
            Some(kind) if kind.mime_type() == "application/gzip" => CompressionFormat::Gzip,
            _ => CompressionFormat::Uncompressed,
        }
    }

    /// Decompress data if it is compressed, otherwise return it unchanged
    pub fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        match Self::detect_compression_format(data) {
            CompressionFormat::Gzip => {
                let mut decoder = GzDecoder::new(data);
                let mut decompressed = Vec::new();
                decoder.read_to_end(&mut decompressed)?;
                Ok(decompressed)
            }
            CompressionFormat::Uncompressed => Ok(data.to_vec()),
        }
    }
}
