//! Format-sniffing decompression for opaque database blobs.
//!
//! Notes bodies are stored as gzip members; Photos OCR payloads are LZFSE
//! block streams. Neither column records which codec was used, so we sniff
//! the magic prefix and fall back to the raw bytes when nothing matches or
//! the stream turns out to be truncated. Callers must tolerate the no-op
//! fallback — a blob that fails to inflate is still a blob.

use std::io::Read;

use flate2::read::GzDecoder;
use lzfse_rust::LzfseDecoder;

/// gzip member header (RFC 1952).
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Common prefix of the LZFSE block magics (`bvx-`, `bvx1`, `bvx2`, `bvxn`).
const LZFSE_MAGIC: [u8; 3] = *b"bvx";

/// Decompress `bytes` if they carry a known compressed-block signature.
///
/// Returns the expanded stream on success, or the input unchanged when no
/// signature matches or decompression fails partway. Never errors, never
/// blocks: both codecs are self-terminating and size-independent.
pub fn decompress(bytes: &[u8]) -> Vec<u8> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        let mut decoder = GzDecoder::new(bytes);
        if decoder.read_to_end(&mut out).is_ok() {
            return out;
        }
        return bytes.to_vec();
    }

    if bytes.starts_with(&LZFSE_MAGIC) {
        let mut out = Vec::new();
        if LzfseDecoder::default().decode_bytes(bytes, &mut out).is_ok() {
            return out;
        }
        return bytes.to_vec();
    }

    bytes.to_vec()
}
