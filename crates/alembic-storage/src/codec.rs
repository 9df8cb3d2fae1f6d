//! Embedding blob codec and cosine similarity.
//!
//! Layout: `u32` little-endian dimension header followed by that many
//! little-endian `f32` values.

use alembic_core::constants::EMBEDDING_HEADER_BYTES;
use alembic_core::errors::StorageError;

/// Encode a vector with its dimension header.
pub fn encode(vector: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(EMBEDDING_HEADER_BYTES + vector.len() * 4);
    out.extend_from_slice(&(vector.len() as u32).to_le_bytes());
    for v in vector {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decode a blob, rejecting truncated or inconsistent payloads.
pub fn decode(id: &str, bytes: &[u8]) -> Result<Vec<f32>, StorageError> {
    let corrupt = |reason: String| StorageError::CorruptEmbedding {
        id: id.to_string(),
        reason,
    };
    let header: [u8; EMBEDDING_HEADER_BYTES] = bytes
        .get(..EMBEDDING_HEADER_BYTES)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| corrupt(format!("blob of {} bytes has no header", bytes.len())))?;
    let dims = u32::from_le_bytes(header) as usize;
    let body = &bytes[EMBEDDING_HEADER_BYTES..];
    if body.len() != dims * 4 {
        return Err(corrupt(format!(
            "header declares {dims} dims but body holds {} bytes",
            body.len()
        )));
    }
    Ok(body
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity in f64. Zero-norm inputs score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}
