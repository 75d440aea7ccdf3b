//! Bucket-size padding shared by chunk ciphertexts and index result counts.

/// Rounds `len` up to the smallest configured bucket, or leaves it
/// unpadded if it already exceeds the largest bucket.
pub fn next_bucket(len: usize, buckets: &[usize]) -> usize {
    buckets
        .iter()
        .copied()
        .find(|&b| b >= len)
        .unwrap_or(len)
}
