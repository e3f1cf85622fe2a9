//! Byte-range arithmetic shared by the uploaders.

use crate::models::Chunk;

/// Number of chunks needed to cover `file_size` bytes.
///
/// A zero-byte file needs no chunks. `chunk_size` must be non-zero.
pub fn num_chunks(file_size: u64, chunk_size: u64) -> u64 {
    debug_assert!(chunk_size > 0, "chunk size must be positive");
    file_size.div_ceil(chunk_size)
}

/// Partition `[0, file_size)` into sequential chunks of `chunk_size` bytes.
///
/// Every chunk except the last is exactly `chunk_size` long; the last one
/// holds the remainder and is never empty. Chunks are produced lazily since
/// the endpoint picks `chunk_size` and a tiny value means a very long plan.
pub fn plan_chunks(file_size: u64, chunk_size: u64) -> impl Iterator<Item = Chunk> {
    (0..num_chunks(file_size, chunk_size)).map(move |index| {
        let offset = index * chunk_size;
        let end = std::cmp::min(offset.saturating_add(chunk_size), file_size);
        Chunk {
            index,
            offset,
            length: end - offset,
        }
    })
}

/// Whole percentage of `bytes` against `total`, floored and capped at 100.
///
/// An empty total counts as complete.
pub fn percent_of(bytes: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (bytes as u128 * 100) / total as u128;
    std::cmp::min(percent, 100) as u8
}
