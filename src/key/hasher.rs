//! Fixed-width, non-cryptographic hashes used for cache partitioning.
//!
//! Hashing is deliberately separated from canonicalization: anything that
//! turns bytes into a short stable string can back a [`KeyDeriver`](super::KeyDeriver).

/// Turns canonical bytes into the text that ends up inside a cache key.
///
/// Implementations must be pure: the same input always yields the same output
/// across processes and restarts, otherwise shared stores stop matching.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, bytes: &[u8]) -> String;
}

/// 32-bit MurmurHash2, rendered as an unsigned decimal.
///
/// The default seed is `0`, the seed of the original key format.
///
/// # Examples
///
/// ```
/// use apicache::key::{KeyHasher, Murmur2};
///
/// assert_eq!(Murmur2::default().hash(b""), "0");
/// assert_eq!(Murmur2::default().hash(b"hello"), "3848350155");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Murmur2 {
    seed: u32,
}

impl Murmur2 {
    const M: u32 = 0x5bd1_e995;
    const R: u32 = 24;

    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Raw 32-bit digest of `data`.
    pub fn digest(&self, data: &[u8]) -> u32 {
        // The reference algorithm mixes in the length truncated to 32 bits.
        let mut h = self.seed ^ (data.len() as u32);

        let mut chunks = data.chunks_exact(4);
        for chunk in &mut chunks {
            let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            k = k.wrapping_mul(Self::M);
            k ^= k >> Self::R;
            k = k.wrapping_mul(Self::M);
            h = h.wrapping_mul(Self::M) ^ k;
        }

        let tail = chunks.remainder();
        if tail.len() >= 3 {
            h ^= u32::from(tail[2]) << 16;
        }
        if tail.len() >= 2 {
            h ^= u32::from(tail[1]) << 8;
        }
        if !tail.is_empty() {
            h ^= u32::from(tail[0]);
            h = h.wrapping_mul(Self::M);
        }

        h ^= h >> 13;
        h = h.wrapping_mul(Self::M);
        h ^= h >> 15;
        h
    }
}

impl KeyHasher for Murmur2 {
    fn hash(&self, bytes: &[u8]) -> String {
        self.digest(bytes).to_string()
    }
}
