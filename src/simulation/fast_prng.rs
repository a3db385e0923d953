//! SplitMix64 seed mixer for per-chunk RNG streams.
//!
//! Chunk `i` of a run seeded with `s` gets its own `SmallRng`, seeded from the
//! SplitMix64 output at `(s, i)`. Adjacent chunk indices therefore land on
//! well-separated seeds instead of `s + i`, and the stream for a chunk does not
//! depend on how many threads execute the run.

/// SplitMix64 PRNG — single u64 state, excellent statistical quality.
#[derive(Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }
}

/// Seed for chunk `chunk` of a run with base seed `seed`.
#[inline]
pub fn stream_seed(seed: u64, chunk: u64) -> u64 {
    let mut mixer = SplitMix64::new(seed ^ chunk.wrapping_mul(0xd1b54a32d192ed03));
    mixer.next_u64()
}
