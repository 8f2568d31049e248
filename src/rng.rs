//! Deterministic per-plot random streams.
//!
//! Every plot draws from its own ChaCha8 stream whose seed is derived from the
//! master seed and the plot index, so results do not depend on the order in
//! which plots are scheduled.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed of the reference Hubbard Brook runs.
pub const DEFAULT_SEED: u64 = 74_837_891;

pub type PlotRng = ChaCha8Rng;

#[derive(Debug, Clone, Copy)]
pub struct RngManager {
    master_seed: u64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self { master_seed: seed }
    }

    /// Stream for the plot at `plot_index`.
    pub fn plot_stream(&self, plot_index: usize) -> PlotRng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(plot_index as u64))
    }

    pub fn plot_streams(&self, plots: usize) -> Vec<PlotRng> {
        (0..plots).map(|index| self.plot_stream(index)).collect()
    }

    fn derive_seed(&self, plot_index: u64) -> u64 {
        let mut seed = self.master_seed;
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= plot_index.wrapping_mul(48271);
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
