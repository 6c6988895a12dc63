//! Deterministic random source.
//!
//! Every draw is addressed by `(seed, domain, ids...)`. The tuple is folded
//! through HMAC-SHA256 keyed on the base seed to produce a sub-seed, which
//! seeds a `ChaCha20Rng`. No generator state is shared between features, so
//! scouting noise, reveal rolls and draft picks replay identically no matter
//! which order callers evaluate them in.
use std::fmt;

use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::numbers::unit_from_bits;

const PART_STR: u8 = 0x53;
const PART_INDEX: u8 = 0x49;
const BOX_MULLER_MIN_UNIT: f64 = 1e-12;

/// Address of a single deterministic draw.
#[derive(Clone)]
pub struct RollKey {
    mac: Hmac<Sha256>,
}

impl fmt::Debug for RollKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollKey")
            .field("sub_seed", &self.sub_seed())
            .finish()
    }
}

impl RollKey {
    /// Start a key from the base seed and a domain label.
    #[must_use]
    pub fn new(seed: u64, domain: &str) -> Self {
        let mac = Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes())
            .expect("64-bit seed is valid key");
        Self { mac }.with(domain)
    }

    /// Append a string identifier (prospect id, team id, ...).
    #[must_use]
    pub fn with(mut self, part: &str) -> Self {
        self.absorb(PART_STR, part.as_bytes());
        self
    }

    /// Append a numeric identifier (pick number, roll counter, ...).
    #[must_use]
    pub fn with_index(mut self, index: u64) -> Self {
        self.absorb(PART_INDEX, &index.to_le_bytes());
        self
    }

    fn absorb(&mut self, tag: u8, bytes: &[u8]) {
        // Length prefix keeps ("ab", "c") distinct from ("a", "bc").
        let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        self.mac.update(&[tag]);
        self.mac.update(&len.to_le_bytes());
        self.mac.update(bytes);
    }

    /// The 64-bit sub-seed this key resolves to.
    #[must_use]
    pub fn sub_seed(&self) -> u64 {
        let digest = self.mac.clone().finalize().into_bytes();
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(seed_bytes)
    }

    /// A fresh generator positioned at the start of this key's stream.
    #[must_use]
    pub fn stream(&self) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(self.sub_seed())
    }

    /// Uniform draw in `[0, 1)`.
    #[must_use]
    pub fn unit(&self) -> f64 {
        unit_from_bits(self.stream().next_u64())
    }

    /// Standard normal draw via Box–Muller over the first two stream values.
    #[must_use]
    pub fn standard_normal(&self) -> f64 {
        let mut rng = self.stream();
        let u1 = unit_from_bits(rng.next_u64()).max(BOX_MULLER_MIN_UNIT);
        let u2 = unit_from_bits(rng.next_u64());
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Convenience wrapper for a uniform draw keyed by string identifiers.
#[must_use]
pub fn roll_unit(seed: u64, domain: &str, ids: &[&str]) -> f64 {
    ids.iter()
        .fold(RollKey::new(seed, domain), |key, id| key.with(id))
        .unit()
}
