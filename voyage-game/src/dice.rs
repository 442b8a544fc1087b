//! Dice primitive and the random streams that feed it.
//!
//! Every random outcome in a voyage is a sum of six-sided dice or a uniform
//! pick from the crew roster. Handlers never touch a generator directly; they
//! go through [`Dice`] so a seeded stream or a scripted sequence can be
//! injected.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of faces on every die in the game.
pub const DIE_FACES: u32 = 6;

/// Sum of `count` independent six-sided dice. Rolling zero dice yields zero.
#[must_use]
pub fn roll<R>(rng: &mut R, count: u32) -> u32
where
    R: Rng + ?Sized,
{
    (0..count)
        .map(|_| rng.gen_range(1..=DIE_FACES))
        .fold(0, u32::saturating_add)
}

/// Source of die faces consumed by event handlers.
pub trait Dice {
    /// A single die, uniform over `1..=6`.
    fn face(&mut self) -> u32;

    /// Uniform index in `0..len`. Callers guarantee `len > 0`.
    fn pick(&mut self, len: usize) -> usize;

    /// Sum of `count` dice.
    fn roll(&mut self, count: u32) -> u32 {
        (0..count)
            .map(|_| self.face())
            .fold(0, u32::saturating_add)
    }
}

/// Generator-backed dice that count how many dice have been thrown.
#[derive(Debug, Clone)]
pub struct RngDice<R = ChaCha20Rng> {
    rng: R,
    thrown: u64,
}

impl RngDice<ChaCha20Rng> {
    /// Dice seeded from the operating system's secure source.
    ///
    /// Falls back to a clock-seeded stream when no secure source is available.
    #[must_use]
    pub fn from_entropy() -> Self {
        let rng = ChaCha20Rng::from_rng(OsRng).unwrap_or_else(|err| {
            log::warn!("falling back to non-secure randomness: {err}");
            ChaCha20Rng::seed_from_u64(clock_seed())
        });
        Self::new(rng)
    }

    /// Deterministic dice for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }

    /// Deterministic dice for one boat of a seeded campaign.
    ///
    /// Each boat gets an independent stream so adding boats never shifts the
    /// rolls of earlier ones.
    #[must_use]
    pub fn for_boat(user_seed: u64, boat: u32) -> Self {
        let mut tag = *b"boat-\0\0\0\0";
        tag[5..].copy_from_slice(&boat.to_le_bytes());
        Self::seeded(derive_stream_seed(user_seed, &tag))
    }
}

impl<R: RngCore> RngDice<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng, thrown: 0 }
    }

    /// Number of dice thrown so far (roster picks are not counted).
    #[must_use]
    pub const fn thrown(&self) -> u64 {
        self.thrown
    }
}

impl<R: RngCore> Dice for RngDice<R> {
    fn face(&mut self) -> u32 {
        self.thrown = self.thrown.saturating_add(1);
        self.rng.gen_range(1..=DIE_FACES)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn roll(&mut self, count: u32) -> u32 {
        self.thrown = self.thrown.saturating_add(u64::from(count));
        let total = roll(&mut self.rng, count);
        log::trace!("rolled {count}d6 = {total}");
        total
    }
}

/// Derive an independent stream seed from a user seed and a domain tag.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            let nanos = elapsed.as_nanos() & u128::from(u64::MAX);
            u64::try_from(nanos).unwrap_or(0)
        })
}
