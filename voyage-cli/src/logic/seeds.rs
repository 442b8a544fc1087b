use anyhow::{Result, bail};
use rand::RngCore;
use rand::rngs::OsRng;

/// Seed used when none is given on the command line.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve a list of CLI seed arguments into distinct seeds.
///
/// Supports decimal integers (negative values use their magnitude),
/// `0x`-prefixed hex, and the keyword `random` for a fresh OS seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let seed = if token.eq_ignore_ascii_case("random") {
            OsRng.next_u64()
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            && let Ok(value) = u64::from_str_radix(hex, 16)
        {
            value
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}
