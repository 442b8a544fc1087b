use anyhow::{Result, bail};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use voyage_game::{Choice, ChoiceProvider, LocationId};

/// Built-in helm strategies for automated voyages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoicePolicy {
    /// Always take the first course offered.
    First,
    /// Always take the second course offered.
    Second,
    /// Flip a seeded coin at every decision.
    Random,
}

impl ChoicePolicy {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "First course",
            Self::Second => "Second course",
            Self::Random => "Coin flip",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub fn create_helm(self, seed: u64) -> Box<dyn ChoiceProvider> {
        match self {
            Self::First => Box::new(FirstCourse),
            Self::Second => Box::new(SecondCourse),
            Self::Random => Box::new(CoinFlip::new(seed)),
        }
    }
}

impl fmt::Display for ChoicePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChoicePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1" => Ok(Self::First),
            "second" | "2" => Ok(Self::Second),
            "random" | "coin" => Ok(Self::Random),
            other => bail!("Unknown choice policy: {other}"),
        }
    }
}

/// Parse policy tokens, expanding `all` and dropping duplicates.
pub fn parse_policies(tokens: &[String]) -> Result<Vec<ChoicePolicy>> {
    let mut policies = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("all") {
            policies.extend(ChoicePolicy::ALL);
            continue;
        }
        policies.push(token.parse::<ChoicePolicy>()?);
    }
    let mut seen = Vec::with_capacity(policies.len());
    policies.retain(|policy| {
        if seen.contains(policy) {
            false
        } else {
            seen.push(*policy);
            true
        }
    });
    if policies.is_empty() {
        policies.extend(ChoicePolicy::ALL);
    }
    Ok(policies)
}

struct FirstCourse;
struct SecondCourse;

struct CoinFlip {
    rng: ChaCha20Rng,
}

impl CoinFlip {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl ChoiceProvider for FirstCourse {
    fn choose(&mut self, first: Choice, _second: Choice) -> LocationId {
        first.location
    }
}

impl ChoiceProvider for SecondCourse {
    fn choose(&mut self, _first: Choice, second: Choice) -> LocationId {
        second.location
    }
}

impl ChoiceProvider for CoinFlip {
    fn choose(&mut self, first: Choice, second: Choice) -> LocationId {
        if self.rng.gen_bool(0.5) {
            first.location
        } else {
            second.location
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> (Choice, Choice) {
        (
            Choice::new(LocationId::new(8), "run from inhabitants"),
            Choice::new(LocationId::new(5), "fight"),
        )
    }

    #[test]
    fn fixed_policies_always_pick_their_side() {
        let (first, second) = offer();
        let mut helm = ChoicePolicy::First.create_helm(0);
        assert_eq!(helm.choose(first, second), LocationId::new(8));
        let mut helm = ChoicePolicy::Second.create_helm(0);
        assert_eq!(helm.choose(first, second), LocationId::new(5));
    }

    #[test]
    fn coin_flip_is_seeded_and_mixes_courses() {
        let (first, second) = offer();
        let picks = |seed| {
            let mut helm = ChoicePolicy::Random.create_helm(seed);
            (0..64)
                .map(|_| helm.choose(first, second))
                .collect::<Vec<_>>()
        };
        let run = picks(7);
        assert_eq!(run, picks(7));
        assert!(run.contains(&first.location));
        assert!(run.contains(&second.location));
    }

    #[test]
    fn parses_policy_lists() {
        let tokens = ["second".to_string(), "FIRST".to_string(), "second".to_string()];
        assert_eq!(
            parse_policies(&tokens).unwrap(),
            vec![ChoicePolicy::Second, ChoicePolicy::First]
        );
        assert_eq!(
            parse_policies(&["all".to_string()]).unwrap(),
            ChoicePolicy::ALL.to_vec()
        );
        assert_eq!(parse_policies(&[]).unwrap(), ChoicePolicy::ALL.to_vec());
        assert!(parse_policies(&["cautious".to_string()]).is_err());
    }
}
