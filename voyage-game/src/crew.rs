//! Crewmates and rosters.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Crew carried by a single boat, stored inline for typical boat sizes.
pub type Crew = SmallVec<[Crewmate; 8]>;

/// Whether a crewmate counts toward the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Normal,
    /// Mascot or robot. Can die like anyone else but never scores.
    Special,
}

impl Role {
    #[must_use]
    pub const fn counts_toward_score(self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl FromStr for Role {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "normal" | "n" => Ok(Self::Normal),
            "special" | "s" | "mascot" | "robot" => Ok(Self::Special),
            other => Err(RosterError::UnknownRole {
                role: other.to_string(),
            }),
        }
    }
}

/// A single crewmate. Stats are fixed for the whole voyage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crewmate {
    constitution: u32,
    attack_dice: u32,
    #[serde(default)]
    role: Role,
}

impl Crewmate {
    #[must_use]
    pub const fn new(constitution: u32, attack_dice: u32, role: Role) -> Self {
        Self {
            constitution,
            attack_dice,
            role,
        }
    }

    #[must_use]
    pub const fn normal(constitution: u32, attack_dice: u32) -> Self {
        Self::new(constitution, attack_dice, Role::Normal)
    }

    #[must_use]
    pub const fn special(constitution: u32, attack_dice: u32) -> Self {
        Self::new(constitution, attack_dice, Role::Special)
    }

    #[must_use]
    pub const fn constitution(&self) -> u32 {
        self.constitution
    }

    #[must_use]
    pub const fn attack_dice(&self) -> u32 {
        self.attack_dice
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Contribution to the boat's score: constitution for normal crew, zero
    /// for mascots and robots.
    #[must_use]
    pub const fn score_value(&self) -> u32 {
        if self.role.counts_toward_score() {
            self.constitution
        } else {
            0
        }
    }
}

impl fmt::Display for Crewmate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.constitution, self.attack_dice)?;
        if self.role == Role::Special {
            f.write_str(":special")?;
        }
        Ok(())
    }
}

/// Parses the compact `CON:DICE` or `CON:DICE:ROLE` form, e.g. `5:2` or
/// `10:0:special`.
impl FromStr for Crewmate {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let mut parts = token.split(':');
        let (Some(con), Some(dice)) = (parts.next(), parts.next()) else {
            return Err(RosterError::MalformedToken {
                token: token.to_string(),
            });
        };
        let role = parts.next().map_or(Ok(Role::Normal), Role::from_str)?;
        if parts.next().is_some() {
            return Err(RosterError::MalformedToken {
                token: token.to_string(),
            });
        }
        let parse = |value: &str| {
            value
                .trim()
                .parse::<u32>()
                .map_err(|source| RosterError::InvalidNumber {
                    token: token.to_string(),
                    source,
                })
        };
        Ok(Self::new(parse(con)?, parse(dice)?, role))
    }
}

/// Errors raised while building a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster has no crew")]
    Empty,
    #[error("crewmate #{index} has zero constitution")]
    ZeroConstitution { index: usize },
    #[error("crew {total} exceeds {max}", max = u32::MAX)]
    TotalTooLarge { total: &'static str },
    #[error("crew token `{token}` must look like CON:DICE or CON:DICE:special")]
    MalformedToken { token: String },
    #[error("crew token `{token}` contains an invalid number")]
    InvalidNumber {
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unknown crew role `{role}`")]
    UnknownRole { role: String },
    #[error("failed to parse roster JSON")]
    Json(#[from] serde_json::Error),
}

/// Validated crew list used to launch boats.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub crew: Vec<Crewmate>,
}

impl Roster {
    /// Build a roster and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster is empty or a crewmate has zero
    /// constitution.
    pub fn new(crew: Vec<Crewmate>) -> Result<Self, RosterError> {
        let roster = Self { crew };
        roster.validate()?;
        Ok(roster)
    }

    /// Load a roster from JSON of the form `{"crew": [{"constitution": 5, "attack_dice": 2}]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the roster fails validation.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let roster: Self = serde_json::from_str(json)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Parse a comma-separated list of compact crew tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if any token is malformed or the roster fails validation.
    pub fn from_tokens(tokens: &str) -> Result<Self, RosterError> {
        let crew = tokens
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Crewmate::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(crew)
    }

    /// # Errors
    ///
    /// Returns `RosterError::Empty`, `RosterError::ZeroConstitution`, or
    /// `RosterError::TotalTooLarge` when summed constitution or attack dice
    /// would not fit a `u32`.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.crew.is_empty() {
            return Err(RosterError::Empty);
        }
        if let Some(index) = self.crew.iter().position(|mate| mate.constitution == 0) {
            return Err(RosterError::ZeroConstitution { index });
        }
        if checked_total(self.crew.iter().map(Crewmate::constitution)).is_none() {
            return Err(RosterError::TotalTooLarge {
                total: "constitution",
            });
        }
        if checked_total(self.crew.iter().map(Crewmate::attack_dice)).is_none() {
            return Err(RosterError::TotalTooLarge {
                total: "attack dice",
            });
        }
        Ok(())
    }

    /// Fresh crew for a new boat.
    #[must_use]
    pub fn to_crew(&self) -> Crew {
        self.crew.iter().copied().collect()
    }

    #[must_use]
    pub fn potential_score(&self) -> u32 {
        self.crew
            .iter()
            .map(Crewmate::score_value)
            .fold(0, u32::saturating_add)
    }
}

fn checked_total(mut values: impl Iterator<Item = u32>) -> Option<u32> {
    values.try_fold(0_u32, u32::checked_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_crew_never_score() {
        assert_eq!(Crewmate::normal(5, 1).score_value(), 5);
        assert_eq!(Crewmate::special(10, 3).score_value(), 0);
    }

    #[test]
    fn parses_compact_tokens() {
        let mate: Crewmate = "5:2".parse().unwrap();
        assert_eq!(mate, Crewmate::normal(5, 2));

        let robot: Crewmate = " 10:0:robot ".parse().unwrap();
        assert_eq!(robot, Crewmate::special(10, 0));
        assert_eq!(robot.to_string(), "10:0:special");
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            "5".parse::<Crewmate>(),
            Err(RosterError::MalformedToken { .. })
        ));
        assert!(matches!(
            "5:2:special:extra".parse::<Crewmate>(),
            Err(RosterError::MalformedToken { .. })
        ));
        assert!(matches!(
            "five:2".parse::<Crewmate>(),
            Err(RosterError::InvalidNumber { .. })
        ));
        assert!(matches!(
            "5:2:captain".parse::<Crewmate>(),
            Err(RosterError::UnknownRole { .. })
        ));
    }

    #[test]
    fn roster_from_tokens_validates() {
        let roster = Roster::from_tokens("5:2, 3:1, 10:0:special").unwrap();
        assert_eq!(roster.crew.len(), 3);
        assert_eq!(roster.potential_score(), 8);
        assert_eq!(roster.to_crew().len(), 3);

        assert!(matches!(Roster::from_tokens(""), Err(RosterError::Empty)));
        assert!(matches!(
            Roster::from_tokens("4:1,0:2"),
            Err(RosterError::ZeroConstitution { index: 1 })
        ));
    }

    #[test]
    fn roster_rejects_totals_past_u32() {
        assert!(matches!(
            Roster::from_tokens("4294967295:1,1:1"),
            Err(RosterError::TotalTooLarge {
                total: "constitution"
            })
        ));
        assert!(matches!(
            Roster::from_tokens("3:4294967295,2:1"),
            Err(RosterError::TotalTooLarge {
                total: "attack dice"
            })
        ));
        let roster = Roster::from_tokens("4294967294:0,1:0").unwrap();
        assert_eq!(roster.potential_score(), u32::MAX);
    }

    #[test]
    fn roster_from_json_defaults_role() {
        let json = r#"{"crew": [
            {"constitution": 6, "attack_dice": 2},
            {"constitution": 9, "attack_dice": 0, "role": "special"}
        ]}"#;
        let roster = Roster::from_json(json).unwrap();
        assert_eq!(roster.crew[0].role(), Role::Normal);
        assert_eq!(roster.crew[1].role(), Role::Special);
        assert_eq!(roster.potential_score(), 6);
    }

    #[test]
    fn roster_from_json_reports_parse_errors() {
        assert!(matches!(
            Roster::from_json("{\"crew\": [{}]}"),
            Err(RosterError::Json(_))
        ));
        assert!(matches!(
            Roster::from_json("{}"),
            Err(RosterError::Empty)
        ));
    }
}
