//! The boat and everything the event handlers mutate.
use serde::{Deserialize, Serialize};

use crate::crew::{Crew, Crewmate};
use crate::locations::LocationId;

/// Years of food a boat takes on when provisions first run low.
pub const PROVISION_YEARS: i32 = 2;

/// One boat on its way back to Snudl-1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub location: LocationId,
    pub crew: Crew,
    pub needs_provisions: bool,
    /// Years of food left. Only meaningful while `needs_provisions` is set;
    /// may go negative.
    pub provisions_remaining: i32,
}

impl Ship {
    /// A freshly launched boat at the start location with ample provisions.
    #[must_use]
    pub fn new(crew: impl IntoIterator<Item = Crewmate>) -> Self {
        Self {
            location: LocationId::START,
            crew: crew.into_iter().collect(),
            needs_provisions: false,
            provisions_remaining: 0,
        }
    }

    /// Sum of constitution over normal crew, saturating at `u32::MAX`.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.crew
            .iter()
            .map(Crewmate::score_value)
            .fold(0, u32::saturating_add)
    }

    /// Total attack dice the crew throws in a fight, saturating at `u32::MAX`.
    #[must_use]
    pub fn attack_dice(&self) -> u32 {
        self.crew
            .iter()
            .map(Crewmate::attack_dice)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn crew_count(&self) -> usize {
        self.crew.len()
    }

    #[must_use]
    pub fn is_crew_lost(&self) -> bool {
        self.crew.is_empty()
    }

    #[must_use]
    pub const fn provisions(&self) -> Provisions {
        if self.needs_provisions {
            Provisions::Needed {
                years_left: self.provisions_remaining,
            }
        } else {
            Provisions::Sufficient
        }
    }

    /// Snapshot reported before every decision.
    #[must_use]
    pub fn status(&self) -> ShipStatus {
        ShipStatus {
            location: self.location,
            provisions: self.provisions(),
            crew_count: self.crew_count(),
            score: self.score(),
        }
    }
}

/// Food situation shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provisions {
    Sufficient,
    Needed { years_left: i32 },
}

/// Structured status handed to reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStatus {
    pub location: LocationId,
    pub provisions: Provisions,
    pub crew_count: usize,
    pub score: u32,
}
