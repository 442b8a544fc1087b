//! The fixed location graph of the return voyage.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::events::{EventKind, LossCause};

/// Identifier of a location on the voyage board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(u8);

impl LocationId {
    /// Every boat sets out from here.
    pub const START: Self = Self(1);
    /// Snudl-1, home.
    pub const SNUDL: Self = Self(12);

    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for LocationId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// A location and the event it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub description: &'static str,
    pub event: EventKind,
}

impl Location {
    #[must_use]
    pub const fn new(id: u8, description: &'static str, event: EventKind) -> Self {
        Self {
            id: LocationId::new(id),
            description,
            event,
        }
    }
}

/// Errors raised when a location table is wired inconsistently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("start location {start} is missing")]
    MissingStart { start: LocationId },
    #[error("location {from} leads to {to}, which is not in the table")]
    DanglingSuccessor { from: LocationId, to: LocationId },
    #[error("no event can end the voyage from locations {stranded:?}")]
    NoWayHome { stranded: Vec<LocationId> },
}

/// Mapping from location id to its configured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTable {
    locations: BTreeMap<LocationId, Location>,
}

impl LocationTable {
    #[must_use]
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        Self {
            locations: locations
                .into_iter()
                .map(|location| (location.id, location))
                .collect(),
        }
    }

    /// The board wiring from the Awful Green Things epilogue.
    #[must_use]
    pub fn standard() -> Self {
        Self::new([
            Location::new(
                1,
                "Leaving the Znutar",
                EventKind::decision(7, 3, "straight for Snudl-1", "to last planet"),
            ),
            Location::new(2, "A year in deep space", EventKind::years(1, 7, 8, 3)),
            Location::new(3, "Approaching the last planet", EventKind::randomised(4, 6, 4)),
            Location::new(
                4,
                "Inhabited planet",
                EventKind::decision(8, 5, "run from inhabitants", "fight"),
            ),
            Location::new(5, "Battle with the inhabitants", EventKind::fight(6, 4)),
            Location::new(6, "Restocking", EventKind::refill(2, 12, 4)),
            Location::new(7, "Two years in deep space", EventKind::years(2, 13, 14, 4)),
            Location::new(8, "Uncharted space", EventKind::randomised(9, 10, 3)),
            Location::new(9, "Gravity well", EventKind::randomised(2, 11, 3)),
            Location::new(10, "Asteroid drift", EventKind::randomised(8, 15, 3)),
            Location::new(11, "Black hole", EventKind::death(LossCause::BlackHole)),
            Location::new(12, "Snudl-1", EventKind::win()),
            Location::new(13, "The long haul", EventKind::randomised(6, 15, 3)),
            Location::new(
                14,
                "Provisions running low",
                EventKind::low_provisions(
                    2,
                    3,
                    "go for snudl",
                    "try to restock at a previous planet",
                ),
            ),
            Location::new(15, "Gravy Flu outbreak", EventKind::disease(6, 7, 3)),
        ])
    }

    /// Shared instance of the standard wiring.
    #[must_use]
    pub fn standard_table() -> &'static Self {
        static TABLE: OnceLock<LocationTable> = OnceLock::new();
        TABLE.get_or_init(Self::standard)
    }

    #[must_use]
    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: LocationId) -> bool {
        self.locations.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Check that the graph is closed and every location has a way to end
    /// the voyage.
    ///
    /// # Errors
    ///
    /// Returns a `TableError` describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), TableError> {
        if !self.contains(LocationId::START) {
            return Err(TableError::MissingStart {
                start: LocationId::START,
            });
        }
        for location in self.iter() {
            if let Some(to) = location
                .event
                .successors()
                .into_iter()
                .find(|to| !self.contains(*to))
            {
                return Err(TableError::DanglingSuccessor {
                    from: location.id,
                    to,
                });
            }
        }
        let stranded = self.stranded();
        if !stranded.is_empty() {
            return Err(TableError::NoWayHome { stranded });
        }
        Ok(())
    }

    /// Locations from which no event that can end the voyage is reachable.
    #[must_use]
    pub fn stranded(&self) -> Vec<LocationId> {
        let mut can_end: BTreeSet<LocationId> = self
            .iter()
            .filter(|location| location.event.can_finish())
            .map(|location| location.id)
            .collect();

        loop {
            let before = can_end.len();
            for location in self.iter() {
                if !can_end.contains(&location.id)
                    && location
                        .event
                        .successors()
                        .iter()
                        .any(|to| can_end.contains(to))
                {
                    can_end.insert(location.id);
                }
            }
            if can_end.len() == before {
                break;
            }
        }

        self.locations
            .keys()
            .filter(|id| !can_end.contains(id))
            .copied()
            .collect()
    }

    /// Every location reachable from the start.
    #[must_use]
    pub fn reachable(&self) -> BTreeSet<LocationId> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![LocationId::START];
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(location) = self.get(id) {
                pending.extend(location.event.successors());
            }
        }
        seen
    }
}
