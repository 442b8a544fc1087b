//! Resolution loop driving one boat from location 1 to a final score.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crew::Crewmate;
use crate::dice::Dice;
use crate::events::{EventContext, Outcome};
use crate::locations::{LocationId, LocationTable};
use crate::provider::{ChoiceProvider, Reporter};
use crate::ship::Ship;

/// Final result of a voyage plus the route it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoyageRecord {
    pub score: u32,
    /// Every location visited, in order, including the one that ended the voyage.
    pub logbook: Vec<LocationId>,
    pub crew_remaining: usize,
}

impl VoyageRecord {
    #[must_use]
    pub fn steps(&self) -> usize {
        self.logbook.len()
    }

    #[must_use]
    pub fn final_location(&self) -> Option<LocationId> {
        self.logbook.last().copied()
    }
}

/// Raised by [`Voyage::run_bounded`] when the step budget runs out.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("voyage still adrift at location {location} after {steps} steps")]
pub struct Adrift {
    pub location: LocationId,
    pub steps: usize,
}

/// One boat's voyage over a location table.
#[derive(Debug, Clone)]
pub struct Voyage<'t> {
    table: &'t LocationTable,
    ship: Ship,
    logbook: Vec<LocationId>,
}

impl<'t> Voyage<'t> {
    #[must_use]
    pub fn new(table: &'t LocationTable, crew: impl IntoIterator<Item = Crewmate>) -> Self {
        Self::from_ship(table, Ship::new(crew))
    }

    /// Resume from an arbitrary ship state.
    #[must_use]
    pub const fn from_ship(table: &'t LocationTable, ship: Ship) -> Self {
        Self {
            table,
            ship,
            logbook: Vec::new(),
        }
    }

    #[must_use]
    pub const fn ship(&self) -> &Ship {
        &self.ship
    }

    #[must_use]
    pub fn logbook(&self) -> &[LocationId] {
        &self.logbook
    }

    /// Resolve the event at the ship's current location.
    ///
    /// # Panics
    ///
    /// Panics if the ship sits on a location the table does not contain; that
    /// is a wiring defect, not a game outcome.
    pub fn step(&mut self, ctx: &mut EventContext<'_>) -> Outcome {
        let at = self.ship.location;
        let Some(location) = self.table.get(at) else {
            panic!("location {at} is not wired into the location table");
        };
        log::debug!("boat at {} ({})", location.id, location.description);
        ctx.reporter.arrived(location.id, location.description);
        self.logbook.push(location.id);
        location.event.resolve(&mut self.ship, ctx)
    }

    /// Run until a terminal event produces a score.
    pub fn run(mut self, ctx: &mut EventContext<'_>) -> VoyageRecord {
        loop {
            if let Some(score) = self.step(ctx).score() {
                return self.finish(score);
            }
        }
    }

    /// Run with a cap on the number of events resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Adrift`] if no terminal event is reached within `max_steps`.
    pub fn run_bounded(
        mut self,
        ctx: &mut EventContext<'_>,
        max_steps: usize,
    ) -> Result<VoyageRecord, Adrift> {
        while self.logbook.len() < max_steps {
            if let Some(score) = self.step(ctx).score() {
                return Ok(self.finish(score));
            }
        }
        Err(Adrift {
            location: self.ship.location,
            steps: self.logbook.len(),
        })
    }

    fn finish(self, score: u32) -> VoyageRecord {
        log::debug!(
            "voyage finished after {} steps with score {score}",
            self.logbook.len()
        );
        VoyageRecord {
            score,
            crew_remaining: self.ship.crew_count(),
            logbook: self.logbook,
        }
    }
}

/// Resolve a full voyage for `crew` and return its score.
pub fn resolve_voyage(
    crew: impl IntoIterator<Item = Crewmate>,
    table: &LocationTable,
    dice: &mut dyn Dice,
    chooser: &mut dyn ChoiceProvider,
    reporter: &mut dyn Reporter,
) -> u32 {
    let mut ctx = EventContext::new(dice, chooser, reporter);
    Voyage::new(table, crew).run(&mut ctx).score
}
