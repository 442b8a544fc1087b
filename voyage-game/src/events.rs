//! Event kinds bound to locations and the logic that resolves them.
//!
//! Every location runs one configured [`EventKind`]. Resolving an event either
//! moves the boat (the new location is already written into the ship when
//! [`Outcome::Continue`] comes back) or ends the voyage with a score.
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::fmt;

use crate::dice::Dice;
use crate::locations::LocationId;
use crate::provider::{Choice, ChoiceProvider, Reporter};
use crate::ship::{PROVISION_YEARS, Ship};

/// Dice each crewmate must beat with their constitution to survive Gravy Flu.
pub const DISEASE_DICE: u32 = 4;

/// Result of resolving one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "score", rename_all = "snake_case")]
pub enum Outcome {
    Continue,
    Finished(u32),
}

impl Outcome {
    #[must_use]
    pub const fn score(self) -> Option<u32> {
        match self {
            Self::Continue => None,
            Self::Finished(score) => Some(score),
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Why a boat was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossCause {
    BlackHole,
    GravyFlu,
    Overrun,
    Starved,
    OutOfFood,
}

impl LossCause {
    pub const ALL: [Self; 5] = [
        Self::BlackHole,
        Self::GravyFlu,
        Self::Overrun,
        Self::Starved,
        Self::OutOfFood,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BlackHole => "black_hole",
            Self::GravyFlu => "gravy_flu",
            Self::Overrun => "overrun",
            Self::Starved => "starved",
            Self::OutOfFood => "out_of_food",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BlackHole => "spaghettified by black hole",
            Self::GravyFlu => "Everyone got Gravy Flu and died.",
            Self::Overrun => {
                "Your aliens fought an alien incursion. The aliens won. \
                 The other aliens, that is; all your crew are dead."
            }
            Self::Starved => "You ran out of hard tack and swill. Your crew starved to death.",
            Self::OutOfFood => "Out of food",
        }
    }
}

impl fmt::Display for LossCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Two-way random branch: one die, `first` on a roll at or under `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub first: LocationId,
    pub second: LocationId,
    pub threshold: u32,
}

impl Branch {
    #[must_use]
    pub const fn new(first: u8, second: u8, threshold: u32) -> Self {
        Self {
            first: LocationId::new(first),
            second: LocationId::new(second),
            threshold,
        }
    }

    fn take(self, ship: &mut Ship, dice: &mut dyn Dice) -> Outcome {
        let roll = dice.roll(1);
        ship.location = if roll <= self.threshold {
            self.first
        } else {
            self.second
        };
        Outcome::Continue
    }
}

/// Two-way player decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fork {
    pub first: Choice,
    pub second: Choice,
}

impl Fork {
    #[must_use]
    pub const fn new(first: u8, second: u8, first_desc: &'static str, second_desc: &'static str) -> Self {
        Self {
            first: Choice::new(LocationId::new(first), first_desc),
            second: Choice::new(LocationId::new(second), second_desc),
        }
    }

    fn decide(self, ship: &mut Ship, ctx: &mut EventContext<'_>) -> Outcome {
        ctx.reporter.status(&ship.status());
        let picked = ctx.chooser.choose(self.first, self.second);
        debug_assert!(
            picked == self.first.location || picked == self.second.location,
            "choice provider returned {picked}, expected {} or {}",
            self.first.location,
            self.second.location
        );
        ship.location = picked;
        Outcome::Continue
    }
}

/// Collaborators an event may call on while it resolves.
pub struct EventContext<'a> {
    pub dice: &'a mut dyn Dice,
    pub chooser: &'a mut dyn ChoiceProvider,
    pub reporter: &'a mut dyn Reporter,
}

impl<'a> EventContext<'a> {
    pub fn new(
        dice: &'a mut dyn Dice,
        chooser: &'a mut dyn ChoiceProvider,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            dice,
            chooser,
            reporter,
        }
    }

    fn lost(&mut self, cause: LossCause) -> Outcome {
        log::debug!("ship lost: {cause}");
        self.reporter.ship_lost(cause);
        Outcome::Finished(0)
    }
}

/// Configured event bound to a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Randomised(Branch),
    Decision(Fork),
    /// Gravy Flu: every crewmate rolls for survival, then a random branch.
    Disease(Branch),
    /// Skirmish with the natives of an inhabited planet.
    Fight {
        refill: LocationId,
        failure: LocationId,
    },
    /// Restock, then a random branch.
    Refill(Branch),
    /// Take on two years of food and decide; a second shortage starves the crew.
    LowProvisions(Fork),
    /// Time passes and food is eaten, then a random branch.
    Years { years: i32, branch: Branch },
    Death(LossCause),
    /// Home at Snudl-1.
    Win,
}

impl EventKind {
    #[must_use]
    pub const fn randomised(first: u8, second: u8, threshold: u32) -> Self {
        Self::Randomised(Branch::new(first, second, threshold))
    }

    #[must_use]
    pub const fn decision(
        first: u8,
        second: u8,
        first_desc: &'static str,
        second_desc: &'static str,
    ) -> Self {
        Self::Decision(Fork::new(first, second, first_desc, second_desc))
    }

    #[must_use]
    pub const fn disease(first: u8, second: u8, threshold: u32) -> Self {
        Self::Disease(Branch::new(first, second, threshold))
    }

    #[must_use]
    pub const fn fight(refill: u8, failure: u8) -> Self {
        Self::Fight {
            refill: LocationId::new(refill),
            failure: LocationId::new(failure),
        }
    }

    #[must_use]
    pub const fn refill(first: u8, second: u8, threshold: u32) -> Self {
        Self::Refill(Branch::new(first, second, threshold))
    }

    #[must_use]
    pub const fn low_provisions(
        first: u8,
        second: u8,
        first_desc: &'static str,
        second_desc: &'static str,
    ) -> Self {
        Self::LowProvisions(Fork::new(first, second, first_desc, second_desc))
    }

    #[must_use]
    pub const fn years(years: i32, first: u8, second: u8, threshold: u32) -> Self {
        Self::Years {
            years,
            branch: Branch::new(first, second, threshold),
        }
    }

    #[must_use]
    pub const fn death(cause: LossCause) -> Self {
        Self::Death(cause)
    }

    #[must_use]
    pub const fn win() -> Self {
        Self::Win
    }

    /// Short name of the event kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Randomised(_) => "randomised",
            Self::Decision(_) => "decision",
            Self::Disease(_) => "disease",
            Self::Fight { .. } => "fight",
            Self::Refill(_) => "refill",
            Self::LowProvisions(_) => "low_provisions",
            Self::Years { .. } => "years",
            Self::Death(_) => "death",
            Self::Win => "win",
        }
    }

    /// Locations this event can send the boat to.
    #[must_use]
    pub fn successors(&self) -> SmallVec<[LocationId; 2]> {
        match *self {
            Self::Randomised(branch)
            | Self::Disease(branch)
            | Self::Refill(branch)
            | Self::Years { branch, .. } => smallvec![branch.first, branch.second],
            Self::Decision(fork) | Self::LowProvisions(fork) => {
                smallvec![fork.first.location, fork.second.location]
            }
            // The failure target is always overwritten by the refill target.
            Self::Fight { refill, .. } => smallvec![refill],
            Self::Death(_) | Self::Win => SmallVec::new(),
        }
    }

    /// Whether resolving this event can end the voyage.
    #[must_use]
    pub const fn can_finish(&self) -> bool {
        !matches!(self, Self::Randomised(_) | Self::Decision(_) | Self::Refill(_))
    }

    /// Resolve the event against `ship`.
    pub fn resolve(&self, ship: &mut Ship, ctx: &mut EventContext<'_>) -> Outcome {
        match *self {
            Self::Randomised(branch) => branch.take(ship, ctx.dice),
            Self::Decision(fork) => fork.decide(ship, ctx),
            Self::Disease(branch) => gravy_flu(branch, ship, ctx),
            Self::Fight { refill, failure } => native_battle(refill, failure, ship, ctx),
            Self::Refill(branch) => {
                ship.needs_provisions = false;
                branch.take(ship, ctx.dice)
            }
            Self::LowProvisions(fork) => {
                if ship.needs_provisions {
                    return ctx.lost(LossCause::Starved);
                }
                ship.needs_provisions = true;
                ship.provisions_remaining = PROVISION_YEARS;
                fork.decide(ship, ctx)
            }
            Self::Years { years, branch } => {
                ship.provisions_remaining = ship.provisions_remaining.saturating_sub(years);
                if ship.needs_provisions && ship.provisions_remaining <= 0 {
                    return ctx.lost(LossCause::OutOfFood);
                }
                branch.take(ship, ctx.dice)
            }
            Self::Death(cause) => ctx.lost(cause),
            Self::Win => {
                let score = ship.score();
                log::debug!("returned to Snudl-1 with score {score}");
                ctx.reporter.returned_home(score);
                Outcome::Finished(score)
            }
        }
    }
}

fn gravy_flu(branch: Branch, ship: &mut Ship, ctx: &mut EventContext<'_>) -> Outcome {
    // `retain` visits each crewmate present at the start exactly once, in
    // order, no matter how many are dropped along the way.
    let dice = &mut *ctx.dice;
    ship.crew
        .retain(|mate| mate.constitution() > dice.roll(DISEASE_DICE));
    if ship.is_crew_lost() {
        return ctx.lost(LossCause::GravyFlu);
    }
    branch.take(ship, ctx.dice)
}

fn native_battle(
    refill: LocationId,
    failure: LocationId,
    ship: &mut Ship,
    ctx: &mut EventContext<'_>,
) -> Outcome {
    let natives = ctx.dice.roll(1);
    let native_attack = ctx.dice.roll(natives);
    let crew_attack = ctx.dice.roll(ship.attack_dice());
    log::debug!("{natives} natives attack for {native_attack}, crew answers with {crew_attack}");

    if native_attack >= crew_attack {
        if ship.is_crew_lost() {
            return ctx.lost(LossCause::Overrun);
        }
        let victim = ctx.dice.pick(ship.crew_count());
        ship.crew.remove(victim);
        if ship.is_crew_lost() {
            return ctx.lost(LossCause::Overrun);
        }
        // Overwritten by the refill target below: a lost skirmish still sails
        // on to resupply, so `failure` is never reached.
        ship.location = failure;
    }
    ship.location = refill;
    Outcome::Continue
}
