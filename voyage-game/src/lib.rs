//! Return Voyage Engine
//!
//! Core logic for the epilogue of *The Awful Green Things from Outer Space*:
//! each surviving boat flies a fixed graph of fifteen locations, every
//! location runs a configured event, and the voyage ends either with the boat
//! lost or home at Snudl-1 with the constitution of its normal crew as score.
//! This crate has no I/O of its own; decisions and messages go through the
//! [`ChoiceProvider`] and [`Reporter`] traits.

pub mod crew;
pub mod dice;
pub mod events;
pub mod locations;
pub mod provider;
pub mod ship;
pub mod voyage;

// Re-export commonly used types
pub use crew::{Crew, Crewmate, Role, Roster, RosterError};
pub use dice::{DIE_FACES, Dice, RngDice, derive_stream_seed, roll};
pub use events::{Branch, EventContext, EventKind, Fork, LossCause, Outcome};
pub use locations::{Location, LocationId, LocationTable, TableError};
pub use provider::{Choice, ChoiceProvider, Reporter, SilentReporter};
pub use ship::{PROVISION_YEARS, Provisions, Ship, ShipStatus};
pub use voyage::{Adrift, Voyage, VoyageRecord, resolve_voyage};
