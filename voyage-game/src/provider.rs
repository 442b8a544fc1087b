//! Boundaries to whoever steers the boat and whoever watches it.
use crate::events::LossCause;
use crate::locations::LocationId;
use crate::ship::ShipStatus;

/// One of the two courses offered at a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub location: LocationId,
    pub description: &'static str,
}

impl Choice {
    #[must_use]
    pub const fn new(location: LocationId, description: &'static str) -> Self {
        Self {
            location,
            description,
        }
    }
}

/// Picks a course at decision points.
///
/// Implementations must return one of the two offered locations; validation
/// and re-prompting are their responsibility.
pub trait ChoiceProvider {
    fn choose(&mut self, first: Choice, second: Choice) -> LocationId;
}

impl<F> ChoiceProvider for F
where
    F: FnMut(Choice, Choice) -> LocationId,
{
    fn choose(&mut self, first: Choice, second: Choice) -> LocationId {
        self(first, second)
    }
}

/// Receives progress and end-of-voyage messages. Every hook defaults to a no-op.
pub trait Reporter {
    /// The boat reached a location and its event is about to resolve.
    fn arrived(&mut self, _location: LocationId, _description: &'static str) {}

    /// Ship status shown before a decision.
    fn status(&mut self, _status: &ShipStatus) {}

    /// The boat was lost; the voyage scores zero.
    fn ship_lost(&mut self, _cause: LossCause) {}

    /// The boat made it home with `score`.
    fn returned_home(&mut self, _score: u32) {}
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}
