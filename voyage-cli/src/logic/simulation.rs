use serde::Serialize;
use std::collections::BTreeMap;

use voyage_game::{
    EventContext, LocationTable, LossCause, Reporter, RngDice, Roster, Voyage, derive_stream_seed,
};

use crate::logic::policy::ChoicePolicy;

/// Configuration for one batch of simulated voyages.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub policy: ChoicePolicy,
    pub iterations: u32,
    pub max_steps: usize,
}

impl SimulationConfig {
    pub const DEFAULT_MAX_STEPS: usize = 10_000;

    #[must_use]
    pub const fn new(policy: ChoicePolicy, seed: u64) -> Self {
        Self {
            seed,
            policy,
            iterations: 1,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// How a simulated voyage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "cause", rename_all = "snake_case")]
pub enum Ending {
    Home,
    Lost(LossCause),
    /// Step budget ran out before any terminal event.
    Adrift,
}

impl Ending {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Lost(_) => "lost",
            Self::Adrift => "adrift",
        }
    }

    #[must_use]
    pub const fn cause(self) -> Option<LossCause> {
        match self {
            Self::Lost(cause) => Some(cause),
            Self::Home | Self::Adrift => None,
        }
    }
}

/// One simulated voyage.
#[derive(Debug, Clone, Serialize)]
pub struct VoyageRun {
    pub seed: u64,
    pub boat: u32,
    pub policy: ChoicePolicy,
    pub ending: Ending,
    pub score: u32,
    pub steps: usize,
    pub dice_thrown: u64,
    pub crew_remaining: usize,
}

/// Reporter that only remembers how the voyage ended.
#[derive(Debug, Default)]
struct EndingRecorder {
    lost: Option<LossCause>,
    home: bool,
}

impl Reporter for EndingRecorder {
    fn ship_lost(&mut self, cause: LossCause) {
        self.lost = Some(cause);
    }

    fn returned_home(&mut self, _score: u32) {
        self.home = true;
    }
}

/// Sail a single boat with its own dice and helm streams.
#[must_use]
pub fn sail_once(
    table: &LocationTable,
    roster: &Roster,
    config: SimulationConfig,
    boat: u32,
) -> VoyageRun {
    let mut dice = RngDice::for_boat(config.seed, boat);
    let helm_seed = derive_stream_seed(config.seed, format!("helm-{boat}").as_bytes());
    let mut helm = config.policy.create_helm(helm_seed);
    let mut recorder = EndingRecorder::default();

    let result = {
        let mut ctx = EventContext::new(&mut dice, helm.as_mut(), &mut recorder);
        Voyage::new(table, roster.to_crew()).run_bounded(&mut ctx, config.max_steps)
    };

    let (ending, score, steps, crew_remaining) = match result {
        Ok(record) => {
            let ending = match recorder.lost {
                Some(cause) => Ending::Lost(cause),
                None => Ending::Home,
            };
            (ending, record.score, record.steps(), record.crew_remaining)
        }
        Err(adrift) => {
            log::warn!(
                "seed {} boat {boat} ({}) adrift: {adrift}",
                config.seed,
                config.policy.key()
            );
            (Ending::Adrift, 0, adrift.steps, 0)
        }
    };
    debug_assert!(ending != Ending::Home || recorder.home);

    VoyageRun {
        seed: config.seed,
        boat,
        policy: config.policy,
        ending,
        score,
        steps,
        dice_thrown: dice.thrown(),
        crew_remaining,
    }
}

/// Sail `config.iterations` boats with the same roster.
#[must_use]
pub fn run_simulation(
    table: &LocationTable,
    roster: &Roster,
    config: SimulationConfig,
) -> Vec<VoyageRun> {
    (0..config.iterations)
        .map(|boat| sail_once(table, roster, config, boat))
        .collect()
}

/// Summary statistics for one helm policy.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyAggregate {
    pub policy: ChoicePolicy,
    pub voyages: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub mean_score: f64,
    pub std_score: f64,
    pub max_score: u32,
    pub mean_steps: f64,
    pub mean_dice_thrown: f64,
    pub adrift: usize,
    pub losses: BTreeMap<LossCause, usize>,
}

pub fn aggregate_runs(runs: &[VoyageRun]) -> Vec<PolicyAggregate> {
    let mut aggregates: BTreeMap<ChoicePolicy, AggregateBuilder> = BTreeMap::new();
    for run in runs {
        aggregates
            .entry(run.policy)
            .or_insert_with(|| AggregateBuilder::new(run.policy))
            .ingest(run);
    }
    aggregates
        .into_values()
        .map(AggregateBuilder::finish)
        .collect()
}

#[derive(Debug, Clone)]
struct AggregateBuilder {
    policy: ChoicePolicy,
    voyages: usize,
    wins: usize,
    adrift: usize,
    max_score: u32,
    scores: RunningStats,
    steps: RunningStats,
    dice: RunningStats,
    losses: BTreeMap<LossCause, usize>,
}

impl AggregateBuilder {
    fn new(policy: ChoicePolicy) -> Self {
        Self {
            policy,
            voyages: 0,
            wins: 0,
            adrift: 0,
            max_score: 0,
            scores: RunningStats::default(),
            steps: RunningStats::default(),
            dice: RunningStats::default(),
            losses: BTreeMap::new(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ingest(&mut self, run: &VoyageRun) {
        self.voyages += 1;
        match run.ending {
            Ending::Home => self.wins += 1,
            Ending::Lost(cause) => *self.losses.entry(cause).or_insert(0) += 1,
            Ending::Adrift => self.adrift += 1,
        }
        self.max_score = self.max_score.max(run.score);
        self.scores.add(f64::from(run.score));
        self.steps.add(run.steps as f64);
        self.dice.add(run.dice_thrown as f64);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> PolicyAggregate {
        let denom = self.voyages.max(1) as f64;
        PolicyAggregate {
            policy: self.policy,
            voyages: self.voyages,
            wins: self.wins,
            win_rate: self.wins as f64 / denom,
            mean_score: self.scores.mean(),
            std_score: self.scores.std_dev(),
            max_score: self.max_score,
            mean_steps: self.steps.mean(),
            mean_dice_thrown: self.dice.mean(),
            adrift: self.adrift,
            losses: self.losses,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let count = f64::from(self.count);
        let delta = value - self.mean;
        self.mean += delta / count;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    const fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    fn std_dev(&self) -> f64 {
        if self.count > 1 {
            (self.m2 / f64::from(self.count - 1)).sqrt()
        } else {
            0.0
        }
    }
}
