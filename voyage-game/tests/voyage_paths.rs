use std::collections::VecDeque;

use voyage_game::{
    Choice, ChoiceProvider, Crewmate, Dice, EventContext, LocationId, LocationTable, LossCause,
    Reporter, RngDice, ShipStatus, SilentReporter, Voyage, resolve_voyage,
};

/// Dice replaying a fixed sequence of faces.
struct LoadedDice {
    faces: VecDeque<u32>,
}

impl LoadedDice {
    fn new(faces: &[u32]) -> Self {
        Self {
            faces: faces.iter().copied().collect(),
        }
    }

    fn exhausted(&self) -> bool {
        self.faces.is_empty()
    }
}

impl Dice for LoadedDice {
    fn face(&mut self) -> u32 {
        self.faces.pop_front().expect("ran out of scripted faces")
    }

    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

/// Chooser answering decisions from a script of location ids.
struct ScriptedHelm {
    answers: VecDeque<u8>,
    offered: Vec<(LocationId, LocationId)>,
}

impl ScriptedHelm {
    fn new(answers: &[u8]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            offered: Vec::new(),
        }
    }
}

impl ChoiceProvider for ScriptedHelm {
    fn choose(&mut self, first: Choice, second: Choice) -> LocationId {
        self.offered.push((first.location, second.location));
        LocationId::new(self.answers.pop_front().expect("ran out of scripted answers"))
    }
}

#[derive(Default)]
struct Journal {
    arrivals: Vec<u8>,
    statuses: Vec<ShipStatus>,
    lost: Vec<LossCause>,
    home: Vec<u32>,
}

impl Reporter for Journal {
    fn arrived(&mut self, location: LocationId, _description: &'static str) {
        self.arrivals.push(location.get());
    }

    fn status(&mut self, status: &ShipStatus) {
        self.statuses.push(*status);
    }

    fn ship_lost(&mut self, cause: LossCause) {
        self.lost.push(cause);
    }

    fn returned_home(&mut self, score: u32) {
        self.home.push(score);
    }
}

fn sail(
    crew: &[Crewmate],
    faces: &[u32],
    answers: &[u8],
) -> (voyage_game::VoyageRecord, Journal, LoadedDice, ScriptedHelm) {
    let table = LocationTable::standard();
    let mut dice = LoadedDice::new(faces);
    let mut helm = ScriptedHelm::new(answers);
    let mut journal = Journal::default();
    let record = {
        let mut ctx = EventContext::new(&mut dice, &mut helm, &mut journal);
        Voyage::new(&table, crew.iter().copied()).run(&mut ctx)
    };
    (record, journal, dice, helm)
}

#[test]
fn forced_route_home_scores_only_normal_crew() {
    // 1 -(choose 3)-> 3 -(5)-> 6 -(5)-> 12
    let crew = [Crewmate::normal(5, 1), Crewmate::special(10, 1)];
    let (record, journal, dice, helm) = sail(&crew, &[5, 5], &[3]);

    assert_eq!(record.score, 5);
    assert_eq!(journal.arrivals, vec![1, 3, 6, 12]);
    assert_eq!(journal.home, vec![5]);
    assert!(journal.lost.is_empty());
    assert!(dice.exhausted());
    assert_eq!(helm.offered, vec![(LocationId::new(7), LocationId::new(3))]);
}

#[test]
fn resolve_voyage_entry_point_matches_forced_route() {
    let table = LocationTable::standard();
    let mut dice = LoadedDice::new(&[5, 5]);
    let mut helm = ScriptedHelm::new(&[3]);
    let mut reporter = SilentReporter;
    let score = resolve_voyage(
        [Crewmate::normal(5, 1), Crewmate::special(10, 1)],
        &table,
        &mut dice,
        &mut helm,
        &mut reporter,
    );
    assert_eq!(score, 5);
}

#[test]
fn decision_status_reports_sufficient_provisions_at_launch() {
    let crew = [Crewmate::normal(5, 1), Crewmate::special(10, 1)];
    let (_, journal, _, _) = sail(&crew, &[5, 5], &[3]);

    assert_eq!(journal.statuses.len(), 1);
    let status = journal.statuses[0];
    assert_eq!(status.location, LocationId::START);
    assert_eq!(status.crew_count, 2);
    assert_eq!(status.score, 5);
    assert_eq!(status.provisions, voyage_game::Provisions::Sufficient);
}

#[test]
fn gravy_flu_wiping_the_crew_scores_zero() {
    // 1 -(choose 7)-> 7 -(1)-> 13 -(4)-> 15, both crewmates roll 24.
    let crew = [Crewmate::normal(20, 3), Crewmate::special(7, 0)];
    let faces = [1, 4, 6, 6, 6, 6, 6, 6, 6, 6];
    let (record, journal, dice, _) = sail(&crew, &faces, &[7]);

    assert_eq!(record.score, 0);
    assert_eq!(record.crew_remaining, 0);
    assert_eq!(journal.arrivals, vec![1, 7, 13, 15]);
    assert_eq!(journal.lost, vec![LossCause::GravyFlu]);
    assert!(dice.exhausted());
}

#[test]
fn running_out_of_food_after_the_shortage_is_death() {
    // 1 -(7)-> 7 -(5)-> 14 -(choose 2)-> 2 -(years: 1 left, roll 1)-> 7 -> starved of food.
    let crew = [Crewmate::normal(8, 2)];
    let (record, journal, _, helm) = sail(&crew, &[5, 1], &[7, 2]);

    assert_eq!(record.score, 0);
    assert_eq!(journal.arrivals, vec![1, 7, 14, 2, 7]);
    assert_eq!(journal.lost, vec![LossCause::OutOfFood]);
    assert_eq!(helm.offered.len(), 2);
    // Second decision happens after the countdown starts.
    assert_eq!(
        journal.statuses[1].provisions,
        voyage_game::Provisions::Needed { years_left: 2 }
    );
}

#[test]
fn winning_a_fight_leads_to_restock_and_home() {
    // 1 -(3)-> 3 -(2)-> 4 -(choose 5)-> 5: one native rolls 1, crew rolls 2d6 = 7.
    // 5 -> 6 -(6)-> 12.
    let crew = [Crewmate::normal(5, 2), Crewmate::special(10, 0)];
    let faces = [2, 1, 1, 3, 4, 6];
    let (record, journal, dice, _) = sail(&crew, &faces, &[3, 5]);

    assert_eq!(record.score, 5);
    assert_eq!(journal.arrivals, vec![1, 3, 4, 5, 6, 12]);
    assert!(dice.exhausted());
}

#[test]
fn losing_the_only_crewmate_in_a_fight_scores_zero() {
    let crew = [Crewmate::normal(5, 0)];
    let faces = [2, 1, 6];
    let (record, journal, _, _) = sail(&crew, &faces, &[3, 5]);

    assert_eq!(record.score, 0);
    assert_eq!(journal.lost, vec![LossCause::Overrun]);
    assert_eq!(record.final_location(), Some(LocationId::new(5)));
}

#[test]
fn black_hole_ends_the_voyage() {
    // 1 -(3)-> 3 -(1)-> 4 -(choose 8)-> 8 -(1)-> 9 -(6)-> 11
    let crew = [Crewmate::normal(9, 2)];
    let (record, journal, _, _) = sail(&crew, &[1, 1, 6], &[3, 8]);

    assert_eq!(record.score, 0);
    assert_eq!(journal.lost, vec![LossCause::BlackHole]);
    assert_eq!(journal.arrivals, vec![1, 3, 4, 8, 9, 11]);
}

#[test]
fn seeded_voyages_are_reproducible() {
    let table = LocationTable::standard();
    let crew = [Crewmate::normal(6, 2), Crewmate::normal(3, 1)];
    let run = |seed: u64| {
        let mut dice = RngDice::for_boat(seed, 0);
        let mut helm = |first: Choice, _: Choice| first.location;
        let mut reporter = SilentReporter;
        let mut ctx = EventContext::new(&mut dice, &mut helm, &mut reporter);
        Voyage::new(&table, crew).run(&mut ctx)
    };

    for seed in [1_u64, 42, 1337, 9001] {
        assert_eq!(run(seed), run(seed));
    }
}

#[test]
fn every_seeded_voyage_terminates_with_a_valid_score() {
    let table = LocationTable::standard();
    let crew = [
        Crewmate::normal(6, 2),
        Crewmate::normal(3, 1),
        Crewmate::special(12, 2),
    ];
    let max_score = 9;
    for seed in 0..500_u64 {
        let mut dice = RngDice::seeded(seed);
        let mut helm = |first: Choice, second: Choice| {
            if seed % 3 == 0 {
                first.location
            } else {
                second.location
            }
        };
        let mut journal = Journal::default();
        let mut ctx = EventContext::new(&mut dice, &mut helm, &mut journal);
        let record = Voyage::new(&table, crew)
            .run_bounded(&mut ctx, 5_000)
            .expect("voyage ends");
        assert!(record.score <= max_score);
        let endings = journal.lost.len() + journal.home.len();
        assert_eq!(endings, 1);
        if record.score > 0 {
            assert_eq!(record.final_location(), Some(LocationId::SNUDL));
        }
    }
}
