//! Interactive multi-boat campaign played at the console.
use anyhow::Result;
use std::io::{BufRead, Write};

use voyage_game::{Crewmate, EventContext, LocationTable, RngDice, Voyage};

use crate::console::{ConsoleReporter, Prompter, SharedOutput};

/// One sitting at the console: any number of campaigns, each with any
/// number of boats.
pub struct Campaign<'t, R, W> {
    table: &'t LocationTable,
    prompter: Prompter<R, W>,
    reporter: ConsoleReporter<SharedOutput<W>>,
    seed: Option<u64>,
    boats_launched: u32,
}

impl<'t, R: BufRead, W: Write> Campaign<'t, R, W> {
    /// With a seed every boat draws from its own derived dice stream, so a
    /// replay with the same answers reproduces the whole sitting.
    pub fn new(table: &'t LocationTable, input: R, output: W, seed: Option<u64>) -> Self {
        let output = SharedOutput::new(output);
        Self {
            table,
            prompter: Prompter::new(input, output.clone()),
            reporter: ConsoleReporter::new(output),
            seed,
            boats_launched: 0,
        }
    }

    /// Play campaigns until the player declines another.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.play_once()?;
            if !self.prompter.ask_yes("Play again? y/N ")? {
                return Ok(());
            }
        }
    }

    /// Play one campaign and return its total score.
    pub fn play_once(&mut self) -> Result<u32> {
        let mut total = 0;
        let boats = self.prompter.ask_positive("How many boats? ")?;

        for boat in 1..=boats {
            self.prompter.say(&format!("Boat {boat}"))?;
            let crew = self.enlist_crew(boat)?;
            total = self.sail(crew).saturating_add(total);
            self.prompter.say(&format!("New score: {total}"))?;
        }

        self.prompter.say(&format!("Final score: {total}"))?;
        log::info!("campaign of {boats} boats finished with score {total}");
        Ok(total)
    }

    fn enlist_crew(&mut self, boat: u32) -> Result<Vec<Crewmate>> {
        let count = self
            .prompter
            .ask_positive("How many crew are flying today? ")?;
        let mut crew = Vec::new();
        for index in 1..=count {
            self.prompter
                .say(&format!("Ship {boat}: crew {index} of {count}"))?;
            let special = self
                .prompter
                .ask_yes("Is this crew member a robot or mascot? y/N  ")?;
            let constitution = self
                .prompter
                .ask_positive("How much constitution does this crew member have? ")?;
            let attack_dice = self.prompter.ask_positive("How many attack dice? ")?;

            self.prompter.say(&format!(
                "Successfully input a {}robot/mascot.",
                if special { "" } else { "non-" }
            ))?;
            self.prompter
                .say(&format!("Con: {constitution}, Atk: {attack_dice}"))?;
            self.prompter.say("")?;

            crew.push(if special {
                Crewmate::special(constitution, attack_dice)
            } else {
                Crewmate::normal(constitution, attack_dice)
            });
        }
        Ok(crew)
    }

    fn sail(&mut self, crew: Vec<Crewmate>) -> u32 {
        let boat = self.boats_launched;
        self.boats_launched += 1;
        let mut dice = match self.seed {
            Some(seed) => RngDice::for_boat(seed, boat),
            None => RngDice::from_entropy(),
        };
        let mut ctx = EventContext::new(&mut dice, &mut self.prompter, &mut self.reporter);
        let record = Voyage::new(self.table, crew).run(&mut ctx);
        log::debug!(
            "boat {boat} scored {} after {} steps",
            record.score,
            record.steps()
        );
        record.score
    }
}
