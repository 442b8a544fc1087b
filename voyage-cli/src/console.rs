//! Console prompts, the interactive helm, and the console reporter.
use anyhow::{Context, Result, bail};
use colored::Colorize;
#[cfg(test)]
use std::cell::Ref;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use voyage_game::{Choice, ChoiceProvider, LocationId, LossCause, Provisions, Reporter, ShipStatus};

/// Writer shared by the prompter and the reporter so their output interleaves.
#[derive(Debug)]
pub struct SharedOutput<W>(Rc<RefCell<W>>);

impl<W> SharedOutput<W> {
    pub fn new(inner: W) -> Self {
        Self(Rc::new(RefCell::new(inner)))
    }

    #[cfg(test)]
    pub fn borrow(&self) -> Ref<'_, W> {
        self.0.borrow()
    }
}

impl<W> Clone for SharedOutput<W> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<W: Write> Write for SharedOutput<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: SharedOutput<W>,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: SharedOutput<W>) -> Self {
        Self { input, output }
    }

    /// Next trimmed line, or `None` once input is closed.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush().context("failed to flush prompt")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until a positive integer is entered.
    pub fn ask_positive(&mut self, message: &str) -> Result<u32> {
        loop {
            write!(self.output, "{message}")?;
            let Some(line) = self.read_line()? else {
                bail!("input closed while waiting for: {}", message.trim());
            };
            match line.parse::<i64>() {
                Ok(value) if value >= 1 => match u32::try_from(value) {
                    Ok(value) => return Ok(value),
                    Err(_) => writeln!(self.output, "A positive integer please!")?,
                },
                Ok(_) => writeln!(self.output, "A positive integer please!")?,
                Err(_) => writeln!(self.output, "That's not a number :(")?,
            }
        }
    }

    /// Yes/no question where only `y` means yes.
    pub fn ask_yes(&mut self, message: &str) -> Result<bool> {
        write!(self.output, "{message}")?;
        Ok(self
            .read_line()?
            .is_some_and(|line| line.eq_ignore_ascii_case("y")))
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}

#[cfg(test)]
impl<R> Prompter<R, Vec<u8>> {
    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output.borrow()).into_owned()
    }
}

impl<R: BufRead, W: Write> ChoiceProvider for Prompter<R, W> {
    fn choose(&mut self, first: Choice, second: Choice) -> LocationId {
        let _ = writeln!(self.output, "Choose:");
        let _ = writeln!(self.output, "{}: {}", first.location, first.description);
        let _ = writeln!(self.output, "{}: {}", second.location, second.description);
        loop {
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) | Err(_) => {
                    log::warn!("input closed at a decision; taking course {}", first.location);
                    let _ = writeln!(self.output, "Input closed; taking course {}.", first.location);
                    return first.location;
                }
            };
            match line.parse::<u8>() {
                Ok(id) if id == first.location.get() => return first.location,
                Ok(id) if id == second.location.get() => return second.location,
                Ok(_) => {}
                Err(_) => {
                    let _ = writeln!(self.output, "enter a proper number");
                }
            }
        }
    }
}

/// Reporter printing arrivals, status lines, and endings to a console.
pub struct ConsoleReporter<W> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn arrived(&mut self, location: LocationId, description: &'static str) {
        let _ = writeln!(self.out, "@ {} {}", location, description.dimmed());
    }

    fn status(&mut self, status: &ShipStatus) {
        let _ = match status.provisions {
            Provisions::Needed { years_left } => {
                writeln!(self.out, "You need provisions in {years_left} years.")
            }
            Provisions::Sufficient => writeln!(self.out, "You have enough provisions for now."),
        };
        let _ = writeln!(
            self.out,
            "You have {} crewmembers, for a total score of {}!",
            status.crew_count, status.score
        );
    }

    fn ship_lost(&mut self, cause: LossCause) {
        let _ = writeln!(self.out, "{}", "ship lost!".red().bold());
        let _ = writeln!(self.out, "{}", cause.message());
    }

    fn returned_home(&mut self, score: u32) {
        let _ = writeln!(
            self.out,
            "{}",
            "A winner is you! Your boat returned safely home.".green().bold()
        );
        let _ = writeln!(self.out, "Total crew left for this boat: {score}");
    }
}
