mod campaign;
mod console;
mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdin, stdout};
use std::path::PathBuf;
use std::time::Instant;

use voyage_game::{LocationTable, Roster};

use campaign::Campaign;
use logic::simulation::Ending;
use logic::{
    PolicyAggregate, SimulationConfig, VoyageRun, aggregate_runs, parse_policies,
    resolve_seed_inputs, run_simulation,
};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Interactive campaign at the console
    Play,
    /// Batch voyages under automated choice policies
    Simulate,
}

#[derive(Debug, Parser)]
#[command(name = "voyage", version)]
#[command(about = "Return voyage companion for The Awful Green Things from Outer Space")]
struct Args {
    /// Play interactively or run a batch simulation
    #[arg(long, value_enum, default_value_t = RunMode::Play)]
    mode: RunMode,

    /// Seed for reproducible dice in play mode
    #[arg(long)]
    seed: Option<String>,

    /// Seeds to simulate (comma-separated; integers, 0x-hex, or `random`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Voyages per seed and policy (simulate mode)
    #[arg(long, default_value_t = 100)]
    iterations: u32,

    /// Choice policies to simulate (first,second,random or all)
    #[arg(long, default_value = "first,second,random")]
    policies: String,

    /// Crew as comma-separated CON:DICE[:special] tokens
    #[arg(long)]
    crew: Option<String>,

    /// Crew roster as a JSON file
    #[arg(long, conflicts_with = "crew")]
    crew_file: Option<PathBuf>,

    /// Abort a simulated voyage after this many events
    #[arg(long, default_value_t = SimulationConfig::DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = LocationTable::standard_table();
    table
        .validate()
        .context("the standard location table is miswired")?;

    match args.mode {
        RunMode::Play => run_play(&args, table),
        RunMode::Simulate => run_simulate(&args, table),
    }
}

fn announce_banner() {
    println!("{}", "🚀 Return Voyage Simulator".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn run_play(args: &Args, table: &LocationTable) -> Result<()> {
    let seed = match args.seed.as_deref() {
        Some(token) => {
            let seeds = resolve_seed_inputs(&[token.to_string()])?;
            seeds.first().copied()
        }
        None => None,
    };
    if let Some(seed) = seed {
        log::info!("playing with seed {seed}");
    }
    let mut campaign = Campaign::new(table, stdin().lock(), stdout().lock(), seed);
    campaign.run()
}

fn load_roster(args: &Args) -> Result<Roster> {
    if let Some(path) = &args.crew_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Roster::from_json(&json)
            .with_context(|| format!("invalid crew roster in {}", path.display()));
    }
    if let Some(tokens) = &args.crew {
        return Roster::from_tokens(tokens).context("invalid --crew tokens");
    }
    bail!("simulate mode needs a crew: pass --crew or --crew-file");
}

fn run_simulate(args: &Args, table: &LocationTable) -> Result<()> {
    let roster = load_roster(args)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let policies = parse_policies(&split_csv(&args.policies))?;

    announce_banner();
    let start_time = Instant::now();
    let runs = simulate_all(args, table, &roster, &seeds, &policies);
    let aggregates = aggregate_runs(&runs);

    write_reports(args, &runs, &aggregates, start_time)?;

    if runs.iter().any(|run| run.ending == Ending::Adrift) {
        std::process::exit(1);
    }
    Ok(())
}

fn simulate_all(
    args: &Args,
    table: &LocationTable,
    roster: &Roster,
    seeds: &[u64],
    policies: &[logic::ChoicePolicy],
) -> Vec<VoyageRun> {
    let mut runs = Vec::new();
    for &policy in policies {
        for &seed in seeds {
            let config = SimulationConfig::new(policy, seed)
                .with_iterations(args.iterations)
                .with_max_steps(args.max_steps);
            let batch = run_simulation(table, roster, config);
            if args.verbose {
                let wins = batch
                    .iter()
                    .filter(|run| run.ending == Ending::Home)
                    .count();
                println!(
                    "✅ [{} seed {}] {}/{} boats home",
                    policy.key().green(),
                    seed,
                    wins,
                    batch.len()
                );
            }
            runs.extend(batch);
        }
    }
    runs
}

fn write_reports(
    args: &Args,
    runs: &[VoyageRun],
    aggregates: &[PolicyAggregate],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, runs, aggregates)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, aggregates)?,
        "csv" => logic::reports::generate_csv_report(&mut output_target, runs)?,
        _ => {
            let duration = start_time.elapsed();
            if runs.is_empty() {
                writeln!(&mut output_target, "No voyages simulated.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    aggregates,
                    duration,
                )?;
            }
        }
    }

    if args.report == "console" {
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ChoicePolicy;

    fn base_args() -> Args {
        Args {
            mode: RunMode::Simulate,
            seed: None,
            seeds: "1337".to_string(),
            iterations: 5,
            policies: "first,second,random".to_string(),
            crew: Some("6:2,4:1,10:2:special".to_string()),
            crew_file: None,
            max_steps: SimulationConfig::DEFAULT_MAX_STEPS,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voyage-{}-{name}", std::process::id()))
    }

    #[test]
    fn args_parse_from_command_line() {
        let args = Args::try_parse_from([
            "voyage",
            "--mode",
            "simulate",
            "--crew",
            "5:1",
            "--iterations",
            "3",
        ])
        .unwrap();
        assert_eq!(args.mode, RunMode::Simulate);
        assert_eq!(args.iterations, 3);
        assert_eq!(args.max_steps, 10_000);
        assert_eq!(args.report, "console");
    }

    #[test]
    fn crew_and_crew_file_conflict() {
        let parsed = Args::try_parse_from([
            "voyage",
            "--crew",
            "5:1",
            "--crew-file",
            "crew.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn load_roster_prefers_file_then_tokens() {
        let path = temp_file("crew.json");
        std::fs::write(
            &path,
            r#"{"crew": [{"constitution": 7, "attack_dice": 2, "role": "special"}]}"#,
        )
        .unwrap();
        let args = Args {
            crew: None,
            crew_file: Some(path),
            ..base_args()
        };
        let roster = load_roster(&args).unwrap();
        assert_eq!(roster.crew.len(), 1);
        assert_eq!(roster.potential_score(), 0);

        let roster = load_roster(&base_args()).unwrap();
        assert_eq!(roster.potential_score(), 10);
    }

    #[test]
    fn load_roster_requires_a_crew() {
        let args = Args {
            crew: None,
            ..base_args()
        };
        let err = load_roster(&args).unwrap_err();
        assert!(err.to_string().contains("--crew"));
    }

    #[test]
    fn simulate_all_covers_every_policy_and_seed() {
        let args = base_args();
        let roster = load_roster(&args).unwrap();
        let runs = simulate_all(
            &args,
            LocationTable::standard_table(),
            &roster,
            &[1, 2],
            &[ChoicePolicy::First, ChoicePolicy::Random],
        );
        assert_eq!(runs.len(), 2 * 2 * 5);
        let aggregates = aggregate_runs(&runs);
        assert_eq!(aggregates.len(), 2);
        assert!(aggregates.iter().all(|a| a.voyages == 10));
    }

    #[test]
    fn write_reports_emits_each_format() {
        let args = base_args();
        let roster = load_roster(&args).unwrap();
        let runs = simulate_all(
            &args,
            LocationTable::standard_table(),
            &roster,
            &[42],
            &[ChoicePolicy::Second],
        );
        let aggregates = aggregate_runs(&runs);

        for (report, needle) in [
            ("json", "\"aggregates\""),
            ("markdown", "# Return Voyage Simulation Results"),
            ("csv", "seed,boat,policy,ending"),
            ("console", "Voyage Simulation Summary"),
        ] {
            let path = temp_file(&format!("report.{report}"));
            let args = Args {
                report: report.to_string(),
                output: Some(path.clone()),
                ..base_args()
            };
            write_reports(&args, &runs, &aggregates, Instant::now()).unwrap();
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains(needle), "{report} report missing {needle}");
        }
    }

    #[test]
    fn console_report_without_runs_says_so() {
        let path = temp_file("empty.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No voyages simulated."));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
