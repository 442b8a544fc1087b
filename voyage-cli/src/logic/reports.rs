use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use voyage_game::LossCause;

use super::simulation::{PolicyAggregate, VoyageRun};

#[derive(Serialize)]
struct SimulationReport<'a> {
    aggregates: &'a [PolicyAggregate],
    runs: &'a [VoyageRun],
}

pub fn generate_console_report(
    out: &mut dyn Write,
    aggregates: &[PolicyAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Voyage Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    let voyages: usize = aggregates.iter().map(|a| a.voyages).sum();
    let wins: usize = aggregates.iter().map(|a| a.wins).sum();
    let adrift: usize = aggregates.iter().map(|a| a.adrift).sum();
    writeln!(out, "Total voyages: {voyages}")?;
    writeln!(out, "Returned home: {}", wins.to_string().green())?;
    writeln!(
        out,
        "Lost: {}",
        voyages.saturating_sub(wins + adrift).to_string().red()
    )?;
    if adrift > 0 {
        writeln!(out, "Adrift: {}", adrift.to_string().yellow())?;
    }
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for aggregate in aggregates {
        writeln!(out, "{}", aggregate.policy.label().bold())?;
        writeln!(
            out,
            "   Wins: {}/{} ({:.1}%)",
            aggregate.wins,
            aggregate.voyages,
            aggregate.win_rate * 100.0
        )?;
        writeln!(
            out,
            "   Score: mean {:.2} (sd {:.2}), max {}",
            aggregate.mean_score, aggregate.std_score, aggregate.max_score
        )?;
        writeln!(
            out,
            "   Steps: mean {:.2}, dice thrown: mean {:.2}",
            aggregate.mean_steps, aggregate.mean_dice_thrown
        )?;
        if !aggregate.losses.is_empty() {
            writeln!(out, "   Losses:")?;
            for (cause, count) in &aggregate.losses {
                writeln!(out, "     • {:<12} {}", cause.key(), count.to_string().red())?;
            }
        }
        if aggregate.adrift > 0 {
            writeln!(
                out,
                "   {} {}",
                "Adrift:".yellow(),
                aggregate.adrift.to_string().yellow()
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    runs: &[VoyageRun],
    aggregates: &[PolicyAggregate],
) -> Result<()> {
    let report = SimulationReport { aggregates, runs };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, aggregates: &[PolicyAggregate]) -> Result<()> {
    writeln!(out, "# Return Voyage Simulation Results\n")?;
    writeln!(
        out,
        "| Policy | Voyages | Wins | Win rate | Mean score | Max score | Mean steps | Adrift |"
    )?;
    writeln!(out, "|---|---:|---:|---:|---:|---:|---:|---:|")?;
    for aggregate in aggregates {
        writeln!(
            out,
            "| {} | {} | {} | {:.1}% | {:.2} | {} | {:.2} | {} |",
            aggregate.policy.label(),
            aggregate.voyages,
            aggregate.wins,
            aggregate.win_rate * 100.0,
            aggregate.mean_score,
            aggregate.max_score,
            aggregate.mean_steps,
            aggregate.adrift
        )?;
    }

    writeln!(out, "\n## Losses by cause\n")?;
    for aggregate in aggregates {
        writeln!(out, "### {}\n", aggregate.policy.label())?;
        if aggregate.losses.is_empty() {
            writeln!(out, "_No boats lost._\n")?;
            continue;
        }
        for cause in LossCause::ALL {
            if let Some(count) = aggregate.losses.get(&cause) {
                writeln!(out, "- **{}**: {count} ({})", cause.key(), cause.message())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, runs: &[VoyageRun]) -> Result<()> {
    writeln!(
        out,
        "seed,boat,policy,ending,cause,score,steps,dice_thrown,crew_remaining"
    )?;
    for run in runs {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            run.seed,
            run.boat,
            run.policy.key(),
            run.ending.label(),
            run.ending.cause().map_or("", LossCause::key),
            run.score,
            run.steps,
            run.dice_thrown,
            run.crew_remaining
        )?;
    }
    Ok(())
}
