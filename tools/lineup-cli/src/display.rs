use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use lineup_optimizer::{LineupResult, Roster, Slot};
use serde::Serialize;

/// JSON document printed by `--json`
#[derive(Debug, Serialize)]
struct RosterReport<'a> {
    generated_at: DateTime<Utc>,
    salary_cap: u32,
    #[serde(flatten)]
    result: &'a LineupResult,
}

/// "$7,800"
pub fn format_salary(salary: u64) -> String {
    let digits = salary.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

fn slot_label(slot: Slot) -> ColoredString {
    let label = format!("{:<4}", slot.to_string());
    match slot {
        Slot::QB => label.red().bold(),
        Slot::RB => label.green().bold(),
        Slot::WR => label.blue().bold(),
        Slot::TE => label.yellow().bold(),
        Slot::FLEX => label.magenta().bold(),
        Slot::DST => label.cyan().bold(),
    }
}

pub fn roster_json(result: &LineupResult, salary_cap: u32) -> Result<String> {
    let report = RosterReport { generated_at: Utc::now(), salary_cap, result };
    serde_json::to_string_pretty(&report).context("Failed to serialize roster")
}

pub fn print_roster(result: &LineupResult, salary_cap: u32) {
    let roster: &Roster = &result.roster;

    println!();
    println!("{}", "🏈 OPTIMAL LINEUP".bright_white().bold());
    println!(
        "{}",
        format!(
            "{} candidates ({} slate rows, {} without a projection)",
            result.candidate_count, result.resolve_stats.slate_rows, result.resolve_stats.unmatched
        )
        .dimmed()
    );
    println!("{}", "─".repeat(72).dimmed());
    println!(
        "{:<4}  {:<26} {:<5} {:<6} {:>9} {:>8} {:>7}",
        "SLOT".bold(),
        "PLAYER".bold(),
        "TEAM".bold(),
        "OPP".bold(),
        "SALARY".bold(),
        "PROJ".bold(),
        "VALUE".bold()
    );

    for slot in &roster.slots {
        let player = &slot.player;
        println!(
            "{}  {:<26} {:<5} {:<6} {:>9} {:>8.2} {:>7.2}",
            slot_label(slot.slot),
            player.display_name,
            player.team,
            format!("vs {}", player.opponent_team),
            format_salary(player.salary.into()),
            player.projection,
            player.value()
        );
    }

    println!("{}", "─".repeat(72).dimmed());
    let cap = u64::from(salary_cap);
    let remaining = cap.saturating_sub(roster.total_salary);
    println!(
        "{:<44} {:>9} {:>8}",
        "TOTAL".bold(),
        format_salary(roster.total_salary).bold(),
        format!("{:.2}", roster.total_projection).bright_green().bold()
    );
    let left = format!("{} left under the {} cap", format_salary(remaining), format_salary(cap));
    println!("{}", left.dimmed());
    println!();
}
