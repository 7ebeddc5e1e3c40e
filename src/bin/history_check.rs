use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use samu_tracker::config::{DashboardConfig, HistorySource};
use samu_tracker::context::DashboardContext;
use samu_tracker::filter::{FilterSelection, PlayerFilter};
use samu_tracker::match_history::{GameMode, PlayerId};

fn main() -> Result<()> {
    let level = if has_flag("--verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    if let Some(dir) = parse_value_arg("--data") {
        config.source = HistorySource::ExportDir(PathBuf::from(dir));
    }
    if let Some(path) = parse_value_arg("--snapshot") {
        config.source = HistorySource::Snapshot(PathBuf::from(path));
    }
    if let Some(path) = parse_value_arg("--roster") {
        config.roster_path = PathBuf::from(path);
    }

    let (ctx, report) = DashboardContext::load(&config).context("failed to load match history")?;
    if has_flag("--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Match history loaded");
    match &config.source {
        HistorySource::ExportDir(path) => println!("Source: {} ({} files)", path.display(), report.files),
        HistorySource::Snapshot(path) => println!("Source: snapshot {}", path.display()),
    }
    println!("Raw rows: {}", report.raw_rows);
    println!("Recovered lines: {}", report.recovered_rows);
    println!("Duplicates removed: {}", report.duplicates_removed);
    println!("Untracked rows removed: {}", report.untracked_rows_removed);
    println!("Rows: {} across {} matches", report.rows, report.matches);
    if !report.odd_matches.is_empty() {
        println!("Odd participant counts: {}", report.odd_matches.len());
        for id in report.odd_matches.iter().take(6) {
            println!("   - {id}");
        }
    }

    for mode in ctx.game_modes() {
        let matches = ctx
            .participation()
            .iter()
            .filter(|(id, _)| {
                ctx.table()
                    .rows_for_match(id)
                    .next()
                    .is_some_and(|r| r.game_mode == mode)
            })
            .count();
        let shape = match mode.per_team() {
            Some(n) => format!("{n} per team"),
            None => format!("{} participants, uneven", mode.participants()),
        };
        println!("mode {mode} ({shape}): {matches} matches");
    }

    let Some(raw_mode) = parse_value_arg("--mode") else {
        return Ok(());
    };
    let mode = GameMode::parse(&raw_mode).ok_or_else(|| anyhow!("unknown game mode {raw_mode}"))?;
    let recency = parse_value_arg("--recency")
        .map(|raw| raw.parse::<usize>())
        .transpose()
        .context("--recency expects a number")?
        .unwrap_or(usize::MAX);

    let mut selection = FilterSelection::new(mode, recency);
    for id in parse_ids(parse_value_arg("--include")) {
        selection = selection.with_player(id, PlayerFilter::Include);
    }
    for id in parse_ids(parse_value_arg("--exclude")) {
        selection = selection.with_player(id, PlayerFilter::Exclude);
    }

    let outcome = ctx.filter(&selection);
    println!(
        "filter {mode}: {} rows, {} of {} matches",
        outcome.rows.len(),
        outcome.match_ids().len(),
        outcome.recency_max
    );
    for id in outcome.match_ids().iter().take(10) {
        println!("   - {id}");
    }
    Ok(())
}

fn has_flag(flag: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == flag)
}

fn parse_value_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_ids(raw: Option<String>) -> Vec<PlayerId> {
    raw.map(|raw| {
        raw.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(PlayerId::new)
            .collect()
    })
    .unwrap_or_default()
}
