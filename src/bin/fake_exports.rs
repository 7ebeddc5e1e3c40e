use std::path::PathBuf;

use anyhow::{Context, Result};

use samu_tracker::config::DashboardConfig;
use samu_tracker::fake_feed::{self, FakeFeedOptions};
use samu_tracker::roster::Roster;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    let roster_path = parse_value_arg("--roster")
        .map(PathBuf::from)
        .unwrap_or(config.roster_path);
    let dir = parse_value_arg("--dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let mut opts = FakeFeedOptions::default();
    if let Some(raw) = parse_value_arg("--matches") {
        opts.matches = raw.parse().context("--matches expects a number")?;
    }
    if let Some(raw) = parse_value_arg("--seed") {
        opts.seed = raw.parse().context("--seed expects a number")?;
    }
    if let Some(raw) = parse_value_arg("--broken-rate") {
        opts.broken_name_rate = raw.parse().context("--broken-rate expects a number")?;
    }

    let roster = Roster::load(&roster_path)
        .with_context(|| format!("failed to read roster {}", roster_path.display()))?;
    let tracked = roster
        .players()
        .iter()
        .map(|(id, name)| (id.to_string(), name.clone()))
        .collect::<Vec<_>>();

    let exports = fake_feed::generate_exports(&tracked, &opts);
    let written = fake_feed::write_exports(&dir, &exports)?;
    log::info!("wrote {} exports to {}", written.len(), dir.display());

    println!("Fake exports written");
    println!("Dir: {}", dir.display());
    println!("Files: {}", written.len());
    println!("Seed: {}", opts.seed);
    Ok(())
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
