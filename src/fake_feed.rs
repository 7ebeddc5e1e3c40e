//! Synthetic Bakkesmod-style exports for demos, tests and benches.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::schema::RawColumn;

/// One generated match export: file name and CSV body.
#[derive(Debug, Clone)]
pub struct FakeExport {
    pub file_name: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct FakeFeedOptions {
    pub seed: u64,
    pub matches: usize,
    /// Probability that a generated player name contains an unquoted comma,
    /// which corrupts the field count of its line like the real exporter does.
    pub broken_name_rate: f64,
}

impl Default for FakeFeedOptions {
    fn default() -> Self {
        Self {
            seed: 7,
            matches: 60,
            broken_name_rate: 0.02,
        }
    }
}

pub fn header_line() -> String {
    RawColumn::ALL
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn generate_exports(tracked: &[(String, String)], opts: &FakeFeedOptions) -> Vec<FakeExport> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut kickoff = base_kickoff();
    let mut out = Vec::with_capacity(opts.matches);

    for _ in 0..opts.matches {
        kickoff += ChronoDuration::minutes(rng.gen_range(7..40));
        let timestamp = kickoff.format("%Y-%m-%d_%H-%M-%S").to_string();
        let per_team = match rng.gen_range(0..10) {
            0..=1 => 1,
            2..=4 => 2,
            _ => 3,
        };

        let mut lobby = pick_lobby(tracked, per_team * 2, &mut rng);
        let mut lines = vec![header_line()];
        for (slot, (account, name)) in lobby.drain(..).enumerate() {
            let team = if slot < per_team { "Blue" } else { "Orange" };
            let name = if rng.gen_bool(opts.broken_name_rate.clamp(0.0, 1.0)) {
                format!("{name}, jr")
            } else {
                name
            };
            lines.push(player_line(&timestamp, team, &name, &account, &mut rng));
        }

        out.push(FakeExport {
            file_name: format!("{timestamp}.csv"),
            body: lines.join("\n") + "\n",
        });
    }
    out
}

pub fn write_exports(dir: &Path, exports: &[FakeExport]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = Vec::with_capacity(exports.len());
    for export in exports {
        let path = dir.join(&export.file_name);
        fs::write(&path, &export.body).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn base_kickoff() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(18, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

// Tracked players first (at least one), strangers fill the remaining seats.
fn pick_lobby(tracked: &[(String, String)], seats: usize, rng: &mut StdRng) -> Vec<(String, String)> {
    let mut lobby = Vec::with_capacity(seats);
    for (account, name) in tracked {
        if lobby.len() >= seats {
            break;
        }
        if lobby.is_empty() || rng.gen_bool(0.6) {
            lobby.push((account.clone(), name.clone()));
        }
    }
    while lobby.len() < seats {
        let id = rng.gen_range(10_000_000u64..99_999_999);
        lobby.push((format!("Steam|7656119{id}|0"), format!("Rando{}", id % 1000)));
    }
    // Shuffle seats so tracked players land on both teams.
    for i in (1..lobby.len()).rev() {
        let j = rng.gen_range(0..=i);
        lobby.swap(i, j);
    }
    lobby
}

fn player_line(timestamp: &str, team: &str, name: &str, account: &str, rng: &mut StdRng) -> String {
    let goals = rng.gen_range(0..4u32);
    let assists = rng.gen_range(0..3u32);
    let saves = rng.gen_range(0..5u32);
    let shots = goals + rng.gen_range(0..4u32);
    let demos = rng.gen_range(0..3u32);
    let score = goals * 100 + assists * 50 + saves * 50 + shots * 20 + rng.gen_range(20..180u32);
    let possession_secs = rng.gen_range(15..110u32);
    let possession_pct = rng.gen_range(5.0..45.0f64);
    let distance = rng.gen_range(1200.0..3200.0f64);
    let (pads, boosts, usage) = if rng.gen_bool(0.7) {
        (
            rng.gen_range(10..60u32).to_string(),
            rng.gen_range(2..20u32).to_string(),
            rng.gen_range(400..1800u32).to_string(),
        )
    } else {
        (String::new(), String::new(), String::new())
    };

    format!(
        "{timestamp},{team},{name},{account},{score},{goals},{assists},{saves},{shots},{demos},{}:{:02},{possession_pct:.1},{distance:.0},{pads},{boosts},{usage}",
        possession_secs / 60,
        possession_secs % 60,
    )
}
