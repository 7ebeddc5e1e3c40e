#![allow(dead_code)]

use std::path::PathBuf;

use samu_tracker::context::DashboardContext;
use samu_tracker::match_history::{GameMode, MatchId, MatchRecord, MatchTable, Outcome, PlayerId, Team};
use samu_tracker::roster::Roster;

pub const HEADER: &str = "Timestamp,Team,PlayerName,AccountId,Score,Goals,Assists,Saves,Shots,Demolishes,PossessionTime,PossessionPerc,AvgDistanceToBall,Pads,Boosts,BoostUsage";

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

pub fn fixture_roster() -> Roster {
    Roster::load(&fixture_path("tracked_players.json")).expect("fixture roster should load")
}

/// Roster whose account ids equal their display names, e.g. `A` -> `A`.
pub fn letter_roster(ids: &[&str]) -> Roster {
    Roster::from_pairs(ids.iter().map(|id| (id.to_string(), id.to_string())))
}

/// One export line with every column filled.
pub fn export_line(ts: &str, team: &str, name: &str, account: &str, goals: u32) -> String {
    format!("{ts},{team},{name},{account},{},{goals},0,1,{},0,0:45,20.0,2000,20,5,700", 100 + goals * 100, goals + 1)
}

pub fn record(match_id: &str, player: &str, mode: GameMode) -> MatchRecord {
    let (date, time) = match_id.split_once('_').unwrap_or((match_id, ""));
    MatchRecord {
        match_id: MatchId::new(match_id),
        date: date.to_string(),
        time: time.to_string(),
        team: Team::Blue,
        player_name: player.to_string(),
        player_id: PlayerId::new(player),
        display_name: player.to_string(),
        game_mode: mode,
        outcome: Outcome::Win,
        score: 300.0,
        goals: 1.0,
        assists: 0.0,
        saves: 2.0,
        shots: 3.0,
        demolishes: 0.0,
        possession_time: 60.0,
        possession_perc: 25.0,
        avg_distance_to_ball: 2000.0,
        pads: None,
        boosts: None,
        boost_usage: None,
    }
}

/// Context over `(match_id, "A B C")` pairs, every match in `mode`.
pub fn context_from(matches: &[(&str, &str)], roster: Roster, mode: GameMode) -> DashboardContext {
    let rows = matches
        .iter()
        .flat_map(|(id, players)| {
            players
                .split_whitespace()
                .map(move |p| record(id, p, mode))
        })
        .collect::<Vec<_>>();
    DashboardContext::new(roster, MatchTable::new(rows))
}
