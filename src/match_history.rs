use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::config::HistorySource;
use crate::error::{DashboardError, Result};
use crate::raw_export::{self, RawHistory, RawRow};
use crate::roster::Roster;
use crate::schema::{Field, Metric, RawColumn, TIMESTAMP_SEPARATOR};

/// Capture timestamp token identifying one match. Later captures sort greater.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform account id, stable across matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Team {
    Blue,
    Orange,
}

impl Team {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "blue" | "0" => Some(Team::Blue),
            "orange" | "1" => Some(Team::Orange),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Orange => "orange",
        }
    }
}

/// Match format derived from the participant count of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameMode {
    participants: usize,
}

impl GameMode {
    pub const SOLO: GameMode = GameMode { participants: 2 };
    pub const DOUBLES: GameMode = GameMode { participants: 4 };
    pub const STANDARD: GameMode = GameMode { participants: 6 };

    /// Modes offered by the mode picker, in display order.
    pub const SELECTABLE: [GameMode; 3] = [GameMode::STANDARD, GameMode::DOUBLES, GameMode::SOLO];

    pub fn from_participants(participants: usize) -> Self {
        Self { participants }
    }

    pub fn participants(self) -> usize {
        self.participants
    }

    /// Players per team, `None` when the participant count is odd.
    pub fn per_team(self) -> Option<usize> {
        (self.participants % 2 == 0).then_some(self.participants / 2)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (left, right) = raw.trim().split_once('v')?;
        let left = left.trim().parse::<usize>().ok()?;
        let right = right.trim().parse::<usize>().ok()?;
        (left == right && left > 0).then(|| Self::from_participants(left * 2))
    }
}

impl fmt::Display for GameMode {
    // An odd participant count yields a fractional label such as "1.5v1.5".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let half = self.participants / 2;
        if self.participants % 2 == 0 {
            write!(f, "{half}v{half}")
        } else {
            write!(f, "{half}.5v{half}.5")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        }
    }
}

/// Winner of a match from summed team goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchWinner {
    Team(Team),
    Draw,
}

impl MatchWinner {
    pub fn outcome_for(self, team: Team) -> Outcome {
        match self {
            MatchWinner::Draw => Outcome::Draw,
            MatchWinner::Team(winner) if winner == team => Outcome::Win,
            MatchWinner::Team(_) => Outcome::Loss,
        }
    }
}

/// One tracked player's performance in one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub match_id: MatchId,
    pub date: String,
    pub time: String,
    pub team: Team,
    pub player_name: String,
    pub player_id: PlayerId,
    pub display_name: String,
    pub game_mode: GameMode,
    pub outcome: Outcome,
    pub score: f64,
    pub goals: f64,
    pub assists: f64,
    pub saves: f64,
    pub shots: f64,
    pub demolishes: f64,
    pub possession_time: f64,
    pub possession_perc: f64,
    pub avg_distance_to_ball: f64,
    pub pads: Option<f64>,
    pub boosts: Option<f64>,
    pub boost_usage: Option<f64>,
}

impl MatchRecord {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Score => Some(self.score),
            Metric::Goals => Some(self.goals),
            Metric::Assists => Some(self.assists),
            Metric::Saves => Some(self.saves),
            Metric::Shots => Some(self.shots),
            Metric::Demolishes => Some(self.demolishes),
            Metric::PossessionTime => Some(self.possession_time),
            Metric::PossessionPerc => Some(self.possession_perc),
            Metric::AvgDistanceToBall => Some(self.avg_distance_to_ball),
            Metric::Pads => self.pads,
            Metric::Boosts => self.boosts,
            Metric::BoostUsage => self.boost_usage,
        }
    }

    /// Cell text for tables and exports.
    pub fn value_text(&self, field: Field) -> String {
        match field {
            Field::MatchId => self.match_id.to_string(),
            Field::Date => self.date.clone(),
            Field::Time => self.time.clone(),
            Field::Team => self.team.label().to_string(),
            Field::PlayerName => self.player_name.clone(),
            Field::PlayerId => self.player_id.to_string(),
            Field::DisplayName => self.display_name.clone(),
            Field::GameMode => self.game_mode.to_string(),
            Field::Outcome => self.outcome.label().to_string(),
            Field::Metric(metric) => self
                .metric(metric)
                .map(format_number)
                .unwrap_or_default(),
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// The canonical match-history table. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    rows: Vec<MatchRecord>,
}

impl MatchTable {
    pub fn new(rows: Vec<MatchRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MatchRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct match ids, most recent first.
    pub fn match_ids(&self) -> Vec<&MatchId> {
        distinct_matches_desc(self.rows.iter())
    }

    pub fn rows_for_match<'a>(&'a self, id: &'a MatchId) -> impl Iterator<Item = &'a MatchRecord> {
        self.rows.iter().filter(move |r| &r.match_id == id)
    }

    /// Game modes present in the table, selectable ones first.
    pub fn game_modes(&self) -> Vec<GameMode> {
        let mut out = GameMode::SELECTABLE.to_vec();
        let mut extra = self
            .rows
            .iter()
            .map(|r| r.game_mode)
            .filter(|mode| !out.contains(mode))
            .collect::<Vec<_>>();
        extra.sort_unstable();
        extra.dedup();
        out.extend(extra);
        out
    }
}

pub(crate) fn distinct_matches_desc<'a>(
    rows: impl Iterator<Item = &'a MatchRecord>,
) -> Vec<&'a MatchId> {
    let mut ids = rows.map(|r| &r.match_id).collect::<Vec<_>>();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.dedup();
    ids
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub files: usize,
    pub raw_rows: usize,
    pub recovered_rows: usize,
    pub duplicates_removed: usize,
    pub untracked_rows_removed: usize,
    pub odd_matches: Vec<MatchId>,
    pub rows: usize,
    pub matches: usize,
}

pub fn load_match_history(
    source: &HistorySource,
    roster: &Roster,
    expected_columns: usize,
) -> Result<(MatchTable, LoadReport)> {
    let raw = match source {
        HistorySource::ExportDir(path) => raw_export::read_export_dir(path, expected_columns)?,
        HistorySource::Snapshot(path) => raw_export::read_snapshot(path)?,
    };
    build_match_history(raw, roster)
}

/// Turns raw export rows into the canonical table: dedup, derive mode and
/// outcome per match, keep tracked players only, parse metrics.
pub fn build_match_history(raw: RawHistory, roster: &Roster) -> Result<(MatchTable, LoadReport)> {
    let mut report = LoadReport {
        files: raw.files.len(),
        raw_rows: raw.rows.len(),
        recovered_rows: raw.recovered,
        ..LoadReport::default()
    };

    let mut seen: HashSet<&RawRow> = HashSet::with_capacity(raw.rows.len());
    let rows = raw
        .rows
        .iter()
        .filter(|row| seen.insert(*row))
        .collect::<Vec<_>>();
    report.duplicates_removed = raw.rows.len() - rows.len();
    if report.duplicates_removed > 0 {
        log::info!("removed {} duplicate raw rows", report.duplicates_removed);
    }

    let mut match_order: Vec<&str> = Vec::new();
    let mut participants: HashMap<&str, usize> = HashMap::new();
    let mut team_goals: HashMap<(&str, Team), f64> = HashMap::new();
    for row in &rows {
        let timestamp = row
            .get(RawColumn::Timestamp)
            .ok_or_else(|| DashboardError::data_format("row without timestamp"))?;
        let count = participants.entry(timestamp).or_insert(0);
        if *count == 0 {
            match_order.push(timestamp);
        }
        *count += 1;

        if row.is_recovered() {
            continue;
        }
        let team = parse_team(row, timestamp)?;
        let goals = match row.get(RawColumn::Goals) {
            Some(raw) => parse_metric(raw, RawColumn::Goals, timestamp)?,
            None => 0.0,
        };
        *team_goals.entry((timestamp, team)).or_insert(0.0) += goals;
    }

    let mut winners: HashMap<&str, MatchWinner> = HashMap::with_capacity(match_order.len());
    for timestamp in &match_order {
        let blue = team_goals.get(&(*timestamp, Team::Blue)).copied().unwrap_or(0.0);
        let orange = team_goals.get(&(*timestamp, Team::Orange)).copied().unwrap_or(0.0);
        let winner = if blue > orange {
            MatchWinner::Team(Team::Blue)
        } else if orange > blue {
            MatchWinner::Team(Team::Orange)
        } else {
            MatchWinner::Draw
        };
        winners.insert(*timestamp, winner);

        let count = participants.get(timestamp).copied().unwrap_or(0);
        if count % 2 != 0 {
            log::warn!("match {timestamp} has an odd participant count ({count})");
            report.odd_matches.push(MatchId::new(*timestamp));
        }
    }

    let mut records = Vec::new();
    for row in &rows {
        if row.is_recovered() {
            continue;
        }
        let Some(account) = row.get(RawColumn::AccountId) else {
            report.untracked_rows_removed += 1;
            continue;
        };
        let player_id = PlayerId::new(account);
        if !roster.contains(&player_id) {
            report.untracked_rows_removed += 1;
            continue;
        }

        // Every remaining row went through both passes above.
        let timestamp = row.get(RawColumn::Timestamp).unwrap_or_default();
        let count = participants.get(timestamp).copied().unwrap_or(0);
        let winner = winners.get(timestamp).copied().unwrap_or(MatchWinner::Draw);
        records.push(build_record(row, timestamp, player_id, count, winner, roster)?);
    }

    report.rows = records.len();
    let table = MatchTable::new(records);
    report.matches = table.match_ids().len();
    log::info!(
        "canonical table: {} rows across {} matches ({} untracked rows dropped)",
        report.rows,
        report.matches,
        report.untracked_rows_removed
    );
    Ok((table, report))
}

fn build_record(
    row: &RawRow,
    timestamp: &str,
    player_id: PlayerId,
    participants: usize,
    winner: MatchWinner,
    roster: &Roster,
) -> Result<MatchRecord> {
    let (date, time) = timestamp.split_once(TIMESTAMP_SEPARATOR).ok_or_else(|| {
        DashboardError::data_format(format!(
            "timestamp {timestamp} has no '{TIMESTAMP_SEPARATOR}' separator"
        ))
    })?;
    let team = parse_team(row, timestamp)?;
    let required = |col: RawColumn| -> Result<f64> {
        let raw = row.get(col).ok_or_else(|| {
            DashboardError::data_format(format!("match {timestamp}: missing {}", col.header()))
        })?;
        parse_metric(raw, col, timestamp)
    };
    let optional = |col: RawColumn| -> Result<Option<f64>> {
        row.get(col)
            .map(|raw| parse_metric(raw, col, timestamp))
            .transpose()
    };
    let possession_raw = row.get(RawColumn::PossessionTime).ok_or_else(|| {
        DashboardError::data_format(format!("match {timestamp}: missing PossessionTime"))
    })?;

    Ok(MatchRecord {
        match_id: MatchId::new(timestamp),
        date: date.to_string(),
        time: time.to_string(),
        team,
        player_name: row.get(RawColumn::PlayerName).unwrap_or_default().to_string(),
        display_name: roster.label_for(&player_id).to_string(),
        player_id,
        game_mode: GameMode::from_participants(participants),
        outcome: winner.outcome_for(team),
        score: required(RawColumn::Score)?,
        goals: required(RawColumn::Goals)?,
        assists: required(RawColumn::Assists)?,
        saves: required(RawColumn::Saves)?,
        shots: required(RawColumn::Shots)?,
        demolishes: required(RawColumn::Demolishes)?,
        possession_time: parse_duration_secs(possession_raw).map_err(|err| {
            DashboardError::data_format(format!("match {timestamp}: {err}"))
        })?,
        possession_perc: required(RawColumn::PossessionPerc)?,
        avg_distance_to_ball: required(RawColumn::AvgDistanceToBall)?,
        pads: optional(RawColumn::Pads)?,
        boosts: optional(RawColumn::Boosts)?,
        boost_usage: optional(RawColumn::BoostUsage)?,
    })
}

fn parse_team(row: &RawRow, timestamp: &str) -> Result<Team> {
    let raw = row.get(RawColumn::Team).unwrap_or_default();
    Team::parse(raw).ok_or_else(|| {
        DashboardError::data_format(format!("match {timestamp}: unknown team '{raw}'"))
    })
}

fn parse_metric(raw: &str, col: RawColumn, timestamp: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(DashboardError::data_format(format!(
            "match {timestamp}: invalid {} value '{raw}'",
            col.header()
        ))),
    }
}

/// Parses a `minutes:seconds` duration into seconds. Plain numbers are taken
/// as seconds already (pre-merged snapshots store them that way).
pub fn parse_duration_secs(raw: &str) -> std::result::Result<f64, String> {
    let raw = raw.trim();
    let Some((minutes, seconds)) = raw.split_once(':') else {
        return match raw.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
            _ => Err(format!("invalid duration '{raw}'")),
        };
    };
    let minutes = minutes
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid duration '{raw}'"))?;
    let seconds = seconds
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid duration '{raw}'"))?;
    Ok(f64::from(minutes) * 60.0 + f64::from(seconds))
}
