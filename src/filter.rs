//! Cascading filter from the canonical table to the rows a view renders.
//!
//! Stages run in a fixed order: game mode, player include/exclude, roster,
//! recency. Recency works on whatever survived the first three stages, so the
//! recency control's maximum is taken at that point too.

use std::collections::{HashMap, HashSet};

use crate::match_history::{GameMode, MatchId, MatchRecord, MatchTable, PlayerId, distinct_matches_desc};
use crate::participation::ParticipationIndex;
use crate::roster::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerFilter {
    Include,
    Exclude,
    #[default]
    Any,
}

impl PlayerFilter {
    pub fn next(self) -> Self {
        match self {
            PlayerFilter::Include => PlayerFilter::Exclude,
            PlayerFilter::Exclude => PlayerFilter::Any,
            PlayerFilter::Any => PlayerFilter::Include,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayerFilter::Include => "Include",
            PlayerFilter::Exclude => "Exclude",
            PlayerFilter::Any => "Any",
        }
    }
}

/// The user's current filter choices. Rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub game_mode: GameMode,
    pub players: HashMap<PlayerId, PlayerFilter>,
    pub recency_count: usize,
}

impl FilterSelection {
    pub fn new(game_mode: GameMode, recency_count: usize) -> Self {
        Self {
            game_mode,
            players: HashMap::new(),
            recency_count,
        }
    }

    pub fn with_player(mut self, id: PlayerId, filter: PlayerFilter) -> Self {
        self.players.insert(id, filter);
        self
    }

    pub fn filter_for(&self, id: &PlayerId) -> PlayerFilter {
        self.players.get(id).copied().unwrap_or_default()
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome<'a> {
    pub rows: Vec<&'a MatchRecord>,
    /// Distinct matches left after the mode and player stages; the recency
    /// control must not offer more than this.
    pub recency_max: usize,
}

impl FilterOutcome<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn match_ids(&self) -> Vec<&MatchId> {
        distinct_matches_desc(self.rows.iter().copied())
    }
}

pub fn run_pipeline<'a>(
    table: &'a MatchTable,
    index: &ParticipationIndex,
    roster: &Roster,
    selection: &FilterSelection,
) -> FilterOutcome<'a> {
    let universe = filter_mode_and_players(table, index, roster, selection);
    let recency_max = distinct_match_count(&universe);
    let rows = apply_recency(universe, selection.recency_count);
    FilterOutcome { rows, recency_max }
}

/// Stages 1 to 3: game mode, player presence, roster membership.
pub fn filter_mode_and_players<'a>(
    table: &'a MatchTable,
    index: &ParticipationIndex,
    roster: &Roster,
    selection: &FilterSelection,
) -> Vec<&'a MatchRecord> {
    let eligible = eligible_matches(index, roster, selection);
    table
        .rows()
        .iter()
        .filter(|row| row.game_mode == selection.game_mode)
        .filter(|row| eligible.contains(&row.match_id))
        .filter(|row| roster.contains(&row.player_id))
        .collect()
}

/// Matches holding every "include" player and none of the "exclude" players.
pub fn eligible_matches<'a>(
    index: &'a ParticipationIndex,
    roster: &Roster,
    selection: &FilterSelection,
) -> HashSet<&'a MatchId> {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for id in roster.ids() {
        match selection.filter_for(id) {
            PlayerFilter::Include => include.push(id),
            PlayerFilter::Exclude => exclude.push(id),
            PlayerFilter::Any => {}
        }
    }

    matches_with_players(index, &include, &exclude)
}

/// Set form of the player stage. A player in both sets leaves nothing eligible.
pub fn matches_with_players<'a>(
    index: &'a ParticipationIndex,
    include: &[&PlayerId],
    exclude: &[&PlayerId],
) -> HashSet<&'a MatchId> {
    let excluded_ok = index
        .iter()
        .filter(|(_, players)| exclude.iter().all(|p| !players.contains(p)))
        .map(|(id, _)| id)
        .collect::<HashSet<_>>();
    let included_ok = index
        .iter()
        .filter(|(_, players)| include.iter().all(|p| players.contains(p)))
        .map(|(id, _)| id)
        .collect::<HashSet<_>>();

    excluded_ok.intersection(&included_ok).copied().collect()
}

pub fn distinct_match_count(rows: &[&MatchRecord]) -> usize {
    rows.iter().map(|r| &r.match_id).collect::<HashSet<_>>().len()
}

/// Stage 4: keep rows of the `count` most recent distinct matches.
pub fn apply_recency(rows: Vec<&MatchRecord>, count: usize) -> Vec<&MatchRecord> {
    let keep = distinct_matches_desc(rows.iter().copied())
        .into_iter()
        .take(count)
        .cloned()
        .collect::<HashSet<MatchId>>();
    rows.into_iter()
        .filter(|row| keep.contains(&row.match_id))
        .collect()
}
