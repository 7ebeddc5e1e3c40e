use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::{self, FilterOutcome, FilterSelection};
use crate::match_history::{self, GameMode, LoadReport, MatchTable};
use crate::participation::ParticipationIndex;
use crate::roster::Roster;

/// Everything the dashboard reads after startup. Built once, never mutated;
/// the host passes it to the filter pipeline and the chart builders.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    roster: Roster,
    table: MatchTable,
    participation: ParticipationIndex,
}

impl DashboardContext {
    pub fn new(roster: Roster, table: MatchTable) -> Self {
        let participation = ParticipationIndex::build(&table);
        Self {
            roster,
            table,
            participation,
        }
    }

    /// Roster, then match history, then the participation index.
    pub fn load(config: &DashboardConfig) -> Result<(Self, LoadReport)> {
        let roster = Roster::load(&config.roster_path)?;
        let (table, report) =
            match_history::load_match_history(&config.source, &roster, config.expected_columns)?;
        Ok((Self::new(roster, table), report))
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn table(&self) -> &MatchTable {
        &self.table
    }

    pub fn participation(&self) -> &ParticipationIndex {
        &self.participation
    }

    pub fn game_modes(&self) -> Vec<GameMode> {
        self.table.game_modes()
    }

    pub fn filter(&self, selection: &FilterSelection) -> FilterOutcome<'_> {
        filter::run_pipeline(&self.table, &self.participation, &self.roster, selection)
    }
}
