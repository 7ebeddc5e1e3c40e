//! Schema dictionary for match history.
//!
//! Internal logic only ever talks about [`Field`], [`Metric`] and [`RawColumn`]
//! values. Human-readable labels appear at the boundary: table headers, chart
//! axes, the variable pickers and spreadsheet exports.

/// Raw column count of a Bakkesmod export line.
pub const EXPECTED_RAW_COLUMNS: usize = 16;

/// Separator between the date and the time part of a capture timestamp.
pub const TIMESTAMP_SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawColumn {
    Timestamp,
    Team,
    PlayerName,
    AccountId,
    Score,
    Goals,
    Assists,
    Saves,
    Shots,
    Demolishes,
    PossessionTime,
    PossessionPerc,
    AvgDistanceToBall,
    Pads,
    Boosts,
    BoostUsage,
}

impl RawColumn {
    pub const ALL: [RawColumn; EXPECTED_RAW_COLUMNS] = [
        RawColumn::Timestamp,
        RawColumn::Team,
        RawColumn::PlayerName,
        RawColumn::AccountId,
        RawColumn::Score,
        RawColumn::Goals,
        RawColumn::Assists,
        RawColumn::Saves,
        RawColumn::Shots,
        RawColumn::Demolishes,
        RawColumn::PossessionTime,
        RawColumn::PossessionPerc,
        RawColumn::AvgDistanceToBall,
        RawColumn::Pads,
        RawColumn::Boosts,
        RawColumn::BoostUsage,
    ];

    pub fn header(self) -> &'static str {
        match self {
            RawColumn::Timestamp => "Timestamp",
            RawColumn::Team => "Team",
            RawColumn::PlayerName => "PlayerName",
            RawColumn::AccountId => "AccountId",
            RawColumn::Score => "Score",
            RawColumn::Goals => "Goals",
            RawColumn::Assists => "Assists",
            RawColumn::Saves => "Saves",
            RawColumn::Shots => "Shots",
            RawColumn::Demolishes => "Demolishes",
            RawColumn::PossessionTime => "PossessionTime",
            RawColumn::PossessionPerc => "PossessionPerc",
            RawColumn::AvgDistanceToBall => "AvgDistanceToBall",
            RawColumn::Pads => "Pads",
            RawColumn::Boosts => "Boosts",
            RawColumn::BoostUsage => "BoostUsage",
        }
    }

    pub fn from_header(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|col| col.header().eq_ignore_ascii_case(raw))
    }

    // Bakkesmod does not log these for every player.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            RawColumn::Pads | RawColumn::Boosts | RawColumn::BoostUsage
        )
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Numeric performance metrics carried by every canonical row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Score,
    Goals,
    Assists,
    Saves,
    Shots,
    Demolishes,
    PossessionTime,
    PossessionPerc,
    AvgDistanceToBall,
    Pads,
    Boosts,
    BoostUsage,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::Score,
        Metric::Goals,
        Metric::Assists,
        Metric::Saves,
        Metric::Shots,
        Metric::Demolishes,
        Metric::PossessionTime,
        Metric::PossessionPerc,
        Metric::AvgDistanceToBall,
        Metric::Pads,
        Metric::Boosts,
        Metric::BoostUsage,
    ];

    pub fn field(self) -> Field {
        Field::Metric(self)
    }

    pub fn label(self) -> &'static str {
        self.field().label()
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Every column of the canonical match-history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MatchId,
    Date,
    Time,
    Team,
    PlayerName,
    PlayerId,
    DisplayName,
    GameMode,
    Outcome,
    Metric(Metric),
}

impl Field {
    pub fn all() -> Vec<Field> {
        let mut out = vec![
            Field::MatchId,
            Field::Date,
            Field::Time,
            Field::Team,
            Field::PlayerName,
            Field::PlayerId,
            Field::DisplayName,
            Field::GameMode,
            Field::Outcome,
        ];
        out.extend(Metric::ALL.iter().map(|m| Field::Metric(*m)));
        out
    }

    /// Stable internal key, used for lookups coming from configuration.
    pub fn key(self) -> &'static str {
        match self {
            Field::MatchId => "timestamp",
            Field::Date => "date",
            Field::Time => "time",
            Field::Team => "team",
            Field::PlayerName => "player",
            Field::PlayerId => "id",
            Field::DisplayName => "fixed_name",
            Field::GameMode => "gamemode",
            Field::Outcome => "outcome",
            Field::Metric(Metric::Score) => "core_score",
            Field::Metric(Metric::Goals) => "core_goals",
            Field::Metric(Metric::Assists) => "core_assists",
            Field::Metric(Metric::Saves) => "core_saves",
            Field::Metric(Metric::Shots) => "core_shots",
            Field::Metric(Metric::Demolishes) => "demo_inflicted",
            Field::Metric(Metric::PossessionTime) => "possession_time",
            Field::Metric(Metric::PossessionPerc) => "possession_percentage",
            Field::Metric(Metric::AvgDistanceToBall) => "positioning_avg_distance_to_ball",
            Field::Metric(Metric::Pads) => "boost_count_collected_small",
            Field::Metric(Metric::Boosts) => "boost_count_collected_big",
            Field::Metric(Metric::BoostUsage) => "boost_amount_used",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::MatchId => "Timestamp",
            Field::Date => "Date",
            Field::Time => "Time",
            Field::Team => "Team",
            Field::PlayerName => "Player name",
            Field::PlayerId => "Account ID",
            Field::DisplayName => "Player",
            Field::GameMode => "Game mode",
            Field::Outcome => "Result",
            Field::Metric(Metric::Score) => "Score",
            Field::Metric(Metric::Goals) => "Goals",
            Field::Metric(Metric::Assists) => "Assists",
            Field::Metric(Metric::Saves) => "Saves",
            Field::Metric(Metric::Shots) => "Shots",
            Field::Metric(Metric::Demolishes) => "Demolitions",
            Field::Metric(Metric::PossessionTime) => "Possession time (s)",
            Field::Metric(Metric::PossessionPerc) => "Possession (%)",
            Field::Metric(Metric::AvgDistanceToBall) => "Average distance to ball",
            Field::Metric(Metric::Pads) => "Small pads collected",
            Field::Metric(Metric::Boosts) => "Big boosts collected",
            Field::Metric(Metric::BoostUsage) => "Boost used",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::all().into_iter().find(|f| f.key() == key.trim())
    }
}

/// Metrics offered in the scatter variable pickers, labelled for display.
pub fn numeric_variables() -> Vec<(Metric, &'static str)> {
    Metric::ALL.iter().map(|m| (*m, m.label())).collect()
}
