//! Chart and table builders fed by filtered rows.
//!
//! Each builder is a pure function of the rows it is given and returns plain
//! data; the terminal host decides how to draw it. An empty row set always
//! produces an empty result.

use std::collections::HashMap;

use crate::match_history::{MatchId, MatchRecord, MatchTable, Outcome, PlayerId, Team};
use crate::roster::Roster;
use crate::schema::Metric;

#[derive(Debug, Clone, PartialEq)]
pub struct BoxPoint {
    pub match_id: MatchId,
    pub value: f64,
}

/// Five-number summary of one player's metric values.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub points: Vec<BoxPoint>,
}

pub fn box_summary(rows: &[&MatchRecord], roster: &Roster, metric: Metric) -> Vec<BoxSummary> {
    let mut out = Vec::new();
    for (player_id, player_rows) in group_by_player(rows, roster) {
        let points = player_rows
            .iter()
            .filter_map(|r| {
                r.metric(metric).map(|value| BoxPoint {
                    match_id: r.match_id.clone(),
                    value,
                })
            })
            .collect::<Vec<_>>();
        let mut values = points.iter().map(|p| p.value).collect::<Vec<_>>();
        if values.is_empty() {
            continue;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        out.push(BoxSummary {
            name: roster.label_for(player_id).to_string(),
            player_id: player_id.clone(),
            n: values.len(),
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
            points,
        });
    }
    out
}

/// Linear-interpolated quantile of sorted, non-empty values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendOption {
    None,
    #[default]
    Ols,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendScope {
    #[default]
    Overall,
    PerPlayer,
}

/// Least-squares line `y = slope * x + intercept`, spanning the fitted x range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn endpoints(&self) -> [(f64, f64); 2] {
        [(self.x_min, self.at(self.x_min)), (self.x_max, self.at(self.x_max))]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub player_id: PlayerId,
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub match_ids: Vec<MatchId>,
    pub trend: Option<TrendLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub x: Metric,
    pub y: Metric,
    pub series: Vec<ScatterSeries>,
    pub overall_trend: Option<TrendLine>,
    /// Squared Pearson correlation, reported for an overall OLS trend only.
    pub r_squared: Option<f64>,
}

impl ScatterChart {
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut all = self.series.iter().flat_map(|s| s.points.iter());
        let first = all.next()?;
        let mut xb = [first.0, first.0];
        let mut yb = [first.1, first.1];
        for (x, y) in all {
            xb = [xb[0].min(*x), xb[1].max(*x)];
            yb = [yb[0].min(*y), yb[1].max(*y)];
        }
        Some((xb, yb))
    }
}

pub fn scatter(
    rows: &[&MatchRecord],
    roster: &Roster,
    x: Metric,
    y: Metric,
    trend: TrendOption,
    scope: TrendScope,
) -> ScatterChart {
    let mut series = Vec::new();
    for (player_id, player_rows) in group_by_player(rows, roster) {
        let mut points = Vec::new();
        let mut match_ids = Vec::new();
        for r in player_rows {
            if let (Some(xv), Some(yv)) = (r.metric(x), r.metric(y)) {
                points.push((xv, yv));
                match_ids.push(r.match_id.clone());
            }
        }
        if points.is_empty() {
            continue;
        }
        let trend_line = match (trend, scope) {
            (TrendOption::Ols, TrendScope::PerPlayer) => ols(&points),
            _ => None,
        };
        series.push(ScatterSeries {
            name: roster.label_for(player_id).to_string(),
            player_id: player_id.clone(),
            points,
            match_ids,
            trend: trend_line,
        });
    }

    let (overall_trend, r_squared) = match (trend, scope) {
        (TrendOption::Ols, TrendScope::Overall) => {
            let all = series
                .iter()
                .flat_map(|s| s.points.iter().copied())
                .collect::<Vec<_>>();
            (ols(&all), pearson_r(&all).map(|r| r * r))
        }
        _ => (None, None),
    };

    ScatterChart {
        x,
        y,
        series,
        overall_trend,
        r_squared,
    }
}

pub fn ols(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum::<f64>();
    if sxx <= f64::EPSILON {
        return None;
    }
    let sxy = points
        .iter()
        .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
        .sum::<f64>();
    let slope = sxy / sxx;
    let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
        x_min,
        x_max,
    })
}

pub fn pearson_r(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in points {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x).powi(2);
        syy += (y - mean_y).powi(2);
    }
    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct WinrateBar {
    pub player_id: PlayerId,
    pub name: String,
    pub games: usize,
    pub wins: usize,
    /// Percentage in `0..=100`, two decimals.
    pub winrate: f64,
}

pub fn winrate(rows: &[&MatchRecord], roster: &Roster) -> Vec<WinrateBar> {
    group_by_player(rows, roster)
        .into_iter()
        .map(|(player_id, player_rows)| {
            let games = player_rows.len();
            let wins = player_rows
                .iter()
                .filter(|r| r.outcome == Outcome::Win)
                .count();
            let pct = if games == 0 {
                0.0
            } else {
                (wins as f64 / games as f64 * 100.0 * 100.0).round() / 100.0
            };
            WinrateBar {
                name: roster.label_for(player_id).to_string(),
                player_id: player_id.clone(),
                games,
                wins,
                winrate: pct,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub player_id: PlayerId,
    pub name: String,
    pub games: usize,
    pub goals: f64,
    pub assists: f64,
    pub saves: f64,
    pub shots: f64,
    pub demolishes: f64,
}

pub const SUMMARY_HEADERS: [&str; 7] = [
    "Player",
    "Games",
    "Goals",
    "Assists",
    "Saves",
    "Shots",
    "Demolishes",
];

pub fn summary(rows: &[&MatchRecord], roster: &Roster) -> Vec<SummaryRow> {
    group_by_player(rows, roster)
        .into_iter()
        .map(|(player_id, player_rows)| {
            let sum = |m: Metric| player_rows.iter().filter_map(|r| r.metric(m)).sum::<f64>();
            SummaryRow {
                name: roster.label_for(player_id).to_string(),
                player_id: player_id.clone(),
                games: player_rows.len(),
                goals: sum(Metric::Goals),
                assists: sum(Metric::Assists),
                saves: sum(Metric::Saves),
                shots: sum(Metric::Shots),
                demolishes: sum(Metric::Demolishes),
            }
        })
        .collect()
}

/// One line of the single-match scoreboard.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetailRow {
    pub team: Team,
    pub player_name: String,
    pub score: f64,
    pub goals: f64,
    pub saves: f64,
    pub shots: f64,
    pub demolishes: f64,
}

pub fn match_detail(table: &MatchTable, match_id: &MatchId) -> Vec<MatchDetailRow> {
    let mut rows = table
        .rows_for_match(match_id)
        .map(|r| MatchDetailRow {
            team: r.team,
            player_name: r.display_name.clone(),
            score: r.score,
            goals: r.goals,
            saves: r.saves,
            shots: r.shots,
            demolishes: r.demolishes,
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| a.team.cmp(&b.team).then(b.score.total_cmp(&a.score)));
    rows
}

// Rows grouped per tracked player, in roster order; players without rows are skipped.
fn group_by_player<'r, 'a>(
    rows: &[&'a MatchRecord],
    roster: &'r Roster,
) -> Vec<(&'r PlayerId, Vec<&'a MatchRecord>)> {
    let mut by_player: HashMap<&PlayerId, Vec<&'a MatchRecord>> = HashMap::new();
    for row in rows {
        by_player.entry(&row.player_id).or_default().push(*row);
    }
    roster
        .ids()
        .filter_map(|id| by_player.remove(id).map(|player_rows| (id, player_rows)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 1.0), 4.0);
        assert!((quantile(&v, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&v, 0.25) - 1.75).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn ols_recovers_a_perfect_line() {
        let pts = [(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)];
        let line = ols(&pts).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert_eq!(line.endpoints()[1], (2.0, 5.0));
        assert!((pearson_r(&pts).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_fits_are_none() {
        assert!(ols(&[(1.0, 1.0)]).is_none());
        assert!(ols(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
        assert!(pearson_r(&[(1.0, 2.0), (2.0, 2.0)]).is_none());
    }
}
