mod common;

use samu_tracker::charts::{self, TrendOption, TrendScope};
use samu_tracker::config::HistorySource;
use samu_tracker::match_history::{MatchId, MatchRecord, MatchTable, Team, load_match_history};
use samu_tracker::roster::Roster;
use samu_tracker::schema::{EXPECTED_RAW_COLUMNS, Metric};

use common::{fixture_path, fixture_roster};

fn fixture_table() -> (MatchTable, Roster) {
    let roster = fixture_roster();
    let (table, _) = load_match_history(
        &HistorySource::ExportDir(fixture_path("exports")),
        &roster,
        EXPECTED_RAW_COLUMNS,
    )
    .expect("fixtures load");
    (table, roster)
}

#[test]
fn empty_rows_give_empty_charts() {
    let roster = fixture_roster();
    let rows: Vec<&MatchRecord> = Vec::new();
    assert!(charts::box_summary(&rows, &roster, Metric::Score).is_empty());
    assert!(charts::winrate(&rows, &roster).is_empty());
    assert!(charts::summary(&rows, &roster).is_empty());

    let chart = charts::scatter(
        &rows,
        &roster,
        Metric::Score,
        Metric::Goals,
        TrendOption::Ols,
        TrendScope::Overall,
    );
    assert!(chart.series.is_empty());
    assert!(chart.overall_trend.is_none());
    assert!(chart.r_squared.is_none());
    assert!(chart.bounds().is_none());
}

#[test]
fn winrate_counts_draws_as_games() {
    let (table, roster) = fixture_table();
    let rows = table.rows().iter().collect::<Vec<_>>();
    let bars = charts::winrate(&rows, &roster);

    let names = bars.iter().map(|b| b.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie", "Delta"]);
    assert_eq!((bars[0].games, bars[0].wins), (2, 1));
    assert_eq!(bars[0].winrate, 50.0);
    assert_eq!(bars[1].winrate, 0.0);
    assert_eq!(bars[3].winrate, 50.0);
}

#[test]
fn box_summary_uses_interpolated_quartiles() {
    let (table, roster) = fixture_table();
    let rows = table.rows().iter().collect::<Vec<_>>();
    let boxes = charts::box_summary(&rows, &roster, Metric::Score);
    let alpha = &boxes[0];
    assert_eq!(alpha.name, "Alpha");
    assert_eq!(alpha.n, 2);
    assert_eq!(alpha.min, 300.0);
    assert_eq!(alpha.q1, 353.0);
    assert_eq!(alpha.median, 406.0);
    assert_eq!(alpha.q3, 459.0);
    assert_eq!(alpha.max, 512.0);
    assert_eq!(alpha.points.len(), 2);
}

#[test]
fn box_summary_skips_players_without_values() {
    let (table, roster) = fixture_table();
    let alpha_m2 = table
        .rows()
        .iter()
        .filter(|r| r.display_name == "Alpha" && r.pads.is_none())
        .collect::<Vec<_>>();
    assert_eq!(alpha_m2.len(), 1);
    assert!(charts::box_summary(&alpha_m2, &roster, Metric::Pads).is_empty());
}

#[test]
fn overall_trend_reports_r_squared() {
    let (table, roster) = fixture_table();
    let rows = table.rows().iter().collect::<Vec<_>>();

    let overall = charts::scatter(
        &rows,
        &roster,
        Metric::Shots,
        Metric::Goals,
        TrendOption::Ols,
        TrendScope::Overall,
    );
    let r2 = overall.r_squared.expect("r squared for overall fit");
    assert!((0.0..=1.0).contains(&r2));
    assert!(overall.overall_trend.is_some());
    assert!(overall.series.iter().all(|s| s.trend.is_none()));
    let points = overall.series.iter().map(|s| s.points.len()).sum::<usize>();
    assert_eq!(points, rows.len());

    let per_player = charts::scatter(
        &rows,
        &roster,
        Metric::Shots,
        Metric::Goals,
        TrendOption::Ols,
        TrendScope::PerPlayer,
    );
    assert!(per_player.r_squared.is_none());
    assert!(per_player.overall_trend.is_none());
    // Bravo has a single row, no line through one point.
    let bravo = per_player.series.iter().find(|s| s.name == "Bravo").unwrap();
    assert!(bravo.trend.is_none());

    let off = charts::scatter(
        &rows,
        &roster,
        Metric::Shots,
        Metric::Goals,
        TrendOption::None,
        TrendScope::Overall,
    );
    assert!(off.r_squared.is_none());
    assert!(off.overall_trend.is_none());
}

#[test]
fn summary_sums_per_player() {
    let (table, roster) = fixture_table();
    let rows = table.rows().iter().collect::<Vec<_>>();
    let summary = charts::summary(&rows, &roster);
    let delta = summary.iter().find(|s| s.name == "Delta").unwrap();
    assert_eq!(delta.games, 2);
    assert_eq!(delta.goals, 4.0);
    assert_eq!(delta.saves, 5.0);
    assert_eq!(delta.demolishes, 1.0);
}

#[test]
fn match_detail_orders_by_team_then_score() {
    let (table, _) = fixture_table();
    let detail = charts::match_detail(&table, &MatchId::new("2024-03-02_19-00-00"));
    let order = detail
        .iter()
        .map(|d| (d.team, d.player_name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![(Team::Blue, "Alpha"), (Team::Blue, "Charlie"), (Team::Orange, "Delta")]
    );
    assert!(charts::match_detail(&table, &MatchId::new("missing")).is_empty());
}
