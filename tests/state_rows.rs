mod common;

use samu_tracker::charts::{TrendOption, TrendScope};
use samu_tracker::filter::PlayerFilter;
use samu_tracker::match_history::{GameMode, MatchId, PlayerId};
use samu_tracker::schema::Metric;
use samu_tracker::state::{AppState, DEFAULT_RECENCY, Screen};

use common::{context_from, letter_roster};

fn doubles_ctx() -> samu_tracker::context::DashboardContext {
    let matches = (1..=8)
        .map(|n| (format!("2024-02-{n:02}_21-00-00"), if n <= 2 { "A B C" } else { "A B" }))
        .collect::<Vec<_>>();
    let refs = matches.iter().map(|(id, p)| (id.as_str(), *p)).collect::<Vec<_>>();
    context_from(&refs, letter_roster(&["A", "B", "C"]), GameMode::DOUBLES)
}

#[test]
fn new_state_clamps_recency_to_available_matches() {
    let ctx = doubles_ctx();
    let state = AppState::new(&ctx);
    assert_eq!(state.screen, Screen::Dashboard);
    // 3v3 is offered first and holds no matches here.
    assert_eq!(state.selection.game_mode, GameMode::STANDARD);
    assert_eq!(state.recency_limit, 0);
    assert_eq!(state.selection.recency_count, 1);
    assert!(state.detail_match.is_none());
    assert_eq!(state.x_metric, Metric::Score);
    assert_eq!(state.y_metric, Metric::Goals);
    assert_eq!(state.trend, TrendOption::Ols);
}

#[test]
fn cycling_mode_updates_limit_and_logs() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    state.cycle_mode(&ctx);
    assert_eq!(state.selection.game_mode, GameMode::DOUBLES);
    assert_eq!(state.recency_limit, 8);
    assert_eq!(
        state.detail_match,
        Some(MatchId::new("2024-02-08_21-00-00"))
    );
    assert!(state.logs.back().unwrap().contains("2v2"));

    state.recency_up(DEFAULT_RECENCY);
    assert_eq!(state.selection.recency_count, 8);
    state.recency_down(3);
    assert_eq!(state.selection.recency_count, 5);
    state.recency_down(50);
    assert_eq!(state.selection.recency_count, 1);
}

#[test]
fn player_filter_cycle_reclamps_recency() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    state.cycle_mode(&ctx);
    state.recency_up(DEFAULT_RECENCY);
    assert_eq!(state.selection.recency_count, 8);

    // Roster order is A, B, C; move to C and include it.
    state.player_next(&ctx);
    state.player_next(&ctx);
    state.cycle_player_filter(&ctx);
    assert_eq!(
        state.selection.filter_for(&PlayerId::new("C")),
        PlayerFilter::Include
    );
    assert_eq!(state.recency_limit, 2);
    assert_eq!(state.selection.recency_count, 2);
    assert_eq!(
        state.detail_match,
        Some(MatchId::new("2024-02-02_21-00-00"))
    );

    // Exclude C: six matches left, the count stays where the clamp put it.
    state.cycle_player_filter(&ctx);
    assert_eq!(state.recency_limit, 6);
    assert_eq!(state.selection.recency_count, 2);
}

#[test]
fn cursor_wraps_around_roster() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    state.player_prev(&ctx);
    assert_eq!(state.player_cursor, 2);
    state.player_next(&ctx);
    assert_eq!(state.player_cursor, 0);
}

#[test]
fn detail_match_steps_through_filtered_matches() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    state.cycle_mode(&ctx);
    state.recency_up(2);
    assert_eq!(state.selection.recency_count, 3);

    state.step_detail_match(&ctx, true);
    state.step_detail_match(&ctx, true);
    state.step_detail_match(&ctx, true);
    assert_eq!(
        state.detail_match,
        Some(MatchId::new("2024-02-06_21-00-00"))
    );
    state.step_detail_match(&ctx, false);
    assert_eq!(
        state.detail_match,
        Some(MatchId::new("2024-02-07_21-00-00"))
    );
}

#[test]
fn trend_scope_only_toggles_with_trend_on() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    state.toggle_trend_scope();
    assert_eq!(state.trend_scope, TrendScope::PerPlayer);
    state.toggle_trend();
    assert_eq!(state.trend, TrendOption::None);
    state.toggle_trend_scope();
    assert_eq!(state.trend_scope, TrendScope::PerPlayer);
}

#[test]
fn logs_are_capped() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    for i in 0..250 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));
}

#[test]
fn scatter_variables_cycle_both_ways() {
    let ctx = doubles_ctx();
    let mut state = AppState::new(&ctx);
    assert_eq!(state.variables.len(), Metric::ALL.len());
    state.cycle_x(false);
    assert_eq!(state.x_metric, Metric::BoostUsage);
    state.cycle_x(true);
    assert_eq!(state.x_metric, Metric::Score);
    state.cycle_y(true);
    assert_eq!(state.y_metric, Metric::Assists);
}
