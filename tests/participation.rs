mod common;

use samu_tracker::context::DashboardContext;
use samu_tracker::match_history::{GameMode, MatchId, PlayerId};
use samu_tracker::participation::ParticipationIndex;

use common::{context_from, fixture_path, fixture_roster, letter_roster};

#[test]
fn index_covers_every_row_of_the_table() {
    let ctx = context_from(
        &[("M1", "A B C"), ("M2", "A B D"), ("M3", "C D E")],
        letter_roster(&["A", "B", "C", "D", "E"]),
        GameMode::STANDARD,
    );
    let index = ctx.participation();
    assert_eq!(index.len(), 3);
    for row in ctx.table().rows() {
        assert!(index.contains(&row.match_id, &row.player_id));
    }
    let total = index.iter().map(|(_, players)| players.len()).sum::<usize>();
    assert_eq!(total, ctx.table().len());

    let m2 = index.players(&MatchId::new("M2")).unwrap();
    assert_eq!(m2, &[PlayerId::new("A"), PlayerId::new("B"), PlayerId::new("D")]);
    assert!(index.players(&MatchId::new("M9")).is_none());
}

#[test]
fn index_from_loaded_history() {
    let config = samu_tracker::config::DashboardConfig {
        source: samu_tracker::config::HistorySource::ExportDir(fixture_path("exports")),
        roster_path: fixture_path("tracked_players.json"),
        ..Default::default()
    };
    let (ctx, report) = DashboardContext::load(&config).expect("fixtures load");
    assert_eq!(ctx.participation().len(), report.matches);
    assert_eq!(ctx.roster().len(), fixture_roster().len());

    let m2 = ctx.participation().players(&MatchId::new("2024-03-02_19-00-00")).unwrap();
    assert_eq!(m2.len(), 3);
    // Bravo's only line in this match was malformed.
    assert!(!ctx.participation().contains(
        &MatchId::new("2024-03-03_21-30-10"),
        &PlayerId::new("Epic|bravo01|0")
    ));
}

#[test]
fn empty_table_gives_empty_index() {
    let index = ParticipationIndex::build(&Default::default());
    assert!(index.is_empty());
}
