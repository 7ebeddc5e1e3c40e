use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use samu_tracker::charts::{self, TrendOption, TrendScope};
use samu_tracker::context::DashboardContext;
use samu_tracker::fake_feed::{self, FakeFeedOptions};
use samu_tracker::filter::{FilterSelection, PlayerFilter};
use samu_tracker::match_history::{GameMode, PlayerId, build_match_history};
use samu_tracker::raw_export::{RawHistory, read_export_csv};
use samu_tracker::roster::Roster;
use samu_tracker::schema::{EXPECTED_RAW_COLUMNS, Metric};

fn tracked() -> Vec<(String, String)> {
    (0..6)
        .map(|i| (format!("Steam|7656119800000000{i}|0"), format!("Player{i}")))
        .collect()
}

fn sample_history(matches: usize) -> (RawHistory, Roster) {
    let players = tracked();
    let opts = FakeFeedOptions {
        matches,
        ..FakeFeedOptions::default()
    };
    let mut history = RawHistory::default();
    for export in fake_feed::generate_exports(&players, &opts) {
        let (rows, recovered) =
            read_export_csv(export.body.as_bytes(), EXPECTED_RAW_COLUMNS).unwrap();
        history.rows.extend(rows);
        history.recovered += recovered;
    }
    (history, Roster::from_pairs(players))
}

fn bench_export_parse(c: &mut Criterion) {
    let exports = fake_feed::generate_exports(&tracked(), &FakeFeedOptions::default());
    c.bench_function("export_csv_parse", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for export in &exports {
                let (rows, _) =
                    read_export_csv(black_box(export.body.as_bytes()), EXPECTED_RAW_COLUMNS)
                        .unwrap();
                total += rows.len();
            }
            black_box(total);
        })
    });
}

fn bench_build_history(c: &mut Criterion) {
    let (history, roster) = sample_history(2000);
    c.bench_function("build_match_history_2000", |b| {
        b.iter(|| {
            let (table, report) = build_match_history(black_box(history.clone()), &roster).unwrap();
            black_box((table.len(), report.matches));
        })
    });
}

fn bench_filter_pipeline(c: &mut Criterion) {
    let (history, roster) = sample_history(2000);
    let (table, _) = build_match_history(history, &roster).unwrap();
    let ctx = DashboardContext::new(roster, table);
    let selection = FilterSelection::new(GameMode::DOUBLES, 100)
        .with_player(PlayerId::new("Steam|76561198000000000|0"), PlayerFilter::Include)
        .with_player(PlayerId::new("Steam|76561198000000003|0"), PlayerFilter::Exclude);
    c.bench_function("filter_pipeline_2000", |b| {
        b.iter(|| {
            let outcome = ctx.filter(black_box(&selection));
            black_box((outcome.rows.len(), outcome.recency_max));
        })
    });
}

fn bench_scatter(c: &mut Criterion) {
    let (history, roster) = sample_history(2000);
    let (table, _) = build_match_history(history, &roster).unwrap();
    let rows = table.rows().iter().collect::<Vec<_>>();
    c.bench_function("scatter_overall_ols", |b| {
        b.iter(|| {
            let chart = charts::scatter(
                black_box(&rows),
                &roster,
                Metric::Score,
                Metric::Goals,
                TrendOption::Ols,
                TrendScope::Overall,
            );
            black_box(chart.r_squared);
        })
    });
}

criterion_group!(
    perf,
    bench_export_parse,
    bench_build_history,
    bench_filter_pipeline,
    bench_scatter
);
criterion_main!(perf);
