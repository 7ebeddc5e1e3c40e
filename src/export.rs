use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::charts::{self, SUMMARY_HEADERS};
use crate::match_history::MatchRecord;
use crate::roster::Roster;
use crate::schema::Field;

pub struct ExportReport {
    pub match_rows: usize,
    pub summary_rows: usize,
}

/// Writes the rows currently on screen plus their per-player summary.
pub fn export_view(path: &Path, rows: &[&MatchRecord], roster: &Roster) -> Result<ExportReport> {
    let fields = Field::all();
    let mut match_rows = vec![
        fields
            .iter()
            .map(|f| Cell::Text(f.label().to_string()))
            .collect::<Vec<_>>(),
    ];
    for row in rows {
        match_rows.push(
            fields
                .iter()
                .map(|field| match field {
                    Field::Metric(metric) => match row.metric(*metric) {
                        Some(value) => Cell::Number(value),
                        None => Cell::Text(String::new()),
                    },
                    other => Cell::Text(row.value_text(*other)),
                })
                .collect(),
        );
    }

    let mut summary_rows = vec![
        SUMMARY_HEADERS
            .iter()
            .map(|h| Cell::Text(h.to_string()))
            .collect::<Vec<_>>(),
    ];
    for s in charts::summary(rows, roster) {
        summary_rows.push(vec![
            Cell::Text(s.name),
            Cell::Number(s.games as f64),
            Cell::Number(s.goals),
            Cell::Number(s.assists),
            Cell::Number(s.saves),
            Cell::Number(s.shots),
            Cell::Number(s.demolishes),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &match_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        match_rows: match_rows.len().saturating_sub(1),
        summary_rows: summary_rows.len().saturating_sub(1),
    })
}

enum Cell {
    Text(String),
    Number(f64),
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let written = match value {
                Cell::Text(text) => worksheet.write_string(row_idx as u32, col_idx as u16, text),
                Cell::Number(n) => worksheet.write_number(row_idx as u32, col_idx as u16, *n),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
