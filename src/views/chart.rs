use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeSet;

use crate::backend::ExchangeBackend;
use crate::history::{self, ChartSeries, PriceKind};
use crate::market::{Country, Period};
use crate::views::ui;

pub async fn run(
    backend: &dyn ExchangeBackend,
    country: Country,
    period: Period,
    side: PriceKind,
    sparse_threshold: usize,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching historical series...");
    let payload = backend.historical(country, period).await;
    pb.finish_and_clear();

    let series = history::reconstruct(payload?, period, sparse_threshold)?;
    println!("{}", render(&series, side, country, period));
    Ok(())
}

/// Renders the reconstructed series as a table: one row per timestamp, one
/// column per source for the selected price side.
pub fn render(series: &ChartSeries, side: PriceKind, country: Country, period: Period) -> String {
    let title = format!(
        "Rate evolution USD/{} ({period}, {side} side)",
        country.currency()
    );

    let suffix = format!("_{side}");
    let columns: BTreeSet<&str> = series
        .rows
        .iter()
        .flat_map(|row| row.values.keys())
        .filter_map(|key| key.strip_suffix(suffix.as_str()))
        .collect();

    if series.rows.is_empty() || columns.is_empty() {
        return format!(
            "{}\n{}",
            ui::style_text(&title, ui::StyleType::Title),
            ui::style_text("No chart data available.", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Date"), ui::header_cell("Time")];
    header.extend(columns.iter().map(|name| ui::header_cell(name)));
    table.set_header(header);

    for row in &series.rows {
        let mut cells = vec![Cell::new(&row.date), Cell::new(&row.time)];
        for name in &columns {
            let key = format!("{name}{suffix}");
            cells.push(match row.values.get(&key) {
                Some(v) => ui::value_cell(format!("{v:.4}")),
                None => Cell::new("-"),
            });
        }
        table.add_row(cells);
    }

    let mut output = format!(
        "{}\n{}",
        ui::style_text(&title, ui::StyleType::Title),
        table
    );
    if series.approximated {
        output.push('\n');
        output.push_str(&ui::style_text(
            "* approximated data: synthetic or interpolated values",
            ui::StyleType::Subtle,
        ));
    }
    output
}
