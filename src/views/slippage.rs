use anyhow::Result;
use comfy_table::Cell;

use crate::backend::ExchangeBackend;
use crate::market::{Country, Slippage, short_source_name};
use crate::views::ui;

pub async fn run(backend: &dyn ExchangeBackend, country: Country) -> Result<()> {
    let pb = ui::new_spinner("Fetching slippage...");
    let slippage = backend.slippage(country).await;
    pb.finish_and_clear();

    println!("{}", render(&slippage?));
    Ok(())
}

pub fn render(entries: &[Slippage]) -> String {
    let title = "Slippage vs. cross-source average";
    if entries.is_empty() {
        return format!(
            "{}\n{}",
            ui::style_text(title, ui::StyleType::Title),
            ui::style_text("No slippage data available.", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Source"),
        ui::header_cell("Buy slippage"),
        ui::header_cell("Sell slippage"),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(short_source_name(&entry.source)),
            ui::signed_percentage_cell(entry.buy_price_slippage),
            ui::signed_percentage_cell(entry.sell_price_slippage),
        ]);
    }

    format!("{}\n{}", ui::style_text(title, ui::StyleType::Title), table)
}
