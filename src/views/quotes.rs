use anyhow::Result;
use comfy_table::Cell;

use crate::backend::ExchangeBackend;
use crate::market::{Country, Quote, short_source_name};
use crate::views::ui;

pub async fn run(backend: &dyn ExchangeBackend, country: Country) -> Result<()> {
    let pb = ui::new_spinner("Fetching quotes...");
    let quotes = backend.quotes(country).await;
    pb.finish_and_clear();

    println!("{}", render(&quotes?, country));
    Ok(())
}

pub fn render(quotes: &[Quote], country: Country) -> String {
    let title = format!("Quotes USD/{}", country.currency());
    if quotes.is_empty() {
        return format!(
            "{}\n{}",
            ui::style_text(&title, ui::StyleType::Title),
            ui::style_text("No quotes available right now.", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Source"),
        ui::header_cell(&format!("Buy ({})", country.currency())),
        ui::header_cell(&format!("Sell ({})", country.currency())),
    ]);

    for quote in quotes {
        table.add_row(vec![
            Cell::new(short_source_name(&quote.source)),
            ui::value_cell(format!("{:.4}", quote.buy_price)),
            ui::value_cell(format!("{:.4}", quote.sell_price)),
        ]);
    }

    format!(
        "{}\n{}",
        ui::style_text(&title, ui::StyleType::Title),
        table
    )
}
