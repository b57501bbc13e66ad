use anyhow::Result;

use crate::backend::ExchangeBackend;
use crate::market::{AverageQuote, Country};
use crate::views::ui;

pub async fn run(backend: &dyn ExchangeBackend, country: Country) -> Result<()> {
    let pb = ui::new_spinner("Fetching average...");
    let average = backend.average(country).await;
    pb.finish_and_clear();

    println!("{}", render(&average?, country));
    Ok(())
}

pub fn render(average: &AverageQuote, country: Country) -> String {
    format!(
        "{}\n{} {}\n{} {}",
        ui::style_text("Cross-source average", ui::StyleType::Title),
        ui::style_text("Average buy: ", ui::StyleType::Label),
        ui::style_text(
            &format!("{:.4} {}", average.average_buy_price, country.currency()),
            ui::StyleType::Value
        ),
        ui::style_text("Average sell:", ui::StyleType::Label),
        ui::style_text(
            &format!("{:.4} {}", average.average_sell_price, country.currency()),
            ui::StyleType::Value
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shows_both_averages() {
        let average = AverageQuote {
            average_buy_price: 5.1111,
            average_sell_price: 5.2222,
        };
        let output = render(&average, Country::Brazil);
        assert!(output.contains("5.1111 BRL"));
        assert!(output.contains("5.2222 BRL"));
    }
}
