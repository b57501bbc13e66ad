use anyhow::Result;
use chrono::DateTime;

use crate::backend::ExchangeBackend;
use crate::market::{Country, NewsItem};
use crate::views::ui;

pub async fn run(backend: &dyn ExchangeBackend, country: Country) -> Result<()> {
    let pb = ui::new_spinner("Fetching economic news...");
    let news = backend.news(country).await;
    pb.finish_and_clear();

    println!("{}", render(&news?, None));
    Ok(())
}

/// Renders news items as a headline list. `limit` trims the list for the
/// dashboard view; `None` shows everything.
pub fn render(items: &[NewsItem], limit: Option<usize>) -> String {
    let title = "Economic news";
    if items.is_empty() {
        return format!(
            "{}\n{}",
            ui::style_text(title, ui::StyleType::Title),
            ui::style_text("No news available right now.", ui::StyleType::Subtle)
        );
    }

    let mut output = ui::style_text(title, ui::StyleType::Title);
    let shown = limit.unwrap_or(items.len());
    for item in items.iter().take(shown) {
        output.push('\n');
        output.push_str(&ui::style_text(&item.title, ui::StyleType::Label));

        let mut meta = Vec::new();
        if let Some(source) = &item.source {
            meta.push(source.clone());
        }
        if let Some(published) = &item.published_at {
            meta.push(format_published(published));
        }
        if !meta.is_empty() {
            output.push('\n');
            output.push_str(&ui::style_text(
                &format!("  {}", meta.join(" | ")),
                ui::StyleType::Subtle,
            ));
        }
        if let Some(description) = &item.description
            && !description.is_empty()
        {
            output.push('\n');
            output.push_str(&format!("  {description}"));
        }
    }
    output
}

fn format_published(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            source: Some("G1".to_string()),
            url: None,
            published_at: Some("2025-03-14T12:00:00Z".to_string()),
            description: Some("Details here.".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn test_render_shows_title_and_meta() {
        let output = render(&[item("Central bank holds rate")], None);
        assert!(output.contains("Central bank holds rate"));
        assert!(output.contains("G1"));
        assert!(output.contains("2025-03-14 12:00"));
        assert!(output.contains("Details here."));
    }

    #[test]
    fn test_render_respects_limit() {
        let items = vec![item("first"), item("second"), item("third")];
        let output = render(&items, Some(2));
        assert!(output.contains("first"));
        assert!(output.contains("second"));
        assert!(!output.contains("third"));
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        assert_eq!(format_published("soon"), "soon");
    }
}
