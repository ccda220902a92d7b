// src/adapters/html.rs

//! Selector-driven HTML tables.
//!
//! Covers the common layout of exported schedules: one block per day with a
//! date heading and a table whose columns are listed in the configuration.
//! Cells keep their inner markup so struck-through values survive.

use scraper::{ElementRef, Html, Selector};

use super::SourceAdapter;
use crate::error::{AppError, Result};
use crate::models::{AdapterConfig, ColumnType, RawCell, RawDay, RawMessage, RawPage, RawRow};
use crate::utils::normalize_whitespace;

#[derive(Debug, Clone)]
pub struct HtmlTableAdapter {
    columns: Vec<ColumnType>,
    day: Option<Selector>,
    date: Option<Selector>,
    row: Selector,
    cell: Selector,
    last_change: Option<Selector>,
    message: Option<Selector>,
    info: Option<Selector>,
}

impl HtmlTableAdapter {
    /// Compile the configured selectors.
    pub fn new(config: &AdapterConfig) -> Result<Self> {
        let optional = |s: &Option<String>| s.as_deref().map(Self::parse_selector).transpose();

        Ok(Self {
            columns: config.column_types()?,
            day: optional(&config.day_selector)?,
            date: optional(&config.date_selector)?,
            row: Self::parse_selector(&config.row_selector)?,
            cell: Self::parse_selector(&config.cell_selector)?,
            last_change: optional(&config.last_change_selector)?,
            message: optional(&config.message_selector)?,
            info: optional(&config.info_selector)?,
        })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }

    fn parse_day(&self, container: ElementRef<'_>) -> RawDay {
        let date = self
            .date
            .as_ref()
            .and_then(|sel| container.select(sel).next())
            .map(text_of)
            .filter(|t| !t.is_empty());

        let messages = self
            .message
            .as_ref()
            .map(|sel| {
                container
                    .select(sel)
                    .map(text_of)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rows = container
            .select(&self.row)
            .filter_map(|row| self.parse_row(row))
            .collect();

        RawDay {
            date,
            last_change: None,
            messages,
            rows,
        }
    }

    /// Header rows (no data cells) yield `None`.
    fn parse_row(&self, row: ElementRef<'_>) -> Option<RawRow> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.cell).collect();
        if cells.is_empty() {
            return None;
        }
        if cells.len() != self.columns.len() {
            log::debug!(
                "Row has {} cells, {} columns configured",
                cells.len(),
                self.columns.len()
            );
        }

        Some(RawRow {
            cells: self
                .columns
                .iter()
                .zip(cells)
                .map(|(column, cell)| RawCell::new(*column, cell.inner_html().trim()))
                .collect(),
        })
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

impl SourceAdapter for HtmlTableAdapter {
    fn name(&self) -> &str {
        "html"
    }

    fn parse(&self, input: &str) -> Result<RawPage> {
        let document = Html::parse_document(input);

        let last_change = self
            .last_change
            .as_ref()
            .and_then(|sel| document.select(sel).next())
            .map(text_of)
            .filter(|t| !t.is_empty());

        let messages = self
            .info
            .as_ref()
            .map(|sel| {
                document
                    .select(sel)
                    .map(text_of)
                    .filter(|t| !t.is_empty())
                    .map(|text| RawMessage {
                        title: None,
                        text,
                        date: None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let days: Vec<RawDay> = match &self.day {
            Some(sel) => document.select(sel).map(|c| self.parse_day(c)).collect(),
            None => vec![self.parse_day(document.root_element())],
        };

        if self.day.is_some() && days.is_empty() && document.select(&self.row).next().is_some() {
            return Err(AppError::structure(
                "html page",
                "rows found outside of any day block",
            ));
        }

        Ok(RawPage {
            last_change,
            days,
            messages,
            ..RawPage::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <p class="stand">Stand: 03.03.2025 07:30</p>
          <div class="info">Schulfest am Freitag</div>
          <div class="day">
            <h2>Montag, 3. März</h2>
            <div class="message">Aula gesperrt</div>
            <table>
              <tr><th>Klasse</th><th>Stunde</th><th>Fach</th></tr>
              <tr><td>5a</td><td>1</td><td><s>Ma</s> De</td></tr>
              <tr><td>6b</td><td>3</td><td>---</td></tr>
            </table>
          </div>
          <div class="day">
            <h2>Dienstag, 4. März</h2>
            <table><tr><td>7c</td><td>2</td><td>En</td></tr></table>
          </div>
        </body></html>
    "#;

    fn config() -> AdapterConfig {
        AdapterConfig {
            columns: vec!["class".into(), "lesson".into(), "subject".into()],
            day_selector: Some("div.day".into()),
            date_selector: Some("h2".into()),
            last_change_selector: Some("p.stand".into()),
            message_selector: Some("div.message".into()),
            info_selector: Some("div.info".into()),
            ..AdapterConfig::default()
        }
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(HtmlTableAdapter::parse_selector("div.class").is_ok());
        assert!(HtmlTableAdapter::parse_selector("tr:has(td)").is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(matches!(
            HtmlTableAdapter::parse_selector("[[invalid"),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_parse_days_and_rows() {
        let page = HtmlTableAdapter::new(&config()).unwrap().parse(PAGE).unwrap();

        assert_eq!(page.last_change.as_deref(), Some("Stand: 03.03.2025 07:30"));
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].text, "Schulfest am Freitag");

        assert_eq!(page.days.len(), 2);
        let monday = &page.days[0];
        assert_eq!(monday.date.as_deref(), Some("Montag, 3. März"));
        assert_eq!(monday.messages, vec!["Aula gesperrt"]);
        // header row skipped
        assert_eq!(monday.rows.len(), 2);
        assert_eq!(monday.rows[0].text_of(ColumnType::Class), Some("5a"));
        assert_eq!(monday.rows[0].text_of(ColumnType::Subject), Some("<s>Ma</s> De"));

        assert_eq!(page.days[1].rows.len(), 1);
    }

    #[test]
    fn test_whole_page_without_day_selector() {
        let config = AdapterConfig {
            columns: vec!["class".into(), "lesson".into(), "subject".into()],
            ..AdapterConfig::default()
        };
        let page = HtmlTableAdapter::new(&config).unwrap().parse(PAGE).unwrap();
        assert_eq!(page.days.len(), 1);
        assert_eq!(page.days[0].date, None);
        assert_eq!(page.days[0].rows.len(), 3);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let config = AdapterConfig {
            columns: vec!["klasse".into()],
            ..AdapterConfig::default()
        };
        assert!(matches!(
            HtmlTableAdapter::new(&config),
            Err(AppError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_rows_outside_day_blocks() {
        let config = AdapterConfig {
            day_selector: Some("section.tag".into()),
            ..config()
        };
        let result = HtmlTableAdapter::new(&config).unwrap().parse(PAGE);
        assert!(matches!(result, Err(AppError::Structure { .. })));
    }
}
