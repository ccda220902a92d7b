//! JSON pages.
//!
//! The document is the serde form of [`RawPage`]:
//!
//! ```json
//! {
//!   "lastChange": "Stand: 03.03.2025 07:30",
//!   "days": [{
//!     "date": "Montag, 3. März",
//!     "messages": ["Aula gesperrt"],
//!     "rows": [{ "cells": [{ "column": "class", "text": "5a" }] }]
//!   }],
//!   "messages": [{ "title": "Hinweis", "text": "Schulfest" }]
//! }
//! ```

use super::SourceAdapter;
use crate::error::{AppError, Result};
use crate::models::RawPage;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageAdapter;

impl SourceAdapter for JsonPageAdapter {
    fn name(&self) -> &str {
        "json"
    }

    fn parse(&self, input: &str) -> Result<RawPage> {
        serde_json::from_str(input).map_err(|e| AppError::structure("json page", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    #[test]
    fn test_parse_page() {
        let json = r#"{
            "lastChange": "Stand: 03.03.2025 07:30",
            "days": [{
                "date": "Montag, 3. März",
                "rows": [{ "cells": [
                    { "column": "class", "text": "5a" },
                    { "column": "previousSubject", "text": "Ma" }
                ]}]
            }],
            "messages": [{ "title": "Hinweis", "text": "Schulfest" }]
        }"#;

        let page = JsonPageAdapter.parse(json).unwrap();
        assert_eq!(page.last_change.as_deref(), Some("Stand: 03.03.2025 07:30"));
        assert_eq!(page.days.len(), 1);
        let row = &page.days[0].rows[0];
        assert_eq!(row.text_of(ColumnType::PreviousSubject), Some("Ma"));
        assert_eq!(page.messages[0].date, None);
    }

    #[test]
    fn test_unknown_column_is_structural() {
        let json = r#"{"days":[{"date":"03.03.","rows":[{"cells":[{"column":"stunde","text":"1"}]}]}]}"#;
        let err = JsonPageAdapter.parse(json).unwrap_err();
        assert!(matches!(err, AppError::Structure { .. }));
        assert!(err.to_string().contains("stunde"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(JsonPageAdapter.parse("{not json").is_err());
    }
}
