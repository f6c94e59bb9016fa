//! Report row building
//!
//! Turns the records of one section into a header row plus one value row per
//! record, following the section's fixed column schema.

use crate::domain::{
    CellValue, Column, FieldValue, Record, ReportError, ReportRow, Result, Section,
};

/// Maps records to report rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Header row then one row per record, in input order
    ///
    /// Absent values become empty cells, dates become `YYYY-MM-DD`, numbers
    /// pass through unformatted.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a record belongs to another section.
    ///
    /// # Examples
    ///
    /// ```
    /// use crm_reports::core::report::ReportBuilder;
    /// use crm_reports::domain::Section;
    ///
    /// let rows = ReportBuilder::new().build(Section::Deals, &[]).unwrap();
    /// assert_eq!(rows.len(), 1);
    /// assert_eq!(rows[0].len(), 8);
    /// ```
    pub fn build(&self, section: Section, records: &[Record]) -> Result<Vec<ReportRow>> {
        let schema = section.schema();
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(ReportRow(
            schema.headers().into_iter().map(CellValue::from).collect(),
        ));

        for (index, record) in records.iter().enumerate() {
            if record.section() != section {
                return Err(ReportError::InvalidArgument(format!(
                    "record {index} belongs to {}, not {section}",
                    record.section()
                )));
            }
            rows.push(ReportRow(
                schema.columns.iter().map(|c| cell_for(c, record)).collect(),
            ));
        }

        Ok(rows)
    }
}

/// Value of `column` for `record`
pub fn cell_for(column: &Column, record: &Record) -> CellValue {
    match record.field(column.key) {
        FieldValue::Text(Some(text)) => match column.max_chars {
            Some(limit) => CellValue::Text(truncate_chars(&text, limit)),
            None => CellValue::Text(text),
        },
        FieldValue::Integer(value) => value.into(),
        FieldValue::Decimal(value) => value.into(),
        FieldValue::Bool(value) => CellValue::Bool(value),
        FieldValue::Date(Some(date)) => CellValue::Text(date.format("%Y-%m-%d").to_string()),
        FieldValue::Text(None) | FieldValue::Date(None) | FieldValue::Missing => CellValue::empty(),
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{records_from_json, NOTES_MAX_CHARS};

    fn clients(json: &str) -> Vec<Record> {
        records_from_json(Section::Clients, json).unwrap()
    }

    #[test]
    fn test_clients_row_mapping() {
        let records = clients(
            r#"[{"id":1,"name":"Acme","email":"a@x.com","phone":null,"status":"active","notes":null}]"#,
        );
        let rows = ReportBuilder::new().build(Section::Clients, &records).unwrap();

        let expected_header: Vec<CellValue> = ["ID", "Name", "Email", "Phone", "Status", "Notes"]
            .into_iter()
            .map(CellValue::from)
            .collect();
        assert_eq!(rows[0].cells(), expected_header.as_slice());
        assert_eq!(
            rows[1].cells(),
            &[
                CellValue::Number(1.0),
                CellValue::from("Acme"),
                CellValue::from("a@x.com"),
                CellValue::empty(),
                CellValue::from("active"),
                CellValue::empty(),
            ]
        );
    }

    #[test]
    fn test_empty_records_give_header_only() {
        for section in Section::ALL {
            let rows = ReportBuilder::new().build(section, &[]).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].len(), section.schema().width());
        }
    }

    #[test]
    fn test_input_order_is_kept() {
        let records = clients(
            r#"[{"id":3,"name":"C","status":"active"},{"id":1,"name":"A","status":"active"}]"#,
        );
        let rows = ReportBuilder::new().build(Section::Clients, &records).unwrap();
        assert_eq!(rows[1].cells()[0], CellValue::Number(3.0));
        assert_eq!(rows[2].cells()[0], CellValue::Number(1.0));
    }

    #[test]
    fn test_foreign_record_rejected() {
        let records = clients(r#"[{"id":1,"name":"A","status":"active"}]"#);
        let err = ReportBuilder::new().build(Section::Deals, &records).unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
    }

    #[test]
    fn test_deal_dates_and_amounts() {
        let records = records_from_json(
            Section::Deals,
            r#"[{"id":7,"title":"Renewal","client_id":1,"amount":1500.5,"status":"won",
                 "created_at":"2025-01-02T23:59:00Z","updated_at":null}]"#,
        )
        .unwrap();
        let rows = ReportBuilder::new().build(Section::Deals, &records).unwrap();
        let cells = rows[1].cells();
        assert_eq!(cells[3], CellValue::Number(1500.5));
        assert_eq!(cells[6], CellValue::from("2025-01-02"));
        assert!(cells[7].is_empty());
    }

    #[test]
    fn test_task_completed_is_boolean() {
        let records = records_from_json(
            Section::Tasks,
            r#"[{"id":1,"title":"Call","is_completed":false,"client_id":null}]"#,
        )
        .unwrap();
        let rows = ReportBuilder::new().build(Section::Tasks, &records).unwrap();
        assert_eq!(rows[1].cells()[5], CellValue::Bool(false));
        assert!(rows[1].cells()[3].is_empty());
    }

    #[test]
    fn test_notes_truncated_on_char_boundary() {
        let long = "é".repeat(NOTES_MAX_CHARS + 10);
        let json = serde_json::json!([{"id":1,"name":"A","status":"active","notes": long}]).to_string();
        let rows = ReportBuilder::new()
            .build(Section::Clients, &clients(&json))
            .unwrap();
        match &rows[1].cells()[5] {
            CellValue::Text(text) => assert_eq!(text.chars().count(), NOTES_MAX_CHARS),
            other => panic!("unexpected cell: {other:?}"),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = clients(r#"[{"id":1,"name":"A","status":"archived","notes":"x"}]"#);
        let builder = ReportBuilder::new();
        assert_eq!(
            builder.build(Section::Clients, &records).unwrap(),
            builder.build(Section::Clients, &records).unwrap()
        );
    }
}
