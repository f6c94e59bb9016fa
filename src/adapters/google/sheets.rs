//! Sheets API v4 gateway
//!
//! Value operations go through `spreadsheets.values`; structure and
//! formatting operations are single `spreadsheets.batchUpdate` calls.
//! Values are read unformatted so numbers and booleans come back typed.

use super::client::GoogleApiClient;
use crate::adapters::traits::SpreadsheetGateway;
use crate::config::GoogleConfig;
use crate::domain::{
    pad_matrix, quote_sheet_name, A1Range, CellValue, GridRange, IndexSpan, RemoteError,
    ReportError, Result, Rgb, SpreadsheetDescriptor,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResource {
    spreadsheet_id: String,
    #[serde(default)]
    sheets: Vec<SheetResource>,
    #[serde(default)]
    spreadsheet_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

impl From<SpreadsheetResource> for SpreadsheetDescriptor {
    fn from(resource: SpreadsheetResource) -> Self {
        SpreadsheetDescriptor {
            spreadsheet_id: resource.spreadsheet_id,
            sheet_titles: resource
                .sheets
                .into_iter()
                .map(|s| s.properties.title)
                .collect(),
            url: resource.spreadsheet_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<CellValue>>,
}

fn grid_range(sheet_id: i64, range: GridRange) -> Value {
    json!({
        "sheetId": sheet_id,
        "startRowIndex": range.start_row,
        "endRowIndex": range.end_row,
        "startColumnIndex": range.start_col,
        "endColumnIndex": range.end_col,
    })
}

fn dimension_range(sheet_id: i64, dimension: &str, span: IndexSpan) -> Value {
    json!({
        "sheetId": sheet_id,
        "dimension": dimension,
        "startIndex": span.start,
        "endIndex": span.end,
    })
}

/// Gateway backed by the Google Sheets REST API
pub struct GoogleSheetsGateway {
    api: GoogleApiClient,
    base_url: String,
    value_input_option: String,
}

impl GoogleSheetsGateway {
    pub fn new(api: GoogleApiClient, config: &GoogleConfig) -> Self {
        Self {
            api,
            base_url: config.sheets_base_url.clone(),
            value_input_option: config.value_input_option.clone(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        GoogleApiClient::endpoint(&self.base_url, segments)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.url(&["spreadsheets", spreadsheet_id, "values", range])?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetResource> {
        let mut url = self.url(&["spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "spreadsheetId,spreadsheetUrl,sheets.properties");
        self.api.send(Method::GET, url, None).await
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Value>) -> Result<Value> {
        let url = self.url(&["spreadsheets", &format!("{spreadsheet_id}:batchUpdate")])?;
        let body = json!({ "requests": requests });
        self.api.send(Method::POST, url, Some(&body)).await
    }

    async fn read_values(&self, spreadsheet_id: &str, range: &A1Range, major: &str) -> Result<ValueRange> {
        let url = self.values_url(
            spreadsheet_id,
            &range.to_string(),
            &[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("majorDimension", major),
            ],
        )?;
        self.api.send(Method::GET, url, None).await
    }

    async fn dimension_request(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        request: &str,
        dimension: &str,
        span: IndexSpan,
    ) -> Result<()> {
        let sheet_id = self.get_sheet_id(spreadsheet_id, sheet).await?;
        let mut body = json!({ "range": dimension_range(sheet_id, dimension, span) });
        if request == "insertDimension" {
            body["inheritFromBefore"] = json!(span.start > 0);
        }
        self.batch_update(spreadsheet_id, vec![json!({ request: body })])
            .await?;
        tracing::debug!(sheet, request, dimension, start = span.start, end = span.end, "Sheet dimensions changed");
        Ok(())
    }
}

#[async_trait]
impl SpreadsheetGateway for GoogleSheetsGateway {
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetDescriptor> {
        let url = self.url(&["spreadsheets"])?;
        let body = json!({ "properties": { "title": title } });
        let created: SpreadsheetResource = self.api.send(Method::POST, url, Some(&body)).await?;

        tracing::info!(spreadsheet_id = %created.spreadsheet_id, title, "Spreadsheet created");
        Ok(created.into())
    }

    async fn get_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetDescriptor> {
        Ok(self.metadata(spreadsheet_id).await?.into())
    }

    async fn get_sheet_id(&self, spreadsheet_id: &str, name: &str) -> Result<i64> {
        self.metadata(spreadsheet_id)
            .await?
            .sheets
            .into_iter()
            .find(|s| s.properties.title == name)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| {
                ReportError::NotFound(format!("sheet '{name}' in spreadsheet {spreadsheet_id}"))
            })
    }

    async fn create_sheet(&self, spreadsheet_id: &str, title: &str, rows: usize, cols: usize) -> Result<i64> {
        if rows == 0 || cols == 0 {
            return Err(ReportError::InvalidArgument(format!(
                "sheet '{title}' needs at least one row and one column"
            )));
        }
        let reply = self
            .batch_update(
                spreadsheet_id,
                vec![json!({
                    "addSheet": {
                        "properties": {
                            "title": title,
                            "gridProperties": { "rowCount": rows, "columnCount": cols }
                        }
                    }
                })],
            )
            .await?;

        reply["replies"][0]["addSheet"]["properties"]["sheetId"]
            .as_i64()
            .ok_or_else(|| {
                ReportError::Remote(RemoteError::InvalidResponse(
                    "addSheet reply has no sheetId".to_string(),
                ))
            })
    }

    async fn rename_sheet(&self, spreadsheet_id: &str, from: &str, to: &str) -> Result<()> {
        let sheet_id = self.get_sheet_id(spreadsheet_id, from).await?;
        self.batch_update(
            spreadsheet_id,
            vec![json!({
                "updateSheetProperties": {
                    "properties": { "sheetId": sheet_id, "title": to },
                    "fields": "title"
                }
            })],
        )
        .await?;
        Ok(())
    }

    async fn delete_sheet(&self, spreadsheet_id: &str, name: &str) -> Result<()> {
        let sheet_id = self.get_sheet_id(spreadsheet_id, name).await?;
        self.batch_update(
            spreadsheet_id,
            vec![json!({ "deleteSheet": { "sheetId": sheet_id } })],
        )
        .await?;
        Ok(())
    }

    async fn read_range(
        &self,
        spreadsheet_id: &str,
        a1_range: &str,
        sheet: Option<&str>,
    ) -> Result<Vec<Vec<CellValue>>> {
        let range = A1Range::parse(a1_range)?.on_sheet(sheet);
        let values = self.read_values(spreadsheet_id, &range, "ROWS").await?.values;
        Ok(pad_matrix(values, range.width(), range.height()))
    }

    async fn read_entire_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<Vec<Vec<CellValue>>> {
        let url = self.values_url(
            spreadsheet_id,
            &quote_sheet_name(sheet),
            &[("valueRenderOption", "UNFORMATTED_VALUE")],
        )?;
        let values: ValueRange = self.api.send(Method::GET, url, None).await?;
        Ok(pad_matrix(values.values, None, None))
    }

    async fn read_row(&self, spreadsheet_id: &str, row: usize, sheet: Option<&str>) -> Result<Vec<CellValue>> {
        let range = A1Range::row(row)?.on_sheet(sheet);
        let values = self.read_values(spreadsheet_id, &range, "ROWS").await?.values;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    async fn read_column(
        &self,
        spreadsheet_id: &str,
        column: &str,
        sheet: Option<&str>,
    ) -> Result<Vec<CellValue>> {
        let range = A1Range::column(column)?.on_sheet(sheet);
        let values = self.read_values(spreadsheet_id, &range, "COLUMNS").await?.values;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        a1_range: &str,
        values: &[Vec<CellValue>],
        sheet: Option<&str>,
    ) -> Result<()> {
        let range = A1Range::parse(a1_range)?.on_sheet(sheet);
        range.check_fits(values)?;

        let url = self.values_url(
            spreadsheet_id,
            &range.to_string(),
            &[("valueInputOption", self.value_input_option.as_str())],
        )?;
        let body = json!({ "majorDimension": "ROWS", "values": values });
        let _: Value = self.api.send(Method::PUT, url, Some(&body)).await?;

        tracing::debug!(range = %range, rows = values.len(), "Values written");
        Ok(())
    }

    async fn write_cell(
        &self,
        spreadsheet_id: &str,
        a1_cell: &str,
        value: CellValue,
        sheet: Option<&str>,
    ) -> Result<()> {
        if !A1Range::parse(a1_cell)?.is_single_cell() {
            return Err(ReportError::InvalidArgument(format!(
                "'{a1_cell}' is not a single cell"
            )));
        }
        self.write_range(spreadsheet_id, a1_cell, &[vec![value]], sheet)
            .await
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        values: &[Vec<CellValue>],
        sheet: Option<&str>,
    ) -> Result<()> {
        let anchor = A1Range::cell(1, 1)?.on_sheet(sheet);
        anchor.check_fits(values)?;

        let url = self.values_url(
            spreadsheet_id,
            &format!("{anchor}:append"),
            &[
                ("valueInputOption", self.value_input_option.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ],
        )?;
        let body = json!({ "majorDimension": "ROWS", "values": values });
        let _: Value = self.api.send(Method::POST, url, Some(&body)).await?;

        tracing::debug!(rows = values.len(), "Rows appended");
        Ok(())
    }

    async fn insert_rows(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.dimension_request(spreadsheet_id, sheet, "insertDimension", "ROWS", span)
            .await
    }

    async fn insert_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.dimension_request(spreadsheet_id, sheet, "insertDimension", "COLUMNS", span)
            .await
    }

    async fn delete_rows(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.dimension_request(spreadsheet_id, sheet, "deleteDimension", "ROWS", span)
            .await
    }

    async fn delete_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        self.dimension_request(spreadsheet_id, sheet, "deleteDimension", "COLUMNS", span)
            .await
    }

    async fn clear_range(&self, spreadsheet_id: &str, a1_range: &str, sheet: Option<&str>) -> Result<()> {
        let range = A1Range::parse(a1_range)?.on_sheet(sheet);
        let url = self.values_url(spreadsheet_id, &format!("{range}:clear"), &[])?;
        let _: Value = self.api.send(Method::POST, url, Some(&json!({}))).await?;
        Ok(())
    }

    async fn clear_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<()> {
        let url = self.values_url(
            spreadsheet_id,
            &format!("{}:clear", quote_sheet_name(sheet)),
            &[],
        )?;
        let _: Value = self.api.send(Method::POST, url, Some(&json!({}))).await?;
        Ok(())
    }

    async fn merge_cells(&self, spreadsheet_id: &str, sheet: &str, range: GridRange) -> Result<()> {
        let sheet_id = self.get_sheet_id(spreadsheet_id, sheet).await?;
        self.batch_update(
            spreadsheet_id,
            vec![json!({
                "mergeCells": { "range": grid_range(sheet_id, range), "mergeType": "MERGE_ALL" }
            })],
        )
        .await?;
        Ok(())
    }

    async fn format_range_header_colored(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: GridRange,
        background: Rgb,
        text: Rgb,
    ) -> Result<()> {
        background.validate()?;
        text.validate()?;
        let sheet_id = self.get_sheet_id(spreadsheet_id, sheet).await?;
        self.batch_update(
            spreadsheet_id,
            vec![json!({
                "repeatCell": {
                    "range": grid_range(sheet_id, range),
                    "cell": {
                        "userEnteredFormat": {
                            "backgroundColor": background,
                            "horizontalAlignment": "CENTER",
                            "textFormat": {
                                "bold": true,
                                "fontSize": 11,
                                "foregroundColor": text
                            }
                        }
                    },
                    "fields": "userEnteredFormat(backgroundColor,horizontalAlignment,textFormat)"
                }
            })],
        )
        .await?;
        Ok(())
    }

    async fn format_ranges_background(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        ranges: &[(GridRange, Rgb)],
    ) -> Result<()> {
        if ranges.is_empty() {
            return Ok(());
        }
        for (_, color) in ranges {
            color.validate()?;
        }
        let sheet_id = self.get_sheet_id(spreadsheet_id, sheet).await?;
        let requests = ranges
            .iter()
            .map(|(range, color)| {
                json!({
                    "repeatCell": {
                        "range": grid_range(sheet_id, *range),
                        "cell": { "userEnteredFormat": { "backgroundColor": color } },
                        "fields": "userEnteredFormat.backgroundColor"
                    }
                })
            })
            .collect();
        self.batch_update(spreadsheet_id, requests).await?;
        Ok(())
    }

    async fn auto_resize_columns(&self, spreadsheet_id: &str, sheet: &str, span: IndexSpan) -> Result<()> {
        let sheet_id = self.get_sheet_id(spreadsheet_id, sheet).await?;
        self.batch_update(
            spreadsheet_id,
            vec![json!({
                "autoResizeDimensions": {
                    "dimensions": dimension_range(sheet_id, "COLUMNS", span)
                }
            })],
        )
        .await?;
        Ok(())
    }
}
