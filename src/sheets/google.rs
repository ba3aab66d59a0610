//! Google Sheets v4 REST implementation

use super::{
    BooleanCondition, CellRef, CellStyle, CellValue, ConditionalRule, GridSize, HorizontalAlign,
    RangeRef, SheetClient, SheetError, SheetRef, VerticalAlign,
};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com";

/// Connection settings for one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// File holding a bearer token; re-read on every request so an external
    /// refresher can rotate it
    pub token_file: PathBuf,
    pub api_base: String,
    pub timeout: Duration,
}

pub struct GoogleSheetsClient {
    client: Client,
    config: SheetsConfig,
}

impl GoogleSheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SheetError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn access_token(&self) -> Result<String, SheetError> {
        let raw = tokio::fs::read_to_string(&self.config.token_file)
            .await
            .map_err(|e| {
                SheetError::auth(format!(
                    "Cannot read token file {}: {e}",
                    self.config.token_file.display()
                ))
            })?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(SheetError::auth("Token file is empty"));
        }
        Ok(token.to_string())
    }

    /// `{base}/v4/spreadsheets/{id}` followed by extra path segments
    fn url(&self, segments: &[&str]) -> Result<Url, SheetError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| SheetError::malformed(format!("Invalid Sheets API base: {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SheetError::malformed("Sheets API base cannot hold a path"))?;
            path.pop_if_empty().push("v4").push("spreadsheets");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Response, SheetError> {
        let token = self.access_token().await?;
        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(SheetError::from_status(status.as_u16(), &text))
        }
    }

    async fn batch_update(&self, requests: Vec<Value>) -> Result<BatchUpdateResponse, SheetError> {
        let target = format!("{}:batchUpdate", self.config.spreadsheet_id);
        let url = self.url(&[target.as_str()])?;
        let body = json!({ "requests": requests });
        let response = self.send(Method::POST, url, Some(&body)).await?;
        Ok(response.json().await?)
    }

    fn values_url(&self, sheet: &SheetRef, range: RangeRef) -> Result<Url, SheetError> {
        let range = qualified_range(sheet, range);
        self.url(&[self.config.spreadsheet_id.as_str(), "values", range.as_str()])
    }
}

/// `'Title'!A1:B2`, with embedded quotes doubled
fn qualified_range(sheet: &SheetRef, range: RangeRef) -> String {
    format!("'{}'!{range}", sheet.title.replace('\'', "''"))
}

fn grid_range(sheet: &SheetRef, range: RangeRef) -> Value {
    json!({
        "sheetId": sheet.id,
        "startRowIndex": range.start.row - 1,
        "endRowIndex": range.end.row,
        "startColumnIndex": range.start.column,
        "endColumnIndex": range.end.column + 1,
    })
}

fn cell_json(value: &CellValue) -> Value {
    match value {
        CellValue::Text(text) | CellValue::Formula(text) => Value::String(text.clone()),
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map_or_else(|| Value::String(n.to_string()), Value::Number),
    }
}

fn repeat_cell_request(sheet: &SheetRef, range: RangeRef, style: &CellStyle) -> Value {
    let mut format = serde_json::Map::new();
    let mut fields = Vec::new();
    if style.bold {
        format.insert("textFormat".into(), json!({ "bold": true }));
        fields.push("userEnteredFormat.textFormat.bold");
    }
    if let Some(h) = style.horizontal {
        let name = match h {
            HorizontalAlign::Left => "LEFT",
            HorizontalAlign::Center => "CENTER",
            HorizontalAlign::Right => "RIGHT",
        };
        format.insert("horizontalAlignment".into(), json!(name));
        fields.push("userEnteredFormat.horizontalAlignment");
    }
    if let Some(v) = style.vertical {
        let name = match v {
            VerticalAlign::Top => "TOP",
            VerticalAlign::Middle => "MIDDLE",
            VerticalAlign::Bottom => "BOTTOM",
        };
        format.insert("verticalAlignment".into(), json!(name));
        fields.push("userEnteredFormat.verticalAlignment");
    }
    json!({
        "repeatCell": {
            "range": grid_range(sheet, range),
            "cell": { "userEnteredFormat": Value::Object(format) },
            "fields": fields.join(","),
        }
    })
}

fn conditional_rule_request(sheet: &SheetRef, rule: &ConditionalRule) -> Value {
    let (kind, operand) = match &rule.condition {
        BooleanCondition::NumberGreater(v) => ("NUMBER_GREATER", v),
        BooleanCondition::NumberLess(v) => ("NUMBER_LESS", v),
    };
    json!({
        "addConditionalFormatRule": {
            "rule": {
                "ranges": [grid_range(sheet, rule.range)],
                "booleanRule": {
                    "condition": {
                        "type": kind,
                        "values": [{ "userEnteredValue": operand }],
                    },
                    "format": {
                        "backgroundColor": {
                            "red": rule.background.red,
                            "green": rule.background.green,
                            "blue": rule.background.blue,
                        }
                    }
                }
            },
            "index": 0,
        }
    })
}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddSheetReply {
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchReply {
    add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchReply>,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ValueRangeResponse {
    fn first_cell(self) -> String {
        match self.values.into_iter().next().and_then(|row| row.into_iter().next()) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

#[async_trait]
impl SheetClient for GoogleSheetsClient {
    async fn list_sheets(&self) -> Result<Vec<SheetRef>, SheetError> {
        let mut url = self.url(&[self.config.spreadsheet_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let response = self.send(Method::GET, url, None).await?;
        let body: SpreadsheetResponse = response.json().await?;
        Ok(body
            .sheets
            .into_iter()
            .map(|s| SheetRef {
                id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .collect())
    }

    async fn create_sheet(&self, title: &str, grid: GridSize) -> Result<SheetRef, SheetError> {
        let request = json!({
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": {
                        "rowCount": grid.rows,
                        "columnCount": grid.columns,
                    }
                }
            }
        });
        let response = self.batch_update(vec![request]).await?;
        let props = response
            .replies
            .into_iter()
            .find_map(|r| r.add_sheet)
            .ok_or_else(|| SheetError::malformed("addSheet reply missing"))?
            .properties;
        Ok(SheetRef {
            id: props.sheet_id,
            title: props.title,
        })
    }

    async fn read_cell(&self, sheet: &SheetRef, cell: CellRef) -> Result<String, SheetError> {
        let url = self.values_url(sheet, RangeRef::cell(cell))?;
        let response = self.send(Method::GET, url, None).await?;
        let body: ValueRangeResponse = response.json().await?;
        Ok(body.first_cell())
    }

    async fn write_range(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), SheetError> {
        let mut url = self.values_url(sheet, range)?;
        // Formulas must be parsed by the backend; everything else stays literal
        let input = if rows.iter().flatten().any(CellValue::is_formula) {
            "USER_ENTERED"
        } else {
            "RAW"
        };
        url.query_pairs_mut().append_pair("valueInputOption", input);
        let values: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| row.iter().map(cell_json).collect())
            .collect();
        let body = json!({
            "range": qualified_range(sheet, range),
            "majorDimension": "ROWS",
            "values": values,
        });
        self.send(Method::PUT, url, Some(&body)).await?;
        Ok(())
    }

    async fn set_formatting(
        &self,
        sheet: &SheetRef,
        range: RangeRef,
        style: &CellStyle,
    ) -> Result<(), SheetError> {
        self.batch_update(vec![repeat_cell_request(sheet, range, style)])
            .await?;
        Ok(())
    }

    async fn set_conditional_format(
        &self,
        sheet: &SheetRef,
        rule: &ConditionalRule,
    ) -> Result<(), SheetError> {
        self.batch_update(vec![conditional_rule_request(sheet, rule)])
            .await?;
        Ok(())
    }

    async fn merge_cells(&self, sheet: &SheetRef, range: RangeRef) -> Result<(), SheetError> {
        let request = json!({
            "mergeCells": {
                "range": grid_range(sheet, range),
                "mergeType": "MERGE_ALL",
            }
        });
        self.batch_update(vec![request]).await?;
        Ok(())
    }

    async fn set_right_to_left(&self, sheet: &SheetRef) -> Result<(), SheetError> {
        let request = json!({
            "updateSheetProperties": {
                "properties": { "sheetId": sheet.id, "rightToLeft": true },
                "fields": "rightToLeft",
            }
        });
        self.batch_update(vec![request]).await?;
        Ok(())
    }
}
