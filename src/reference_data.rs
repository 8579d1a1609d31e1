//! D&B Direct+ reference data listings (`/v1/referenceData/...`).

use serde::Deserialize;
use serde_json::Value;

use crate::cell::{render_row, Cell};
use crate::errors::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDataResponse {
    #[serde(default)]
    pub code_tables: Vec<CodeTable>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTable {
    #[serde(rename = "categoryID")]
    pub category_id: Option<Value>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub code_lists: Vec<CodeListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeListEntry {
    pub code: Option<Value>,
    pub description: Option<String>,
}

impl ReferenceDataResponse {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json)
            .map_err(|e| AppError::ParseError(format!("reference data: {}", e)))
    }
}

// Codes come back as numbers for some categories and strings for others
fn code_cell(value: Option<&Value>) -> Cell {
    match value {
        Some(Value::String(s)) => Cell::from(s.as_str()),
        Some(Value::Number(n)) => Cell::from(n.to_string()),
        _ => Cell::Null,
    }
}

/// `categoryID|categoryName` per available category.
pub fn category_lines(resp: &ReferenceDataResponse) -> Vec<String> {
    resp.code_tables
        .iter()
        .map(|table| {
            render_row(&[
                code_cell(table.category_id.as_ref()),
                Cell::from(table.category_name.as_deref()),
            ])
        })
        .collect()
}

/// `code|description` per entry of the requested category.
pub fn code_lines(resp: &ReferenceDataResponse) -> Vec<String> {
    resp.code_tables
        .first()
        .map(|table| {
            table
                .code_lists
                .iter()
                .map(|entry| {
                    render_row(&[
                        code_cell(entry.code.as_ref()),
                        Cell::from(entry.description.as_deref()),
                    ])
                })
                .collect()
        })
        .unwrap_or_default()
}
