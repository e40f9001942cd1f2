use serde::Deserialize;

use crate::models::report::DateRange;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

/// `filters` is checked against the entity's filter set once the entity is
/// known from the path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub filters: serde_json::Value,
    #[serde(default)]
    pub format: ReportFormat,
}
