//! Reporting operations. Thin wrappers over [`crate::reports`].

use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ops::{self, OpError};
use crate::reports;
use crate::store::Store;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportRequest {
    #[schemars(description = "RFC3339 window start. Defaults to 30 days ago")]
    pub from_date: Option<String>,
    #[schemars(description = "RFC3339 window end. Defaults to now")]
    pub to_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadActivityRequest {
    #[schemars(description = "UUID of the lead")]
    pub lead_id: Option<String>,
}

pub fn get_pipeline(store: &dyn Store) -> Result<Value, OpError> {
    let pipeline = reports::pipeline(store)?;
    Ok(json!(pipeline))
}

pub fn get_sales_report(store: &dyn Store, req: SalesReportRequest) -> Result<Value, OpError> {
    let from = ops::optional_date(req.from_date.as_deref(), "fromDate")?;
    let to = ops::optional_date(req.to_date.as_deref(), "toDate")?;
    let report = reports::sales_report(store, from, to)?;
    Ok(json!({ "report": report }))
}

pub fn get_lead_activity(store: &dyn Store, req: LeadActivityRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let activity = reports::lead_activity(store, id)?.ok_or(OpError::NotFound("Lead"))?;
    Ok(json!({ "activity": activity }))
}

pub fn get_dashboard(store: &dyn Store) -> Result<Value, OpError> {
    let dashboard = reports::dashboard(store)?;
    Ok(json!({ "dashboard": dashboard }))
}
