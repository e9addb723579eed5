//! Lead operations.

use chrono::{SecondsFormat, Utc};
use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{CreateLeadInput, LeadFilter, LeadStatus, Priority, UpdateLeadInput};
use crate::ops::{self, OpError};
use crate::store::Store;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    #[schemars(description = "Full name of the lead (required)")]
    pub name: Option<String>,
    #[schemars(description = "Email address (required)")]
    pub email: Option<String>,
    #[schemars(description = "Phone number")]
    pub phone: Option<String>,
    #[schemars(description = "Company the lead works for (required)")]
    pub company: Option<String>,
    #[schemars(description = "Job title")]
    pub title: Option<String>,
    #[schemars(
        description = "Pipeline status: new, contacted, qualified, proposal, negotiation, closed_won or closed_lost. Defaults to new"
    )]
    pub status: Option<String>,
    #[schemars(description = "Where the lead came from, e.g. 'Referral' or 'Webinar' (required)")]
    pub source: Option<String>,
    #[schemars(description = "Estimated deal value in your currency, non-negative")]
    pub estimated_value: Option<f64>,
    #[schemars(description = "Priority: low, medium or high. Defaults to medium")]
    pub priority: Option<String>,
    #[schemars(description = "Free-form tags for search and segmentation")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetLeadRequest {
    #[schemars(description = "UUID of the lead")]
    pub lead_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsRequest {
    #[schemars(description = "Only leads with this pipeline status")]
    pub status: Option<String>,
    #[schemars(description = "Only leads with this priority")]
    pub priority: Option<String>,
    #[schemars(description = "Only leads from this source (exact match)")]
    pub source: Option<String>,
    #[schemars(description = "Page size, default 50")]
    pub limit: Option<u64>,
    #[schemars(description = "1-indexed page number, default 1")]
    pub page: Option<u64>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[schemars(description = "UUID of the lead to update")]
    pub lead_id: Option<String>,
    #[schemars(description = "New name")]
    pub name: Option<String>,
    #[schemars(description = "New email address")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "New phone number; pass null to clear")]
    pub phone: Option<Option<String>>,
    #[schemars(description = "New company")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "New job title; pass null to clear")]
    pub title: Option<Option<String>>,
    #[schemars(description = "New pipeline status")]
    pub status: Option<String>,
    #[schemars(description = "New source")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "New estimated value; pass null to clear")]
    pub estimated_value: Option<Option<f64>>,
    #[schemars(description = "New priority")]
    pub priority: Option<String>,
    #[schemars(description = "Replacement tag list")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLeadNoteRequest {
    #[schemars(description = "UUID of the lead")]
    pub lead_id: Option<String>,
    #[schemars(description = "Note text; stored with a timestamp prefix")]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchLeadsRequest {
    #[schemars(
        description = "Case-insensitive text matched against name, company and email, or a whole tag"
    )]
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLeadRequest {
    #[schemars(description = "UUID of the lead to delete")]
    pub lead_id: Option<String>,
}

pub fn create_lead(store: &dyn Store, req: CreateLeadRequest) -> Result<Value, OpError> {
    let name = ops::require(req.name, "name")?;
    let email = ops::require(req.email, "email")?;
    let company = ops::require(req.company, "company")?;
    let source = ops::require(req.source, "source")?;
    let status = parse_status(req.status.as_deref())?.unwrap_or(LeadStatus::New);
    let priority = parse_priority(req.priority.as_deref())?.unwrap_or(Priority::Medium);
    check_estimated_value(req.estimated_value)?;

    let lead = store.create_lead(CreateLeadInput {
        name,
        email,
        phone: req.phone,
        company,
        title: req.title,
        status,
        source,
        estimated_value: req.estimated_value,
        priority,
        tags: req.tags.unwrap_or_default(),
    })?;

    Ok(json!({ "lead": lead }))
}

pub fn get_lead(store: &dyn Store, req: GetLeadRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let lead = store.get_lead(id)?.ok_or(OpError::NotFound("Lead"))?;
    Ok(json!({ "lead": lead }))
}

pub fn list_leads(store: &dyn Store, req: ListLeadsRequest) -> Result<Value, OpError> {
    let filter = LeadFilter {
        status: parse_status(req.status.as_deref())?,
        priority: parse_priority(req.priority.as_deref())?,
        source: req.source,
    };
    let leads = store.list_leads(&filter)?;
    let (leads, total) = ops::paginate(leads, req.limit, req.page);
    let count = leads.len();
    Ok(json!({ "leads": leads, "count": count, "total": total }))
}

pub fn update_lead(store: &dyn Store, req: UpdateLeadRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let status = parse_status(req.status.as_deref())?;
    let priority = parse_priority(req.priority.as_deref())?;
    if let Some(value) = req.estimated_value.flatten() {
        check_estimated_value(Some(value))?;
    }

    let patch = UpdateLeadInput {
        name: req.name,
        email: req.email,
        phone: req.phone,
        company: req.company,
        title: req.title,
        status,
        source: req.source,
        estimated_value: req.estimated_value,
        priority,
        tags: req.tags,
        last_contacted_at: None,
    };
    let lead = store.update_lead(id, patch)?.ok_or(OpError::NotFound("Lead"))?;
    Ok(json!({ "lead": lead }))
}

pub fn add_lead_note(store: &dyn Store, req: AddLeadNoteRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let note = ops::require(req.note, "note")?;
    let entry = format!(
        "[{}] {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        note
    );
    let lead = store
        .add_lead_note(id, entry)?
        .ok_or(OpError::NotFound("Lead"))?;
    Ok(json!({ "lead": lead }))
}

pub fn search_leads(store: &dyn Store, req: SearchLeadsRequest) -> Result<Value, OpError> {
    let query = ops::require(req.query, "query")?;
    let leads = store.search_leads(&query)?;
    let count = leads.len();
    Ok(json!({ "leads": leads, "count": count }))
}

pub fn delete_lead(store: &dyn Store, req: DeleteLeadRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    if !store.delete_lead(id)? {
        return Err(OpError::NotFound("Lead"));
    }
    Ok(json!({ "message": "Lead deleted" }))
}

fn parse_status(value: Option<&str>) -> Result<Option<LeadStatus>, OpError> {
    value
        .map(|s| {
            LeadStatus::from_str(s)
                .ok_or_else(|| OpError::InvalidArgument(format!("Invalid status: {s}")))
        })
        .transpose()
}

fn parse_priority(value: Option<&str>) -> Result<Option<Priority>, OpError> {
    value
        .map(|p| {
            Priority::from_str(p)
                .ok_or_else(|| OpError::InvalidArgument(format!("Invalid priority: {p}")))
        })
        .transpose()
}

fn check_estimated_value(value: Option<f64>) -> Result<(), OpError> {
    if let Some(v) = value {
        if v < 0.0 {
            return Err(OpError::InvalidArgument(format!(
                "estimatedValue must be non-negative, got {v}"
            )));
        }
    }
    Ok(())
}
