//! Follow-up operations.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{
    CreateFollowUpInput, FollowUpFilter, FollowUpType, UpdateFollowUpInput,
};
use crate::ops::{self, OpError};
use crate::store::Store;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFollowUpRequest {
    #[schemars(description = "UUID of the lead to follow up with (required)")]
    pub lead_id: Option<String>,
    #[schemars(description = "Kind of action: email, call, meeting or task (required)")]
    #[serde(rename = "type")]
    pub follow_up_type: Option<String>,
    #[schemars(description = "RFC3339 time the follow-up is due (required)")]
    pub scheduled_at: Option<String>,
    #[schemars(description = "What to do (required)")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFollowUpRequest {
    #[schemars(description = "UUID of the follow-up to update")]
    pub follow_up_id: Option<String>,
    #[schemars(description = "New kind: email, call, meeting or task")]
    #[serde(rename = "type")]
    pub follow_up_type: Option<String>,
    #[schemars(description = "New RFC3339 due time")]
    pub scheduled_at: Option<String>,
    #[schemars(description = "New description")]
    pub description: Option<String>,
    #[schemars(description = "Completion flag; completing stamps completedAt, reopening clears it")]
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFollowUpRequest {
    #[schemars(description = "UUID of the follow-up to delete")]
    pub follow_up_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteFollowUpRequest {
    #[schemars(description = "UUID of the follow-up to mark complete")]
    pub follow_up_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetFollowUpsRequest {
    #[schemars(description = "Only follow-ups for this lead")]
    pub lead_id: Option<String>,
    #[schemars(description = "Only complete (true) or incomplete (false) follow-ups")]
    pub completed: Option<bool>,
    #[schemars(description = "Only follow-ups due at or after this RFC3339 time")]
    pub from_date: Option<String>,
    #[schemars(description = "Page size, default 50")]
    pub limit: Option<u64>,
    #[schemars(description = "1-indexed page number, default 1")]
    pub page: Option<u64>,
}

pub fn create_follow_up(store: &dyn Store, req: CreateFollowUpRequest) -> Result<Value, OpError> {
    let lead_id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let kind = ops::require(req.follow_up_type, "type")?;
    let follow_up_type = FollowUpType::from_str(&kind)
        .ok_or_else(|| OpError::InvalidArgument(format!("Invalid type: {kind}")))?;
    let scheduled_at = ops::require_date(req.scheduled_at, "scheduledAt")?;
    let description = ops::require(req.description, "description")?;

    let follow_up = store.create_follow_up(CreateFollowUpInput {
        lead_id,
        follow_up_type,
        scheduled_at,
        description,
    })?;

    Ok(json!({ "followUp": follow_up }))
}

pub fn update_follow_up(store: &dyn Store, req: UpdateFollowUpRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.follow_up_id, "followUpId", "Follow-up")?;
    let follow_up_type = req
        .follow_up_type
        .as_deref()
        .map(|t| {
            FollowUpType::from_str(t)
                .ok_or_else(|| OpError::InvalidArgument(format!("Invalid type: {t}")))
        })
        .transpose()?;

    let patch = UpdateFollowUpInput {
        follow_up_type,
        scheduled_at: ops::optional_date(req.scheduled_at.as_deref(), "scheduledAt")?,
        description: req.description,
        completed: req.completed,
    };
    let follow_up = store
        .update_follow_up(id, patch)?
        .ok_or(OpError::NotFound("Follow-up"))?;
    Ok(json!({ "followUp": follow_up }))
}

pub fn delete_follow_up(store: &dyn Store, req: DeleteFollowUpRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.follow_up_id, "followUpId", "Follow-up")?;
    if !store.delete_follow_up(id)? {
        return Err(OpError::NotFound("Follow-up"));
    }
    Ok(json!({ "message": "Follow-up deleted" }))
}

/// Shorthand for `update_follow_up {completed: true}`.
pub fn complete_follow_up(store: &dyn Store, req: CompleteFollowUpRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.follow_up_id, "followUpId", "Follow-up")?;
    let patch = UpdateFollowUpInput {
        completed: Some(true),
        ..Default::default()
    };
    let follow_up = store
        .update_follow_up(id, patch)?
        .ok_or(OpError::NotFound("Follow-up"))?;
    Ok(json!({ "followUp": follow_up }))
}

pub fn get_follow_ups(store: &dyn Store, req: GetFollowUpsRequest) -> Result<Value, OpError> {
    let filter = FollowUpFilter {
        lead_id: ops::filter_id(req.lead_id.as_deref()),
        completed: req.completed,
        from_date: ops::optional_date(req.from_date.as_deref(), "fromDate")?,
    };
    let follow_ups = store.list_follow_ups(&filter)?;
    let (follow_ups, total) = ops::paginate(follow_ups, req.limit, req.page);
    let count = follow_ups.len();
    Ok(json!({ "followUps": follow_ups, "count": count, "total": total }))
}
