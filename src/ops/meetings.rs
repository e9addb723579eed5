//! Meeting operations.

use chrono::Utc;
use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{
    CreateFollowUpInput, CreateMeetingInput, FollowUpType, MeetingFilter, MeetingStatus,
    UpdateMeetingInput,
};
use crate::ops::{self, OpError};
use crate::store::Store;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingRequest {
    #[schemars(description = "UUID of the lead the meeting is with (required)")]
    pub lead_id: Option<String>,
    #[schemars(description = "Meeting title (required)")]
    pub title: Option<String>,
    #[schemars(description = "Agenda or context for the meeting")]
    pub description: Option<String>,
    #[schemars(description = "RFC3339 start time (required)")]
    pub scheduled_at: Option<String>,
    #[schemars(description = "Length in minutes. Defaults to 30")]
    pub duration: Option<i64>,
    #[schemars(description = "Physical location")]
    pub location: Option<String>,
    #[schemars(description = "Video call link")]
    pub meeting_link: Option<String>,
    #[schemars(
        description = "When true, also creates a task follow-up to prepare for the meeting"
    )]
    pub create_follow_up: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingRequest {
    #[schemars(description = "UUID of the meeting to update")]
    pub meeting_id: Option<String>,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "New description; pass null to clear")]
    pub description: Option<Option<String>>,
    #[schemars(description = "New RFC3339 start time")]
    pub scheduled_at: Option<String>,
    #[schemars(description = "New length in minutes")]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "New location; pass null to clear")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "New video call link; pass null to clear")]
    pub meeting_link: Option<Option<String>>,
    #[schemars(description = "New status: scheduled, completed, cancelled or no_show")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::ops::double_option")]
    #[schemars(description = "Result of the meeting; pass null to clear")]
    pub outcome: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMeetingRequest {
    #[schemars(description = "UUID of the meeting to delete")]
    pub meeting_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMeetingsRequest {
    #[schemars(description = "Only meetings with this lead")]
    pub lead_id: Option<String>,
    #[schemars(description = "Only meetings with this status")]
    pub status: Option<String>,
    #[schemars(description = "Only meetings scheduled at or after this RFC3339 time")]
    pub from_date: Option<String>,
    #[schemars(description = "Only meetings scheduled at or before this RFC3339 time")]
    pub to_date: Option<String>,
    #[schemars(description = "Page size, default 50")]
    pub limit: Option<u64>,
    #[schemars(description = "1-indexed page number, default 1")]
    pub page: Option<u64>,
}

/// Creates a meeting, always bumps the lead's lastContactedAt, and
/// optionally spawns a linked preparation follow-up.
pub fn schedule_meeting(store: &dyn Store, req: ScheduleMeetingRequest) -> Result<Value, OpError> {
    let lead_id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let title = ops::require(req.title, "title")?;
    let scheduled_at = ops::require_date(req.scheduled_at, "scheduledAt")?;

    let meeting = store.create_meeting(CreateMeetingInput {
        lead_id,
        title,
        description: req.description,
        scheduled_at,
        duration: req.duration.unwrap_or(30),
        location: req.location,
        meeting_link: req.meeting_link,
    })?;
    store.touch_lead(lead_id, Utc::now())?;

    let follow_up = if req.create_follow_up.unwrap_or(false) {
        Some(store.create_follow_up(CreateFollowUpInput {
            lead_id,
            follow_up_type: FollowUpType::Task,
            scheduled_at: meeting.scheduled_at,
            description: format!("Prepare for meeting: {}", meeting.title),
        })?)
    } else {
        None
    };

    let mut payload = json!({ "meeting": meeting });
    if let Some(follow_up) = follow_up {
        payload["followUp"] = json!(follow_up);
    }
    Ok(payload)
}

pub fn update_meeting(store: &dyn Store, req: UpdateMeetingRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.meeting_id, "meetingId", "Meeting")?;
    let patch = UpdateMeetingInput {
        title: req.title,
        description: req.description,
        scheduled_at: ops::optional_date(req.scheduled_at.as_deref(), "scheduledAt")?,
        duration: req.duration,
        location: req.location,
        meeting_link: req.meeting_link,
        status: parse_status(req.status.as_deref())?,
        outcome: req.outcome,
    };
    let meeting = store
        .update_meeting(id, patch)?
        .ok_or(OpError::NotFound("Meeting"))?;
    Ok(json!({ "meeting": meeting }))
}

pub fn delete_meeting(store: &dyn Store, req: DeleteMeetingRequest) -> Result<Value, OpError> {
    let id = ops::require_id(req.meeting_id, "meetingId", "Meeting")?;
    if !store.delete_meeting(id)? {
        return Err(OpError::NotFound("Meeting"));
    }
    Ok(json!({ "message": "Meeting deleted" }))
}

pub fn list_meetings(store: &dyn Store, req: ListMeetingsRequest) -> Result<Value, OpError> {
    let filter = MeetingFilter {
        lead_id: ops::filter_id(req.lead_id.as_deref()),
        status: parse_status(req.status.as_deref())?,
        from_date: ops::optional_date(req.from_date.as_deref(), "fromDate")?,
        to_date: ops::optional_date(req.to_date.as_deref(), "toDate")?,
    };
    let meetings = store.list_meetings(&filter)?;
    let (meetings, total) = ops::paginate(meetings, req.limit, req.page);
    let count = meetings.len();
    Ok(json!({ "meetings": meetings, "count": count, "total": total }))
}

fn parse_status(value: Option<&str>) -> Result<Option<MeetingStatus>, OpError> {
    value
        .map(|s| {
            MeetingStatus::from_str(s)
                .ok_or_else(|| OpError::InvalidArgument(format!("Invalid status: {s}")))
        })
        .transpose()
}
