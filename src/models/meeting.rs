use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled meeting with a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    /// Duration in minutes.
    pub duration: i64,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub status: MeetingStatus,
    /// Free-text result, typically filled in when the meeting completes.
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "no_show" => Some(Self::NoShow),
            _ => None,
        }
    }
}

/// Input for scheduling a meeting. New meetings always start out
/// `scheduled`; status changes go through the update path.
#[derive(Debug, Clone)]
pub struct CreateMeetingInput {
    pub lead_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration: i64,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
}

/// Patch for updating a meeting. Double-`Option` fields distinguish
/// absent (keep) from present-but-null (clear).
#[derive(Debug, Clone, Default)]
pub struct UpdateMeetingInput {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    pub location: Option<Option<String>>,
    pub meeting_link: Option<Option<String>>,
    pub status: Option<MeetingStatus>,
    pub outcome: Option<Option<String>>,
}

/// Conjunctive filters for listing meetings. Date bounds are inclusive and
/// apply to `scheduled_at`.
#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub lead_id: Option<Uuid>,
    pub status: Option<MeetingStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}
