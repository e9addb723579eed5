use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reminder to do something for a lead at a scheduled time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[serde(rename = "type")]
    pub follow_up_type: FollowUpType,
    pub scheduled_at: DateTime<Utc>,
    pub description: String,
    pub completed: bool,
    /// Set when `completed` flips to true, cleared if it flips back.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpType {
    Email,
    Call,
    Meeting,
    Task,
}

impl FollowUpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Call => "call",
            Self::Meeting => "meeting",
            Self::Task => "task",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "call" => Some(Self::Call),
            "meeting" => Some(Self::Meeting),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// Input for creating a follow-up. New follow-ups always start incomplete.
#[derive(Debug, Clone)]
pub struct CreateFollowUpInput {
    pub lead_id: Uuid,
    pub follow_up_type: FollowUpType,
    pub scheduled_at: DateTime<Utc>,
    pub description: String,
}

/// Patch for updating a follow-up. Flipping `completed` also maintains
/// `completed_at` (set on completion, cleared on reopen).
#[derive(Debug, Clone, Default)]
pub struct UpdateFollowUpInput {
    pub follow_up_type: Option<FollowUpType>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Conjunctive filters for listing follow-ups. `from_date` is an inclusive
/// lower bound on `scheduled_at`.
#[derive(Debug, Clone, Default)]
pub struct FollowUpFilter {
    pub lead_id: Option<Uuid>,
    pub completed: Option<bool>,
    pub from_date: Option<DateTime<Utc>>,
}
