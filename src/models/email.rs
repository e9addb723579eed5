use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A record of an email sent to a lead.
///
/// Logs are immutable once written. `opened_at` and `clicked_at` are
/// reserved for engagement tracking and are never populated today.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub template_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
    pub clicked_at: Option<DateTime<Utc>>,
    pub status: EmailStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Draft,
    Sent,
    Delivered,
    Failed,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateEmailLogInput {
    pub lead_id: Uuid,
    pub template_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub status: EmailStatus,
}

#[derive(Debug, Clone, Default)]
pub struct EmailLogFilter {
    pub lead_id: Option<Uuid>,
}
