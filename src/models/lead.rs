use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A prospective customer tracked through the sales pipeline.
///
/// Leads are the aggregate root: email logs, meetings and follow-ups all
/// reference a lead by id, but nothing enforces referential integrity.
/// Deleting a lead leaves its dependents orphaned as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub title: Option<String>,
    pub status: LeadStatus,
    /// Where the lead came from (free text, e.g. "Referral", "Webinar").
    pub source: String,
    /// Append-only. Each entry is prefixed with an RFC3339 timestamp bracket.
    #[serde(default)]
    pub notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation, including the side-effect bumps from
    /// logging an email or scheduling a meeting.
    pub updated_at: DateTime<Utc>,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub estimated_value: Option<f64>,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Pipeline stage of a lead.
///
/// Stages form a nominal progression from new through closed, but no
/// transition order is enforced; any status may be set directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl LeadStatus {
    /// All stages in pipeline order.
    pub const ALL: [LeadStatus; 7] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::ClosedWon => "closed_won",
            Self::ClosedLost => "closed_lost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "proposal" => Some(Self::Proposal),
            "negotiation" => Some(Self::Negotiation),
            "closed_won" => Some(Self::ClosedWon),
            "closed_lost" => Some(Self::ClosedLost),
            _ => None,
        }
    }

    /// A lead is closed once it is won or lost; everything else is active.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

/// Lead priority. Sorts high first in lead listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Sort rank for the default lead ordering: high=0, medium=1, low=2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// Input for creating a lead. Defaults (status, priority) are resolved by
/// the operations layer before this reaches storage.
#[derive(Debug, Clone)]
pub struct CreateLeadInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub title: Option<String>,
    pub status: LeadStatus,
    pub source: String,
    pub estimated_value: Option<f64>,
    pub priority: Priority,
    pub tags: Vec<String>,
}

/// Patch for updating a lead.
///
/// Plain `Option` fields are "absent = keep". Double-`Option` fields
/// distinguish absent (keep) from present-but-null (clear).
#[derive(Debug, Clone, Default)]
pub struct UpdateLeadInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<String>,
    pub title: Option<Option<String>>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub estimated_value: Option<Option<f64>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub last_contacted_at: Option<Option<DateTime<Utc>>>,
}

/// Conjunctive filters for listing leads.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub priority: Option<Priority>,
    /// Exact match against the lead's source text.
    pub source: Option<String>,
}
