use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable email template with `{{placeholder}}` markers in its subject
/// and body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub category: TemplateCategory,
    /// Advisory list of placeholder names. Interpolation is driven by the
    /// markers actually present in the text, not by this list.
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Introduction,
    FollowUp,
    Proposal,
    Reminder,
    Custom,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::FollowUp => "follow_up",
            Self::Proposal => "proposal",
            Self::Reminder => "reminder",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "introduction" => Some(Self::Introduction),
            "follow_up" => Some(Self::FollowUp),
            "proposal" => Some(Self::Proposal),
            "reminder" => Some(Self::Reminder),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTemplateInput {
    pub name: String,
    pub subject: String,
    pub body: String,
    pub category: TemplateCategory,
    pub variables: Vec<String>,
}

/// Patch for updating a template. Absent fields keep their current value;
/// `variables` replaces the whole list when present.
#[derive(Debug, Clone, Default)]
pub struct UpdateTemplateInput {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub category: Option<TemplateCategory>,
    pub variables: Option<Vec<String>>,
}
