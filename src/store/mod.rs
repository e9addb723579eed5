//! Storage adapters.
//!
//! One [`Store`] trait, three interchangeable backends:
//!
//! - [`MemoryStore`]: in-process maps, nothing persists.
//! - [`SqliteStore`]: embedded SQLite file (or `:memory:`), WAL mode.
//! - [`JsonStore`]: one flat JSON document rewritten on every mutation.
//!
//! The backend is chosen once at startup from [`Config`] via [`open`], which
//! also runs migrations (sqlite) and seeds the default email templates.
//! Filtering, ordering and patch semantics are shared through [`query`] so
//! the backends cannot drift apart.

pub mod json;
pub mod memory;
pub mod query;
mod schema;
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::models::*;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Uniform storage contract: create / get / list / update / delete per
/// entity, plus lead search and the `touch_lead` contact bump. All defaults
/// and validation happen above this layer; inputs arrive fully resolved.
pub trait Store: Send + Sync {
    /// Identifier reported by `GET /health`.
    fn backend(&self) -> &'static str;

    fn create_lead(&self, input: CreateLeadInput) -> Result<Lead>;
    fn get_lead(&self, id: Uuid) -> Result<Option<Lead>>;
    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>>;
    fn search_leads(&self, search: &str) -> Result<Vec<Lead>>;
    fn update_lead(&self, id: Uuid, patch: UpdateLeadInput) -> Result<Option<Lead>>;
    /// Appends an already-formatted note entry and bumps `updated_at`.
    fn add_lead_note(&self, id: Uuid, entry: String) -> Result<Option<Lead>>;
    /// Sets `last_contacted_at` and `updated_at` in one write. A no-op when
    /// the lead does not exist (side-effect bumps are best-effort).
    fn touch_lead(&self, id: Uuid, contacted_at: DateTime<Utc>) -> Result<()>;
    fn delete_lead(&self, id: Uuid) -> Result<bool>;

    fn create_template(&self, input: CreateTemplateInput) -> Result<EmailTemplate>;
    fn get_template(&self, id: Uuid) -> Result<Option<EmailTemplate>>;
    fn list_templates(&self, category: Option<TemplateCategory>) -> Result<Vec<EmailTemplate>>;
    fn update_template(&self, id: Uuid, patch: UpdateTemplateInput)
        -> Result<Option<EmailTemplate>>;
    fn delete_template(&self, id: Uuid) -> Result<bool>;

    fn create_email_log(&self, input: CreateEmailLogInput) -> Result<EmailLog>;
    fn list_email_logs(&self, filter: &EmailLogFilter) -> Result<Vec<EmailLog>>;

    fn create_meeting(&self, input: CreateMeetingInput) -> Result<Meeting>;
    fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>>;
    fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<Meeting>>;
    fn update_meeting(&self, id: Uuid, patch: UpdateMeetingInput) -> Result<Option<Meeting>>;
    fn delete_meeting(&self, id: Uuid) -> Result<bool>;

    fn create_follow_up(&self, input: CreateFollowUpInput) -> Result<FollowUp>;
    fn get_follow_up(&self, id: Uuid) -> Result<Option<FollowUp>>;
    fn list_follow_ups(&self, filter: &FollowUpFilter) -> Result<Vec<FollowUp>>;
    fn update_follow_up(&self, id: Uuid, patch: UpdateFollowUpInput)
        -> Result<Option<FollowUp>>;
    fn delete_follow_up(&self, id: Uuid) -> Result<bool>;
}

/// Opens the backend named by the config, runs migrations where relevant
/// and seeds the default templates.
pub fn open(config: &Config) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        "sqlite" => {
            let db = match &config.data_path {
                Some(path) => SqliteStore::open(path.clone())?,
                None => SqliteStore::open(default_data_path("leadtrack.db")?)?,
            };
            db.migrate()?;
            Arc::new(db)
        }
        "json" => {
            let path = match &config.data_path {
                Some(path) => path.clone(),
                None => default_data_path("leadtrack.json")?,
            };
            Arc::new(JsonStore::open(path)?)
        }
        other => anyhow::bail!("Unknown backend: {other} (expected sqlite, memory or json)"),
    };

    seed_default_templates(store.as_ref())?;
    tracing::info!(backend = store.backend(), "store ready");
    Ok(store)
}

fn default_data_path(file_name: &str) -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "leadtrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join(file_name))
}

/// Seeds the three starter templates. Idempotent: skipped entirely when any
/// template already exists, so user edits and deletions stick.
pub fn seed_default_templates(store: &dyn Store) -> Result<()> {
    if !store.list_templates(None)?.is_empty() {
        return Ok(());
    }
    for input in default_templates() {
        store.create_template(input)?;
    }
    tracing::info!("Seeded default email templates");
    Ok(())
}

fn default_templates() -> Vec<CreateTemplateInput> {
    vec![
        CreateTemplateInput {
            name: "Initial Outreach".to_string(),
            subject: "Great to connect, {{name}}".to_string(),
            body: "Hi {{name}},\n\nThanks for your interest. I'd love to learn more about \
                   what {{company}} is working on and see where we can help.\n\nWould you \
                   have 20 minutes this week for a quick call?\n\nBest regards"
                .to_string(),
            category: TemplateCategory::Introduction,
            variables: vec!["name".to_string(), "company".to_string()],
        },
        CreateTemplateInput {
            name: "Follow Up".to_string(),
            subject: "Following up on our conversation".to_string(),
            body: "Hi {{name}},\n\nJust checking in after our last conversation. Has \
                   anything changed on your side, and is there anything I can clarify \
                   about the proposal?\n\nBest regards"
                .to_string(),
            category: TemplateCategory::FollowUp,
            variables: vec!["name".to_string()],
        },
        CreateTemplateInput {
            name: "Proposal".to_string(),
            subject: "Proposal for {{company}}".to_string(),
            body: "Hi {{name}},\n\nPlease find attached our proposal for {{company}}. \
                   It covers the scope we discussed; happy to walk through it together.\n\n\
                   Best regards"
                .to_string(),
            category: TemplateCategory::Proposal,
            variables: vec!["name".to_string(), "company".to_string()],
        },
    ]
}

/// Fixed-width RFC3339 (microseconds, `Z`). SQL rows always store this form
/// so lexicographic comparison matches chronological comparison.
pub(crate) fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

pub(crate) fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
