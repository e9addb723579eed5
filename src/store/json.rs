use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::*;
use crate::store::{query, Store};

/// Flat JSON document adapter. The whole dataset lives in one pretty-printed
/// file that is rewritten after every mutation. A missing or unreadable file
/// starts the store empty rather than failing.
pub struct JsonStore {
    path: PathBuf,
    inner: Mutex<Document>,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Document {
    leads: Vec<Lead>,
    email_templates: Vec<EmailTemplate>,
    email_logs: Vec<EmailLog>,
    meetings: Vec<Meeting>,
    follow_ups: Vec<FollowUp>,
}

impl JsonStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let document = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Document::default(),
        };
        Ok(Self {
            path,
            inner: Mutex::new(document),
        })
    }

    fn save(&self, document: &Document) -> Result<()> {
        let contents = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl Store for JsonStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    // ============================================================
    // Lead operations
    // ============================================================

    fn create_lead(&self, input: CreateLeadInput) -> Result<Lead> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            title: input.title,
            status: input.status,
            source: input.source,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
            last_contacted_at: None,
            estimated_value: input.estimated_value,
            priority: input.priority,
            tags: input.tags,
        };
        doc.leads.push(lead.clone());
        self.save(&doc)?;
        Ok(lead)
    }

    fn get_lead(&self, id: Uuid) -> Result<Option<Lead>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        Ok(doc.leads.iter().find(|l| l.id == id).cloned())
    }

    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        let mut leads: Vec<Lead> = doc
            .leads
            .iter()
            .filter(|lead| query::lead_matches(lead, filter))
            .cloned()
            .collect();
        query::sort_leads(&mut leads);
        Ok(leads)
    }

    fn search_leads(&self, search: &str) -> Result<Vec<Lead>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        let query_lower = search.to_lowercase();
        let mut leads: Vec<Lead> = doc
            .leads
            .iter()
            .filter(|lead| query::lead_matches_query(lead, &query_lower))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    fn update_lead(&self, id: Uuid, patch: UpdateLeadInput) -> Result<Option<Lead>> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let Some(lead) = doc.leads.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        query::apply_lead_patch(lead, patch, Utc::now());
        let updated = lead.clone();
        self.save(&doc)?;
        Ok(Some(updated))
    }

    fn add_lead_note(&self, id: Uuid, entry: String) -> Result<Option<Lead>> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let Some(lead) = doc.leads.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        lead.notes.push(entry);
        lead.updated_at = Utc::now();
        let updated = lead.clone();
        self.save(&doc)?;
        Ok(Some(updated))
    }

    fn touch_lead(&self, id: Uuid, contacted_at: DateTime<Utc>) -> Result<()> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let Some(lead) = doc.leads.iter_mut().find(|l| l.id == id) else {
            return Ok(());
        };
        lead.last_contacted_at = Some(contacted_at);
        lead.updated_at = contacted_at;
        self.save(&doc)
    }

    fn delete_lead(&self, id: Uuid) -> Result<bool> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let before = doc.leads.len();
        doc.leads.retain(|l| l.id != id);
        if doc.leads.len() == before {
            return Ok(false);
        }
        self.save(&doc)?;
        Ok(true)
    }

    // ============================================================
    // Email template operations
    // ============================================================

    fn create_template(&self, input: CreateTemplateInput) -> Result<EmailTemplate> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let template = EmailTemplate {
            id: Uuid::new_v4(),
            name: input.name,
            subject: input.subject,
            body: input.body,
            category: input.category,
            variables: input.variables,
        };
        doc.email_templates.push(template.clone());
        self.save(&doc)?;
        Ok(template)
    }

    fn get_template(&self, id: Uuid) -> Result<Option<EmailTemplate>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        Ok(doc.email_templates.iter().find(|t| t.id == id).cloned())
    }

    fn list_templates(&self, category: Option<TemplateCategory>) -> Result<Vec<EmailTemplate>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        let mut templates: Vec<EmailTemplate> = doc
            .email_templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    fn update_template(
        &self,
        id: Uuid,
        patch: UpdateTemplateInput,
    ) -> Result<Option<EmailTemplate>> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let Some(template) = doc.email_templates.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        query::apply_template_patch(template, patch);
        let updated = template.clone();
        self.save(&doc)?;
        Ok(Some(updated))
    }

    fn delete_template(&self, id: Uuid) -> Result<bool> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let before = doc.email_templates.len();
        doc.email_templates.retain(|t| t.id != id);
        if doc.email_templates.len() == before {
            return Ok(false);
        }
        self.save(&doc)?;
        Ok(true)
    }

    // ============================================================
    // Email log operations
    // ============================================================

    fn create_email_log(&self, input: CreateEmailLogInput) -> Result<EmailLog> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let log = EmailLog {
            id: Uuid::new_v4(),
            lead_id: input.lead_id,
            template_id: input.template_id,
            subject: input.subject,
            body: input.body,
            sent_at: input.sent_at,
            opened_at: None,
            clicked_at: None,
            status: input.status,
        };
        doc.email_logs.push(log.clone());
        self.save(&doc)?;
        Ok(log)
    }

    fn list_email_logs(&self, filter: &EmailLogFilter) -> Result<Vec<EmailLog>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        let mut logs: Vec<EmailLog> = doc
            .email_logs
            .iter()
            .filter(|log| query::email_log_matches(log, filter))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(logs)
    }

    // ============================================================
    // Meeting operations
    // ============================================================

    fn create_meeting(&self, input: CreateMeetingInput) -> Result<Meeting> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let meeting = Meeting {
            id: Uuid::new_v4(),
            lead_id: input.lead_id,
            title: input.title,
            description: input.description,
            scheduled_at: input.scheduled_at,
            duration: input.duration,
            location: input.location,
            meeting_link: input.meeting_link,
            status: MeetingStatus::Scheduled,
            outcome: None,
            created_at: Utc::now(),
        };
        doc.meetings.push(meeting.clone());
        self.save(&doc)?;
        Ok(meeting)
    }

    fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        Ok(doc.meetings.iter().find(|m| m.id == id).cloned())
    }

    fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<Meeting>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        let mut meetings: Vec<Meeting> = doc
            .meetings
            .iter()
            .filter(|m| query::meeting_matches(m, filter))
            .cloned()
            .collect();
        meetings.sort_by_key(|m| m.scheduled_at);
        Ok(meetings)
    }

    fn update_meeting(&self, id: Uuid, patch: UpdateMeetingInput) -> Result<Option<Meeting>> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let Some(meeting) = doc.meetings.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        query::apply_meeting_patch(meeting, patch);
        let updated = meeting.clone();
        self.save(&doc)?;
        Ok(Some(updated))
    }

    fn delete_meeting(&self, id: Uuid) -> Result<bool> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let before = doc.meetings.len();
        doc.meetings.retain(|m| m.id != id);
        if doc.meetings.len() == before {
            return Ok(false);
        }
        self.save(&doc)?;
        Ok(true)
    }

    // ============================================================
    // Follow-up operations
    // ============================================================

    fn create_follow_up(&self, input: CreateFollowUpInput) -> Result<FollowUp> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let follow_up = FollowUp {
            id: Uuid::new_v4(),
            lead_id: input.lead_id,
            follow_up_type: input.follow_up_type,
            scheduled_at: input.scheduled_at,
            description: input.description,
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
        };
        doc.follow_ups.push(follow_up.clone());
        self.save(&doc)?;
        Ok(follow_up)
    }

    fn get_follow_up(&self, id: Uuid) -> Result<Option<FollowUp>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        Ok(doc.follow_ups.iter().find(|f| f.id == id).cloned())
    }

    fn list_follow_ups(&self, filter: &FollowUpFilter) -> Result<Vec<FollowUp>> {
        let doc = self.inner.lock().expect("store lock poisoned");
        let mut follow_ups: Vec<FollowUp> = doc
            .follow_ups
            .iter()
            .filter(|f| query::follow_up_matches(f, filter))
            .cloned()
            .collect();
        follow_ups.sort_by_key(|f| f.scheduled_at);
        Ok(follow_ups)
    }

    fn update_follow_up(
        &self,
        id: Uuid,
        patch: UpdateFollowUpInput,
    ) -> Result<Option<FollowUp>> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let Some(follow_up) = doc.follow_ups.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        query::apply_follow_up_patch(follow_up, patch, Utc::now());
        let updated = follow_up.clone();
        self.save(&doc)?;
        Ok(Some(updated))
    }

    fn delete_follow_up(&self, id: Uuid) -> Result<bool> {
        let mut doc = self.inner.lock().expect("store lock poisoned");
        let before = doc.follow_ups.len();
        doc.follow_ups.retain(|f| f.id != id);
        if doc.follow_ups.len() == before {
            return Ok(false);
        }
        self.save(&doc)?;
        Ok(true)
    }
}
