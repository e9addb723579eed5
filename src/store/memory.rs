use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::*;
use crate::store::{query, Store};

/// In-memory adapter. Nothing persists past the process; this is the
/// default backend for tests and quick local runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    leads: HashMap<Uuid, Lead>,
    templates: HashMap<Uuid, EmailTemplate>,
    email_logs: HashMap<Uuid, EmailLog>,
    meetings: HashMap<Uuid, Meeting>,
    follow_ups: HashMap<Uuid, FollowUp>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    // ============================================================
    // Lead operations
    // ============================================================

    fn create_lead(&self, input: CreateLeadInput) -> Result<Lead> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
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
        tables.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    fn get_lead(&self, id: Uuid) -> Result<Option<Lead>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.leads.get(&id).cloned())
    }

    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        let mut leads: Vec<Lead> = tables
            .leads
            .values()
            .filter(|lead| query::lead_matches(lead, filter))
            .cloned()
            .collect();
        query::sort_leads(&mut leads);
        Ok(leads)
    }

    fn search_leads(&self, search: &str) -> Result<Vec<Lead>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        let query_lower = search.to_lowercase();
        let mut leads: Vec<Lead> = tables
            .leads
            .values()
            .filter(|lead| query::lead_matches_query(lead, &query_lower))
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    fn update_lead(&self, id: Uuid, patch: UpdateLeadInput) -> Result<Option<Lead>> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        let Some(lead) = tables.leads.get_mut(&id) else {
            return Ok(None);
        };
        query::apply_lead_patch(lead, patch, Utc::now());
        Ok(Some(lead.clone()))
    }

    fn add_lead_note(&self, id: Uuid, entry: String) -> Result<Option<Lead>> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        let Some(lead) = tables.leads.get_mut(&id) else {
            return Ok(None);
        };
        lead.notes.push(entry);
        lead.updated_at = Utc::now();
        Ok(Some(lead.clone()))
    }

    fn touch_lead(&self, id: Uuid, contacted_at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        if let Some(lead) = tables.leads.get_mut(&id) {
            lead.last_contacted_at = Some(contacted_at);
            lead.updated_at = contacted_at;
        }
        Ok(())
    }

    fn delete_lead(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.leads.remove(&id).is_some())
    }

    // ============================================================
    // Email template operations
    // ============================================================

    fn create_template(&self, input: CreateTemplateInput) -> Result<EmailTemplate> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        let template = EmailTemplate {
            id: Uuid::new_v4(),
            name: input.name,
            subject: input.subject,
            body: input.body,
            category: input.category,
            variables: input.variables,
        };
        tables.templates.insert(template.id, template.clone());
        Ok(template)
    }

    fn get_template(&self, id: Uuid) -> Result<Option<EmailTemplate>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.templates.get(&id).cloned())
    }

    fn list_templates(&self, category: Option<TemplateCategory>) -> Result<Vec<EmailTemplate>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        let mut templates: Vec<EmailTemplate> = tables
            .templates
            .values()
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
        let mut tables = self.inner.lock().expect("store lock poisoned");
        let Some(template) = tables.templates.get_mut(&id) else {
            return Ok(None);
        };
        query::apply_template_patch(template, patch);
        Ok(Some(template.clone()))
    }

    fn delete_template(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.templates.remove(&id).is_some())
    }

    // ============================================================
    // Email log operations
    // ============================================================

    fn create_email_log(&self, input: CreateEmailLogInput) -> Result<EmailLog> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
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
        tables.email_logs.insert(log.id, log.clone());
        Ok(log)
    }

    fn list_email_logs(&self, filter: &EmailLogFilter) -> Result<Vec<EmailLog>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        let mut logs: Vec<EmailLog> = tables
            .email_logs
            .values()
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
        let mut tables = self.inner.lock().expect("store lock poisoned");
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
        tables.meetings.insert(meeting.id, meeting.clone());
        Ok(meeting)
    }

    fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.meetings.get(&id).cloned())
    }

    fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<Meeting>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        let mut meetings: Vec<Meeting> = tables
            .meetings
            .values()
            .filter(|m| query::meeting_matches(m, filter))
            .cloned()
            .collect();
        meetings.sort_by_key(|m| m.scheduled_at);
        Ok(meetings)
    }

    fn update_meeting(&self, id: Uuid, patch: UpdateMeetingInput) -> Result<Option<Meeting>> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        let Some(meeting) = tables.meetings.get_mut(&id) else {
            return Ok(None);
        };
        query::apply_meeting_patch(meeting, patch);
        Ok(Some(meeting.clone()))
    }

    fn delete_meeting(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.meetings.remove(&id).is_some())
    }

    // ============================================================
    // Follow-up operations
    // ============================================================

    fn create_follow_up(&self, input: CreateFollowUpInput) -> Result<FollowUp> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
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
        tables.follow_ups.insert(follow_up.id, follow_up.clone());
        Ok(follow_up)
    }

    fn get_follow_up(&self, id: Uuid) -> Result<Option<FollowUp>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.follow_ups.get(&id).cloned())
    }

    fn list_follow_ups(&self, filter: &FollowUpFilter) -> Result<Vec<FollowUp>> {
        let tables = self.inner.lock().expect("store lock poisoned");
        let mut follow_ups: Vec<FollowUp> = tables
            .follow_ups
            .values()
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
        let mut tables = self.inner.lock().expect("store lock poisoned");
        let Some(follow_up) = tables.follow_ups.get_mut(&id) else {
            return Ok(None);
        };
        query::apply_follow_up_patch(follow_up, patch, Utc::now());
        Ok(Some(follow_up.clone()))
    }

    fn delete_follow_up(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.inner.lock().expect("store lock poisoned");
        Ok(tables.follow_ups.remove(&id).is_some())
    }
}
