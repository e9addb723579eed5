use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;
use crate::store::query;
use crate::store::{format_ts, parse_datetime, parse_uuid, Store};

/// SQLite adapter. One connection behind a mutex; list-valued fields are
/// JSON text columns; timestamps are fixed-width RFC3339 so SQL ordering
/// agrees with chronological ordering.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        super::schema::run_migrations(&conn)
    }

    /// Full-row write-back used by every lead mutation, so patch semantics
    /// live in one place (`query::apply_lead_patch`) instead of in SQL.
    fn write_lead(&self, lead: &Lead) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE leads SET name = ?, email = ?, phone = ?, company = ?, title = ?,
                    status = ?, source = ?, notes = ?, created_at = ?, updated_at = ?,
                    last_contacted_at = ?, estimated_value = ?, priority = ?, tags = ?
             WHERE id = ?",
            (
                &lead.name,
                &lead.email,
                &lead.phone,
                &lead.company,
                &lead.title,
                lead.status.as_str(),
                &lead.source,
                serde_json::to_string(&lead.notes)?,
                format_ts(lead.created_at),
                format_ts(lead.updated_at),
                lead.last_contacted_at.map(format_ts),
                lead.estimated_value,
                lead.priority.as_str(),
                serde_json::to_string(&lead.tags)?,
                lead.id.to_string(),
            ),
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    // ============================================================
    // Lead operations
    // ============================================================

    fn create_lead(&self, input: CreateLeadInput) -> Result<Lead> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO leads (id, name, email, phone, company, title, status, source,
                    notes, created_at, updated_at, last_contacted_at, estimated_value,
                    priority, tags)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.email,
                &input.phone,
                &input.company,
                &input.title,
                input.status.as_str(),
                &input.source,
                "[]",
                format_ts(now),
                format_ts(now),
                None::<String>,
                input.estimated_value,
                input.priority.as_str(),
                serde_json::to_string(&input.tags)?,
            ),
        )?;

        Ok(Lead {
            id,
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
        })
    }

    fn get_lead(&self, id: Uuid) -> Result<Option<Lead>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, company, title, status, source, notes,
                    created_at, updated_at, last_contacted_at, estimated_value, priority, tags
             FROM leads WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(lead_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, company, title, status, source, notes,
                    created_at, updated_at, last_contacted_at, estimated_value, priority, tags
             FROM leads
             ORDER BY CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                      created_at DESC",
        )?;

        let leads = stmt
            .query_map([], lead_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(leads
            .into_iter()
            .filter(|lead| query::lead_matches(lead, filter))
            .collect())
    }

    fn search_leads(&self, search: &str) -> Result<Vec<Lead>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, company, title, status, source, notes,
                    created_at, updated_at, last_contacted_at, estimated_value, priority, tags
             FROM leads ORDER BY created_at DESC",
        )?;

        let leads = stmt
            .query_map([], lead_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let query_lower = search.to_lowercase();
        Ok(leads
            .into_iter()
            .filter(|lead| query::lead_matches_query(lead, &query_lower))
            .collect())
    }

    fn update_lead(&self, id: Uuid, patch: UpdateLeadInput) -> Result<Option<Lead>> {
        let Some(mut lead) = self.get_lead(id)? else {
            return Ok(None);
        };
        query::apply_lead_patch(&mut lead, patch, Utc::now());
        self.write_lead(&lead)?;
        Ok(Some(lead))
    }

    fn add_lead_note(&self, id: Uuid, entry: String) -> Result<Option<Lead>> {
        let Some(mut lead) = self.get_lead(id)? else {
            return Ok(None);
        };
        lead.notes.push(entry);
        lead.updated_at = Utc::now();
        self.write_lead(&lead)?;
        Ok(Some(lead))
    }

    fn touch_lead(&self, id: Uuid, contacted_at: DateTime<Utc>) -> Result<()> {
        let Some(mut lead) = self.get_lead(id)? else {
            return Ok(());
        };
        lead.last_contacted_at = Some(contacted_at);
        lead.updated_at = contacted_at;
        self.write_lead(&lead)
    }

    fn delete_lead(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM leads WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Email template operations
    // ============================================================

    fn create_template(&self, input: CreateTemplateInput) -> Result<EmailTemplate> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO email_templates (id, name, subject, body, category, variables)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.subject,
                &input.body,
                input.category.as_str(),
                serde_json::to_string(&input.variables)?,
            ),
        )?;

        Ok(EmailTemplate {
            id,
            name: input.name,
            subject: input.subject,
            body: input.body,
            category: input.category,
            variables: input.variables,
        })
    }

    fn get_template(&self, id: Uuid) -> Result<Option<EmailTemplate>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, subject, body, category, variables
             FROM email_templates WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(template_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    fn list_templates(&self, category: Option<TemplateCategory>) -> Result<Vec<EmailTemplate>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, subject, body, category, variables
             FROM email_templates ORDER BY name",
        )?;

        let templates = stmt
            .query_map([], template_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(templates
            .into_iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect())
    }

    fn update_template(
        &self,
        id: Uuid,
        patch: UpdateTemplateInput,
    ) -> Result<Option<EmailTemplate>> {
        let Some(mut template) = self.get_template(id)? else {
            return Ok(None);
        };
        query::apply_template_patch(&mut template, patch);

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE email_templates SET name = ?, subject = ?, body = ?, category = ?, variables = ?
             WHERE id = ?",
            (
                &template.name,
                &template.subject,
                &template.body,
                template.category.as_str(),
                serde_json::to_string(&template.variables)?,
                id.to_string(),
            ),
        )?;

        Ok(Some(template))
    }

    fn delete_template(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "DELETE FROM email_templates WHERE id = ?",
            [id.to_string()],
        )?;
        Ok(rows > 0)
    }

    // ============================================================
    // Email log operations
    // ============================================================

    fn create_email_log(&self, input: CreateEmailLogInput) -> Result<EmailLog> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();

        conn.execute(
            "INSERT INTO email_logs (id, lead_id, template_id, subject, body, sent_at,
                    opened_at, clicked_at, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.lead_id.to_string(),
                input.template_id.map(|u| u.to_string()),
                &input.subject,
                &input.body,
                format_ts(input.sent_at),
                None::<String>,
                None::<String>,
                input.status.as_str(),
            ),
        )?;

        Ok(EmailLog {
            id,
            lead_id: input.lead_id,
            template_id: input.template_id,
            subject: input.subject,
            body: input.body,
            sent_at: input.sent_at,
            opened_at: None,
            clicked_at: None,
            status: input.status,
        })
    }

    fn list_email_logs(&self, filter: &EmailLogFilter) -> Result<Vec<EmailLog>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, lead_id, template_id, subject, body, sent_at, opened_at, clicked_at, status
             FROM email_logs ORDER BY sent_at DESC",
        )?;

        let logs = stmt
            .query_map([], email_log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs
            .into_iter()
            .filter(|log| query::email_log_matches(log, filter))
            .collect())
    }

    // ============================================================
    // Meeting operations
    // ============================================================

    fn create_meeting(&self, input: CreateMeetingInput) -> Result<Meeting> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO meetings (id, lead_id, title, description, scheduled_at, duration,
                    location, meeting_link, status, outcome, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.lead_id.to_string(),
                &input.title,
                &input.description,
                format_ts(input.scheduled_at),
                input.duration,
                &input.location,
                &input.meeting_link,
                MeetingStatus::Scheduled.as_str(),
                None::<String>,
                format_ts(now),
            ),
        )?;

        Ok(Meeting {
            id,
            lead_id: input.lead_id,
            title: input.title,
            description: input.description,
            scheduled_at: input.scheduled_at,
            duration: input.duration,
            location: input.location,
            meeting_link: input.meeting_link,
            status: MeetingStatus::Scheduled,
            outcome: None,
            created_at: now,
        })
    }

    fn get_meeting(&self, id: Uuid) -> Result<Option<Meeting>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, lead_id, title, description, scheduled_at, duration, location,
                    meeting_link, status, outcome, created_at
             FROM meetings WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(meeting_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    fn list_meetings(&self, filter: &MeetingFilter) -> Result<Vec<Meeting>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, lead_id, title, description, scheduled_at, duration, location,
                    meeting_link, status, outcome, created_at
             FROM meetings ORDER BY scheduled_at",
        )?;

        let meetings = stmt
            .query_map([], meeting_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meetings
            .into_iter()
            .filter(|m| query::meeting_matches(m, filter))
            .collect())
    }

    fn update_meeting(&self, id: Uuid, patch: UpdateMeetingInput) -> Result<Option<Meeting>> {
        let Some(mut meeting) = self.get_meeting(id)? else {
            return Ok(None);
        };
        query::apply_meeting_patch(&mut meeting, patch);

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE meetings SET title = ?, description = ?, scheduled_at = ?, duration = ?,
                    location = ?, meeting_link = ?, status = ?, outcome = ?
             WHERE id = ?",
            (
                &meeting.title,
                &meeting.description,
                format_ts(meeting.scheduled_at),
                meeting.duration,
                &meeting.location,
                &meeting.meeting_link,
                meeting.status.as_str(),
                &meeting.outcome,
                id.to_string(),
            ),
        )?;

        Ok(Some(meeting))
    }

    fn delete_meeting(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM meetings WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Follow-up operations
    // ============================================================

    fn create_follow_up(&self, input: CreateFollowUpInput) -> Result<FollowUp> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO follow_ups (id, lead_id, type, scheduled_at, description,
                    completed, completed_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.lead_id.to_string(),
                input.follow_up_type.as_str(),
                format_ts(input.scheduled_at),
                &input.description,
                false,
                None::<String>,
                format_ts(now),
            ),
        )?;

        Ok(FollowUp {
            id,
            lead_id: input.lead_id,
            follow_up_type: input.follow_up_type,
            scheduled_at: input.scheduled_at,
            description: input.description,
            completed: false,
            completed_at: None,
            created_at: now,
        })
    }

    fn get_follow_up(&self, id: Uuid) -> Result<Option<FollowUp>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, lead_id, type, scheduled_at, description, completed, completed_at, created_at
             FROM follow_ups WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(follow_up_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    fn list_follow_ups(&self, filter: &FollowUpFilter) -> Result<Vec<FollowUp>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, lead_id, type, scheduled_at, description, completed, completed_at, created_at
             FROM follow_ups ORDER BY scheduled_at",
        )?;

        let follow_ups = stmt
            .query_map([], follow_up_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(follow_ups
            .into_iter()
            .filter(|f| query::follow_up_matches(f, filter))
            .collect())
    }

    fn update_follow_up(
        &self,
        id: Uuid,
        patch: UpdateFollowUpInput,
    ) -> Result<Option<FollowUp>> {
        let Some(mut follow_up) = self.get_follow_up(id)? else {
            return Ok(None);
        };
        query::apply_follow_up_patch(&mut follow_up, patch, Utc::now());

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE follow_ups SET type = ?, scheduled_at = ?, description = ?,
                    completed = ?, completed_at = ?
             WHERE id = ?",
            (
                follow_up.follow_up_type.as_str(),
                format_ts(follow_up.scheduled_at),
                &follow_up.description,
                follow_up.completed,
                follow_up.completed_at.map(format_ts),
                id.to_string(),
            ),
        )?;

        Ok(Some(follow_up))
    }

    fn delete_follow_up(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM follow_ups WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for SqliteStore {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn lead_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let notes_json: String = row.get(8)?;
    let tags_json: String = row.get(14)?;
    Ok(Lead {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        company: row.get(4)?,
        title: row.get(5)?,
        status: LeadStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(LeadStatus::New),
        source: row.get(7)?,
        notes: serde_json::from_str(&notes_json).unwrap_or_default(),
        created_at: parse_datetime(row.get::<_, String>(9)?),
        updated_at: parse_datetime(row.get::<_, String>(10)?),
        last_contacted_at: row.get::<_, Option<String>>(11)?.map(parse_datetime),
        estimated_value: row.get(12)?,
        priority: Priority::from_str(&row.get::<_, String>(13)?).unwrap_or(Priority::Medium),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
    })
}

fn template_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmailTemplate> {
    let variables_json: String = row.get(5)?;
    Ok(EmailTemplate {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        subject: row.get(2)?,
        body: row.get(3)?,
        category: TemplateCategory::from_str(&row.get::<_, String>(4)?)
            .unwrap_or(TemplateCategory::Custom),
        variables: serde_json::from_str(&variables_json).unwrap_or_default(),
    })
}

fn email_log_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmailLog> {
    Ok(EmailLog {
        id: parse_uuid(row.get::<_, String>(0)?),
        lead_id: parse_uuid(row.get::<_, String>(1)?),
        template_id: row.get::<_, Option<String>>(2)?.map(parse_uuid),
        subject: row.get(3)?,
        body: row.get(4)?,
        sent_at: parse_datetime(row.get::<_, String>(5)?),
        opened_at: row.get::<_, Option<String>>(6)?.map(parse_datetime),
        clicked_at: row.get::<_, Option<String>>(7)?.map(parse_datetime),
        status: EmailStatus::from_str(&row.get::<_, String>(8)?).unwrap_or(EmailStatus::Sent),
    })
}

fn meeting_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meeting> {
    Ok(Meeting {
        id: parse_uuid(row.get::<_, String>(0)?),
        lead_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        scheduled_at: parse_datetime(row.get::<_, String>(4)?),
        duration: row.get(5)?,
        location: row.get(6)?,
        meeting_link: row.get(7)?,
        status: MeetingStatus::from_str(&row.get::<_, String>(8)?)
            .unwrap_or(MeetingStatus::Scheduled),
        outcome: row.get(9)?,
        created_at: parse_datetime(row.get::<_, String>(10)?),
    })
}

fn follow_up_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FollowUp> {
    Ok(FollowUp {
        id: parse_uuid(row.get::<_, String>(0)?),
        lead_id: parse_uuid(row.get::<_, String>(1)?),
        follow_up_type: FollowUpType::from_str(&row.get::<_, String>(2)?)
            .unwrap_or(FollowUpType::Task),
        scheduled_at: parse_datetime(row.get::<_, String>(3)?),
        description: row.get(4)?,
        completed: row.get::<_, i32>(5)? != 0,
        completed_at: row.get::<_, Option<String>>(6)?.map(parse_datetime),
        created_at: parse_datetime(row.get::<_, String>(7)?),
    })
}
