//! Pure filtering, ordering and patch logic shared by every backend.
//!
//! The SQL backend pushes filtering and ordering into queries where it can,
//! but patches always go through [`apply_lead_patch`] and friends so that
//! the read-modify-write semantics cannot drift between backends.

use chrono::{DateTime, Utc};

use crate::models::{
    EmailLog, EmailLogFilter, EmailTemplate, FollowUp, FollowUpFilter, Lead, LeadFilter,
    Meeting, MeetingFilter, UpdateFollowUpInput, UpdateLeadInput, UpdateMeetingInput,
    UpdateTemplateInput,
};

pub fn lead_matches(lead: &Lead, filter: &LeadFilter) -> bool {
    if let Some(status) = filter.status {
        if lead.status != status {
            return false;
        }
    }
    if let Some(priority) = filter.priority {
        if lead.priority != priority {
            return false;
        }
    }
    if let Some(source) = &filter.source {
        if &lead.source != source {
            return false;
        }
    }
    true
}

/// Default lead ordering: priority rank ascending (high first), then
/// creation time descending (newest first).
pub fn sort_leads(leads: &mut [Lead]) {
    leads.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then(b.created_at.cmp(&a.created_at))
    });
}

/// Free-text search: case-insensitive substring match on name, company and
/// email, or case-insensitive whole-tag match. `query_lower` must already
/// be lowercased.
pub fn lead_matches_query(lead: &Lead, query_lower: &str) -> bool {
    lead.name.to_lowercase().contains(query_lower)
        || lead.company.to_lowercase().contains(query_lower)
        || lead.email.to_lowercase().contains(query_lower)
        || lead
            .tags
            .iter()
            .any(|tag| tag.to_lowercase() == query_lower)
}

pub fn meeting_matches(meeting: &Meeting, filter: &MeetingFilter) -> bool {
    if let Some(lead_id) = filter.lead_id {
        if meeting.lead_id != lead_id {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if meeting.status != status {
            return false;
        }
    }
    if let Some(from) = filter.from_date {
        if meeting.scheduled_at < from {
            return false;
        }
    }
    if let Some(to) = filter.to_date {
        if meeting.scheduled_at > to {
            return false;
        }
    }
    true
}

pub fn follow_up_matches(follow_up: &FollowUp, filter: &FollowUpFilter) -> bool {
    if let Some(lead_id) = filter.lead_id {
        if follow_up.lead_id != lead_id {
            return false;
        }
    }
    if let Some(completed) = filter.completed {
        if follow_up.completed != completed {
            return false;
        }
    }
    if let Some(from) = filter.from_date {
        if follow_up.scheduled_at < from {
            return false;
        }
    }
    true
}

pub fn email_log_matches(log: &EmailLog, filter: &EmailLogFilter) -> bool {
    if let Some(lead_id) = filter.lead_id {
        if log.lead_id != lead_id {
            return false;
        }
    }
    true
}

/// Applies a patch to a lead and bumps `updated_at`. An empty patch still
/// bumps the timestamp.
pub fn apply_lead_patch(lead: &mut Lead, patch: UpdateLeadInput, now: DateTime<Utc>) {
    if let Some(name) = patch.name {
        lead.name = name;
    }
    if let Some(email) = patch.email {
        lead.email = email;
    }
    if let Some(phone) = patch.phone {
        lead.phone = phone;
    }
    if let Some(company) = patch.company {
        lead.company = company;
    }
    if let Some(title) = patch.title {
        lead.title = title;
    }
    if let Some(status) = patch.status {
        lead.status = status;
    }
    if let Some(source) = patch.source {
        lead.source = source;
    }
    if let Some(estimated_value) = patch.estimated_value {
        lead.estimated_value = estimated_value;
    }
    if let Some(priority) = patch.priority {
        lead.priority = priority;
    }
    if let Some(tags) = patch.tags {
        lead.tags = tags;
    }
    if let Some(last_contacted_at) = patch.last_contacted_at {
        lead.last_contacted_at = last_contacted_at;
    }
    lead.updated_at = now;
}

pub fn apply_template_patch(template: &mut EmailTemplate, patch: UpdateTemplateInput) {
    if let Some(name) = patch.name {
        template.name = name;
    }
    if let Some(subject) = patch.subject {
        template.subject = subject;
    }
    if let Some(body) = patch.body {
        template.body = body;
    }
    if let Some(category) = patch.category {
        template.category = category;
    }
    if let Some(variables) = patch.variables {
        template.variables = variables;
    }
}

pub fn apply_meeting_patch(meeting: &mut Meeting, patch: UpdateMeetingInput) {
    if let Some(title) = patch.title {
        meeting.title = title;
    }
    if let Some(description) = patch.description {
        meeting.description = description;
    }
    if let Some(scheduled_at) = patch.scheduled_at {
        meeting.scheduled_at = scheduled_at;
    }
    if let Some(duration) = patch.duration {
        meeting.duration = duration;
    }
    if let Some(location) = patch.location {
        meeting.location = location;
    }
    if let Some(meeting_link) = patch.meeting_link {
        meeting.meeting_link = meeting_link;
    }
    if let Some(status) = patch.status {
        meeting.status = status;
    }
    if let Some(outcome) = patch.outcome {
        meeting.outcome = outcome;
    }
}

/// Applies a patch to a follow-up. `completed_at` is set only on the
/// false→true transition and cleared whenever `completed` is set to false,
/// so re-completing keeps the original completion time.
pub fn apply_follow_up_patch(
    follow_up: &mut FollowUp,
    patch: UpdateFollowUpInput,
    now: DateTime<Utc>,
) {
    if let Some(follow_up_type) = patch.follow_up_type {
        follow_up.follow_up_type = follow_up_type;
    }
    if let Some(scheduled_at) = patch.scheduled_at {
        follow_up.scheduled_at = scheduled_at;
    }
    if let Some(description) = patch.description {
        follow_up.description = description;
    }
    if let Some(completed) = patch.completed {
        if completed && !follow_up.completed {
            follow_up.completed_at = Some(now);
        } else if !completed {
            follow_up.completed_at = None;
        }
        follow_up.completed = completed;
    }
}
