//! Aggregation over the store: pipeline, sales report, lead activity and
//! dashboard.
//!
//! Everything here is computed from full scans through the [`Store`] trait,
//! so all backends produce identical numbers. The dataset is a sales desk,
//! not a warehouse; scans are fine.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    EmailLog, EmailLogFilter, FollowUp, FollowUpFilter, Lead, LeadFilter, LeadStatus, Meeting,
    MeetingFilter,
};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct Pipeline {
    /// Keyed by status string; every stage is present even when empty.
    pub pipeline: BTreeMap<String, PipelineStage>,
    pub summary: PipelineSummary,
}

#[derive(Debug, Serialize)]
pub struct PipelineStage {
    pub leads: Vec<Lead>,
    pub count: usize,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub total_leads: usize,
    pub active_leads: usize,
    pub total_pipeline_value: f64,
    /// "X.X%", exactly "0%" when nothing has closed yet.
    pub win_rate: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: ReportPeriod,
    pub leads_by_status: BTreeMap<String, usize>,
    pub emails_sent: usize,
    pub meetings_scheduled: usize,
    pub leads_by_day: BTreeMap<String, usize>,
    pub emails_by_day: BTreeMap<String, usize>,
    pub revenue: RevenueReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total: f64,
    pub average_deal_size: f64,
    /// Same formula as the pipeline's rate but WITHOUT the "%" suffix, and
    /// "0" (not "0%") on the zero-guard. Inherited wire format; callers
    /// depend on both spellings, so do not unify them.
    pub win_rate: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadActivity {
    pub lead: Lead,
    pub summary: ActivitySummary,
    pub recent_emails: Vec<EmailLog>,
    pub upcoming_meetings: Vec<Meeting>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub emails: usize,
    pub meetings: usize,
    pub follow_ups: usize,
    pub notes: usize,
    pub pending_follow_ups: usize,
    pub last_contacted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: PipelineSummary,
    pub leads_by_status: BTreeMap<String, usize>,
    pub upcoming_meetings: Vec<Meeting>,
    pub pending_follow_ups: Vec<FollowUp>,
    pub recent_leads: Vec<Lead>,
}

/// Groups every lead into its pipeline stage with per-stage value sums.
pub fn pipeline(store: &dyn Store) -> Result<Pipeline> {
    let leads = store.list_leads(&LeadFilter::default())?;
    let summary = summarize(&leads);

    let mut stages: BTreeMap<String, PipelineStage> = LeadStatus::ALL
        .iter()
        .map(|status| {
            (
                status.as_str().to_string(),
                PipelineStage {
                    leads: Vec::new(),
                    count: 0,
                    value: 0.0,
                },
            )
        })
        .collect();

    for lead in leads {
        if let Some(stage) = stages.get_mut(lead.status.as_str()) {
            stage.count += 1;
            stage.value += lead.estimated_value.unwrap_or(0.0);
            stage.leads.push(lead);
        }
    }

    Ok(Pipeline {
        pipeline: stages,
        summary,
    })
}

/// Windowed activity report. Bounds default independently: `from` to 30
/// days ago, `to` to now. Leads are windowed by creation time, emails by
/// send time, meetings by scheduled time.
pub fn sales_report(
    store: &dyn Store,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<SalesReport> {
    let from = from.unwrap_or_else(|| Utc::now() - Duration::days(30));
    let to = to.unwrap_or_else(Utc::now);

    let leads: Vec<Lead> = store
        .list_leads(&LeadFilter::default())?
        .into_iter()
        .filter(|l| l.created_at >= from && l.created_at <= to)
        .collect();
    let emails: Vec<EmailLog> = store
        .list_email_logs(&EmailLogFilter::default())?
        .into_iter()
        .filter(|e| e.sent_at >= from && e.sent_at <= to)
        .collect();
    let meetings = store.list_meetings(&MeetingFilter {
        from_date: Some(from),
        to_date: Some(to),
        ..Default::default()
    })?;

    let won: Vec<&Lead> = leads
        .iter()
        .filter(|l| l.status == LeadStatus::ClosedWon)
        .collect();
    let lost = leads
        .iter()
        .filter(|l| l.status == LeadStatus::ClosedLost)
        .count();
    let total: f64 = won.iter().map(|l| l.estimated_value.unwrap_or(0.0)).sum();
    let average_deal_size = if won.is_empty() {
        0.0
    } else {
        total / won.len() as f64
    };

    Ok(SalesReport {
        period: ReportPeriod { from, to },
        leads_by_status: status_counts(&leads),
        emails_sent: emails.len(),
        meetings_scheduled: meetings.len(),
        leads_by_day: day_histogram(leads.iter().map(|l| l.created_at)),
        emails_by_day: day_histogram(emails.iter().map(|e| e.sent_at)),
        revenue: RevenueReport {
            total,
            average_deal_size,
            win_rate: win_rate(won.len(), lost, false),
        },
    })
}

/// Everything on file for one lead. `Ok(None)` when the lead is absent.
pub fn lead_activity(store: &dyn Store, lead_id: Uuid) -> Result<Option<LeadActivity>> {
    let Some(lead) = store.get_lead(lead_id)? else {
        return Ok(None);
    };

    let emails = store.list_email_logs(&EmailLogFilter {
        lead_id: Some(lead_id),
    })?;
    let meetings = store.list_meetings(&MeetingFilter {
        lead_id: Some(lead_id),
        ..Default::default()
    })?;
    let follow_ups = store.list_follow_ups(&FollowUpFilter {
        lead_id: Some(lead_id),
        ..Default::default()
    })?;

    let now = Utc::now();
    let pending_follow_ups = follow_ups.iter().filter(|f| !f.completed).count();
    let upcoming_meetings: Vec<Meeting> = meetings
        .iter()
        .filter(|m| m.scheduled_at >= now)
        .take(3)
        .cloned()
        .collect();
    let recent_emails: Vec<EmailLog> = emails.iter().take(5).cloned().collect();

    Ok(Some(LeadActivity {
        summary: ActivitySummary {
            emails: emails.len(),
            meetings: meetings.len(),
            follow_ups: follow_ups.len(),
            notes: lead.notes.len(),
            pending_follow_ups,
            last_contacted_at: lead.last_contacted_at,
        },
        recent_emails,
        upcoming_meetings,
        lead,
    }))
}

/// Snapshot for the landing view: global stats plus short upcoming/pending
/// and recent lists.
pub fn dashboard(store: &dyn Store) -> Result<Dashboard> {
    let leads = store.list_leads(&LeadFilter::default())?;
    let now = Utc::now();

    let upcoming_meetings: Vec<Meeting> = store
        .list_meetings(&MeetingFilter {
            from_date: Some(now),
            ..Default::default()
        })?
        .into_iter()
        .take(5)
        .collect();
    let pending_follow_ups: Vec<FollowUp> = store
        .list_follow_ups(&FollowUpFilter {
            completed: Some(false),
            ..Default::default()
        })?
        .into_iter()
        .take(5)
        .collect();

    let mut recent_leads = leads.clone();
    recent_leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_leads.truncate(5);

    Ok(Dashboard {
        summary: summarize(&leads),
        leads_by_status: status_counts(&leads),
        upcoming_meetings,
        pending_follow_ups,
        recent_leads,
    })
}

fn summarize(leads: &[Lead]) -> PipelineSummary {
    let won = leads
        .iter()
        .filter(|l| l.status == LeadStatus::ClosedWon)
        .count();
    let lost = leads
        .iter()
        .filter(|l| l.status == LeadStatus::ClosedLost)
        .count();
    PipelineSummary {
        total_leads: leads.len(),
        active_leads: leads.iter().filter(|l| !l.status.is_closed()).count(),
        total_pipeline_value: leads.iter().map(|l| l.estimated_value.unwrap_or(0.0)).sum(),
        win_rate: win_rate(won, lost, true),
    }
}

/// Per-status counts with every stage present, zero or not.
fn status_counts(leads: &[Lead]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = LeadStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for lead in leads {
        if let Some(count) = counts.get_mut(lead.status.as_str()) {
            *count += 1;
        }
    }
    counts
}

fn day_histogram(timestamps: impl Iterator<Item = DateTime<Utc>>) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for ts in timestamps {
        *histogram.entry(day_key(ts)).or_insert(0) += 1;
    }
    histogram
}

fn day_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// won / (won + lost) × 100 to one decimal. The pipeline spelling carries a
/// "%" suffix, the report spelling does not; zero closed deals yields "0%"
/// and "0" respectively.
fn win_rate(won: usize, lost: usize, with_percent: bool) -> String {
    let closed = won + lost;
    if closed == 0 {
        return if with_percent { "0%" } else { "0" }.to_string();
    }
    let rate = won as f64 / closed as f64 * 100.0;
    if with_percent {
        format!("{rate:.1}%")
    } else {
        format!("{rate:.1}")
    }
}
