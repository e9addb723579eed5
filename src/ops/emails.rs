//! Email composition, logging and history.
//!
//! Composing is pure (nothing is persisted); logging is the explicit write
//! step and carries the lastContactedAt side effect.

use std::collections::HashMap;

use chrono::Utc;
use rmcp::schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{CreateEmailLogInput, EmailLogFilter, EmailStatus};
use crate::ops::{self, templates, OpError};
use crate::store::Store;

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposeEmailRequest {
    #[schemars(
        description = "UUID of the template to expand. Optional; subject/body may be supplied directly instead"
    )]
    pub template_id: Option<String>,
    #[schemars(
        description = "UUID of the recipient lead. When it resolves, a recipient snapshot {name, email, company} is attached"
    )]
    pub lead_id: Option<String>,
    #[schemars(description = "Subject used when no template is given; may contain {{placeholders}}")]
    pub subject: Option<String>,
    #[schemars(description = "Body used when no template is given; may contain {{placeholders}}")]
    pub body: Option<String>,
    #[schemars(description = "Placeholder values, matched case-sensitively")]
    pub variables: Option<HashMap<String, String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEmailRequest {
    #[schemars(description = "UUID of the lead the email went to (required)")]
    pub lead_id: Option<String>,
    #[schemars(description = "UUID of the template it was composed from, if any")]
    pub template_id: Option<String>,
    #[schemars(description = "Subject as sent (required)")]
    pub subject: Option<String>,
    #[schemars(description = "Body as sent (required)")]
    pub body: Option<String>,
    #[schemars(description = "Delivery status: draft, sent, delivered or failed. Defaults to sent")]
    pub status: Option<String>,
    #[schemars(description = "RFC3339 send time. Defaults to now")]
    pub sent_at: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailHistoryRequest {
    #[schemars(description = "Only emails for this lead")]
    pub lead_id: Option<String>,
    #[schemars(description = "Page size, default 50")]
    pub limit: Option<u64>,
    #[schemars(description = "1-indexed page number, default 1")]
    pub page: Option<u64>,
}

/// Drafts an email without persisting anything. With a templateId the
/// template must exist; without one, subject/body come from the request
/// directly. Both paths run placeholder interpolation.
pub fn compose_email(store: &dyn Store, req: ComposeEmailRequest) -> Result<Value, OpError> {
    let variables = req.variables.unwrap_or_default();

    let (subject, body) = match req.template_id.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let id = Uuid::parse_str(raw).map_err(|_| OpError::NotFound("Template"))?;
            let template = store.get_template(id)?.ok_or(OpError::NotFound("Template"))?;
            (template.subject, template.body)
        }
        _ => {
            let has_direct = req.subject.as_deref().is_some_and(|s| !s.trim().is_empty())
                || req.body.as_deref().is_some_and(|b| !b.trim().is_empty());
            if !has_direct {
                return Err(OpError::InvalidArgument(
                    "Either templateId or subject/body must be provided".to_string(),
                ));
            }
            (req.subject.unwrap_or_default(), req.body.unwrap_or_default())
        }
    };

    let mut email = json!({
        "subject": templates::interpolate(&subject, &variables),
        "body": templates::interpolate(&body, &variables),
    });

    // leadId is advisory here; attach the snapshot only when it resolves.
    if let Some(id) = ops::filter_id(req.lead_id.as_deref()) {
        if let Some(lead) = store.get_lead(id)? {
            email["recipient"] = json!({
                "name": lead.name,
                "email": lead.email,
                "company": lead.company,
            });
        }
    }

    Ok(json!({ "email": email }))
}

/// Records a sent email and bumps the lead's lastContactedAt to the send
/// time. The lead reference is not enforced; logging against a vanished
/// lead still records the log and the bump silently does nothing.
pub fn log_email(store: &dyn Store, req: LogEmailRequest) -> Result<Value, OpError> {
    let lead_id = ops::require_id(req.lead_id, "leadId", "Lead")?;
    let subject = ops::require(req.subject, "subject")?;
    let body = ops::require(req.body, "body")?;
    let status = match req.status.as_deref() {
        Some(s) => EmailStatus::from_str(s)
            .ok_or_else(|| OpError::InvalidArgument(format!("Invalid status: {s}")))?,
        None => EmailStatus::Sent,
    };
    let sent_at = ops::optional_date(req.sent_at.as_deref(), "sentAt")?.unwrap_or_else(Utc::now);
    let template_id = req
        .template_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());

    let log = store.create_email_log(CreateEmailLogInput {
        lead_id,
        template_id,
        subject,
        body,
        sent_at,
        status,
    })?;
    store.touch_lead(lead_id, sent_at)?;

    Ok(json!({ "emailLog": log }))
}

pub fn get_email_history(store: &dyn Store, req: EmailHistoryRequest) -> Result<Value, OpError> {
    let filter = EmailLogFilter {
        lead_id: ops::filter_id(req.lead_id.as_deref()),
    };
    let emails = store.list_email_logs(&filter)?;
    let (emails, total) = ops::paginate(emails, req.limit, req.page);
    let count = emails.len();
    Ok(json!({ "emails": emails, "count": count, "total": total }))
}
