use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::args::MergedArgs;
use crate::ops::{self, OpError};
use crate::store::Store;

type SharedStore = Arc<dyn Store>;

// ============================================================
// Response Envelope
// ============================================================

/// Maps an operation result onto the wire. Success and expected domain
/// failures (unknown ids, bad arguments) are both HTTP 200 envelopes so
/// clients branch on the `success` flag; only storage trouble surfaces
/// as a 500.
fn respond(result: Result<Value, OpError>) -> (StatusCode, Json<Value>) {
    match result {
        Ok(payload) => (StatusCode::OK, Json(ops::success_envelope(payload))),
        Err(err) => {
            let status = match &err {
                OpError::Storage(e) => {
                    tracing::error!("Storage failure: {e:#}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::OK,
            };
            (status, Json(ops::error_envelope(&err)))
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(store): State<SharedStore>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "backend": store.backend() }))
}

// ============================================================
// Leads
// ============================================================

pub async fn create_lead(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::CreateLeadRequest>,
) -> impl IntoResponse {
    respond(ops::leads::create_lead(store.as_ref(), req))
}

pub async fn get_lead(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::GetLeadRequest>,
) -> impl IntoResponse {
    respond(ops::leads::get_lead(store.as_ref(), req))
}

pub async fn list_leads(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::ListLeadsRequest>,
) -> impl IntoResponse {
    respond(ops::leads::list_leads(store.as_ref(), req))
}

pub async fn update_lead(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::UpdateLeadRequest>,
) -> impl IntoResponse {
    respond(ops::leads::update_lead(store.as_ref(), req))
}

pub async fn add_lead_note(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::AddLeadNoteRequest>,
) -> impl IntoResponse {
    respond(ops::leads::add_lead_note(store.as_ref(), req))
}

pub async fn search_leads(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::SearchLeadsRequest>,
) -> impl IntoResponse {
    respond(ops::leads::search_leads(store.as_ref(), req))
}

pub async fn delete_lead(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::leads::DeleteLeadRequest>,
) -> impl IntoResponse {
    respond(ops::leads::delete_lead(store.as_ref(), req))
}

// ============================================================
// Email Templates
// ============================================================

pub async fn list_email_templates(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::templates::ListTemplatesRequest>,
) -> impl IntoResponse {
    respond(ops::templates::list_email_templates(store.as_ref(), req))
}

pub async fn get_email_template(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::templates::GetTemplateRequest>,
) -> impl IntoResponse {
    respond(ops::templates::get_email_template(store.as_ref(), req))
}

pub async fn create_email_template(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::templates::CreateTemplateRequest>,
) -> impl IntoResponse {
    respond(ops::templates::create_email_template(store.as_ref(), req))
}

pub async fn update_email_template(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::templates::UpdateTemplateRequest>,
) -> impl IntoResponse {
    respond(ops::templates::update_email_template(store.as_ref(), req))
}

pub async fn delete_email_template(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::templates::DeleteTemplateRequest>,
) -> impl IntoResponse {
    respond(ops::templates::delete_email_template(store.as_ref(), req))
}

// ============================================================
// Emails
// ============================================================

pub async fn compose_email(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::emails::ComposeEmailRequest>,
) -> impl IntoResponse {
    respond(ops::emails::compose_email(store.as_ref(), req))
}

pub async fn log_email(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::emails::LogEmailRequest>,
) -> impl IntoResponse {
    respond(ops::emails::log_email(store.as_ref(), req))
}

pub async fn get_email_history(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::emails::EmailHistoryRequest>,
) -> impl IntoResponse {
    respond(ops::emails::get_email_history(store.as_ref(), req))
}

// ============================================================
// Meetings
// ============================================================

pub async fn schedule_meeting(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::meetings::ScheduleMeetingRequest>,
) -> impl IntoResponse {
    respond(ops::meetings::schedule_meeting(store.as_ref(), req))
}

pub async fn update_meeting(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::meetings::UpdateMeetingRequest>,
) -> impl IntoResponse {
    respond(ops::meetings::update_meeting(store.as_ref(), req))
}

pub async fn delete_meeting(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::meetings::DeleteMeetingRequest>,
) -> impl IntoResponse {
    respond(ops::meetings::delete_meeting(store.as_ref(), req))
}

pub async fn list_meetings(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::meetings::ListMeetingsRequest>,
) -> impl IntoResponse {
    respond(ops::meetings::list_meetings(store.as_ref(), req))
}

// ============================================================
// Follow-ups
// ============================================================

pub async fn create_follow_up(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::follow_ups::CreateFollowUpRequest>,
) -> impl IntoResponse {
    respond(ops::follow_ups::create_follow_up(store.as_ref(), req))
}

pub async fn update_follow_up(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::follow_ups::UpdateFollowUpRequest>,
) -> impl IntoResponse {
    respond(ops::follow_ups::update_follow_up(store.as_ref(), req))
}

pub async fn delete_follow_up(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::follow_ups::DeleteFollowUpRequest>,
) -> impl IntoResponse {
    respond(ops::follow_ups::delete_follow_up(store.as_ref(), req))
}

pub async fn complete_follow_up(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::follow_ups::CompleteFollowUpRequest>,
) -> impl IntoResponse {
    respond(ops::follow_ups::complete_follow_up(store.as_ref(), req))
}

pub async fn get_follow_ups(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::follow_ups::GetFollowUpsRequest>,
) -> impl IntoResponse {
    respond(ops::follow_ups::get_follow_ups(store.as_ref(), req))
}

// ============================================================
// Reports
// ============================================================

pub async fn get_pipeline(State(store): State<SharedStore>) -> impl IntoResponse {
    respond(ops::reports::get_pipeline(store.as_ref()))
}

pub async fn get_sales_report(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::reports::SalesReportRequest>,
) -> impl IntoResponse {
    respond(ops::reports::get_sales_report(store.as_ref(), req))
}

pub async fn get_lead_activity(
    State(store): State<SharedStore>,
    MergedArgs(req): MergedArgs<ops::reports::LeadActivityRequest>,
) -> impl IntoResponse {
    respond(ops::reports::get_lead_activity(store.as_ref(), req))
}

pub async fn get_dashboard(State(store): State<SharedStore>) -> impl IntoResponse {
    respond(ops::reports::get_dashboard(store.as_ref()))
}
