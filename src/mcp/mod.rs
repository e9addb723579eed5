//! MCP server exposing the lead tracker as tool calls.

use std::sync::Arc;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde_json::Value;

use crate::ops::{self, OpError};
use crate::store::Store;

#[derive(Clone)]
pub struct McpServer {
    store: Arc<dyn Store>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }
}

/// Maps an operation result onto a tool reply. Success and expected domain
/// failures both come back as envelope text so callers can read the
/// message and correct the call; only storage trouble is a protocol error.
fn reply(result: Result<Value, OpError>) -> Result<CallToolResult, McpError> {
    let envelope = match result {
        Ok(payload) => ops::success_envelope(payload),
        Err(OpError::Storage(e)) => {
            tracing::error!("Storage failure: {e:#}");
            return Err(McpError::internal_error(e.to_string(), None));
        }
        Err(err) => ops::error_envelope(&err),
    };

    let json = serde_json::to_string_pretty(&envelope)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Leads
    // ============================================================

    #[tool(
        description = "Create a new sales lead. Required: name, email, company and source (e.g. 'website', 'referral', 'conference'). Optional: phone, title, status, priority, estimatedValue, tags. Status defaults to 'new' and priority to 'medium'. Returns the stored lead with its server-issued id."
    )]
    async fn create_lead(
        &self,
        params: Parameters<ops::leads::CreateLeadRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::create_lead(self.store.as_ref(), params.0))
    }

    #[tool(description = "Fetch a single lead by id, including its notes and tags.")]
    async fn get_lead(
        &self,
        params: Parameters<ops::leads::GetLeadRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::get_lead(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "List leads sorted by priority then newest first. Filter with status, priority and/or source; paginate with limit (default 50) and page (default 1). Returns leads plus count and total."
    )]
    async fn list_leads(
        &self,
        params: Parameters<ops::leads::ListLeadsRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::list_leads(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Update fields on an existing lead. Only the fields you pass change; pass null for phone, title or estimatedValue to clear them. Use this to move a lead through the pipeline by setting status."
    )]
    async fn update_lead(
        &self,
        params: Parameters<ops::leads::UpdateLeadRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::update_lead(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Append a timestamped note to a lead. Notes are kept in order and returned with the lead."
    )]
    async fn add_lead_note(
        &self,
        params: Parameters<ops::leads::AddLeadNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::add_lead_note(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Search leads by name, company or email substring, or by exact tag. Matching is case-insensitive. Returns matches newest first."
    )]
    async fn search_leads(
        &self,
        params: Parameters<ops::leads::SearchLeadsRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::search_leads(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Delete a lead permanently. Emails, meetings and follow-ups that reference it are kept."
    )]
    async fn delete_lead(
        &self,
        params: Parameters<ops::leads::DeleteLeadRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::leads::delete_lead(self.store.as_ref(), params.0))
    }

    // ============================================================
    // Email Templates
    // ============================================================

    #[tool(
        description = "List email templates sorted by name. Filter by category (introduction, follow_up, proposal, reminder, custom); paginate with limit and page."
    )]
    async fn list_email_templates(
        &self,
        params: Parameters<ops::templates::ListTemplatesRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::templates::list_email_templates(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(
        description = "Fetch a single email template by id, including its placeholder variables."
    )]
    async fn get_email_template(
        &self,
        params: Parameters<ops::templates::GetTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::templates::get_email_template(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(
        description = "Create a reusable email template. Required: name, subject, body. Use {{placeholders}} in the subject or body and list them in variables. Category defaults to 'custom'."
    )]
    async fn create_email_template(
        &self,
        params: Parameters<ops::templates::CreateTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::templates::create_email_template(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(description = "Update fields on an email template. Only the fields you pass change.")]
    async fn update_email_template(
        &self,
        params: Parameters<ops::templates::UpdateTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::templates::update_email_template(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(
        description = "Delete an email template permanently. Logged emails that referenced it are kept."
    )]
    async fn delete_email_template(
        &self,
        params: Parameters<ops::templates::DeleteTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::templates::delete_email_template(
            self.store.as_ref(),
            params.0,
        ))
    }

    // ============================================================
    // Emails
    // ============================================================

    #[tool(
        description = "Render an email for a lead. Pass templateId to start from a template, or subject/body directly. {{placeholders}} are filled from variables; unknown placeholders are left untouched so you can spot them. Nothing is sent or stored: follow up with log_email once the mail goes out."
    )]
    async fn compose_email(
        &self,
        params: Parameters<ops::emails::ComposeEmailRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::emails::compose_email(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Record an email that was sent to a lead. Required: leadId, subject, body. Optional: templateId, status (defaults to 'sent') and sentAt (defaults to now). Side effect: updates the lead's lastContactedAt."
    )]
    async fn log_email(
        &self,
        params: Parameters<ops::emails::LogEmailRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::emails::log_email(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "List logged emails, newest first. Filter by leadId; paginate with limit and page."
    )]
    async fn get_email_history(
        &self,
        params: Parameters<ops::emails::EmailHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::emails::get_email_history(self.store.as_ref(), params.0))
    }

    // ============================================================
    // Meetings
    // ============================================================

    #[tool(
        description = "Schedule a meeting with a lead. Required: leadId, title, scheduledAt (RFC 3339). Duration defaults to 30 minutes. Pass createFollowUp=true to also create a preparation task for the same time. Side effect: updates the lead's lastContactedAt."
    )]
    async fn schedule_meeting(
        &self,
        params: Parameters<ops::meetings::ScheduleMeetingRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::meetings::schedule_meeting(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Update fields on a meeting. Set status to completed, cancelled or no_show as things develop, and record an outcome. Pass null for description, location, meetingLink or outcome to clear them."
    )]
    async fn update_meeting(
        &self,
        params: Parameters<ops::meetings::UpdateMeetingRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::meetings::update_meeting(self.store.as_ref(), params.0))
    }

    #[tool(description = "Delete a meeting permanently.")]
    async fn delete_meeting(
        &self,
        params: Parameters<ops::meetings::DeleteMeetingRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::meetings::delete_meeting(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "List meetings in scheduled order. Filter by leadId, status and/or a fromDate/toDate window; paginate with limit and page."
    )]
    async fn list_meetings(
        &self,
        params: Parameters<ops::meetings::ListMeetingsRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::meetings::list_meetings(self.store.as_ref(), params.0))
    }

    // ============================================================
    // Follow-ups
    // ============================================================

    #[tool(
        description = "Create a follow-up reminder for a lead. Required: leadId, type (email, call, meeting or task), scheduledAt, description."
    )]
    async fn create_follow_up(
        &self,
        params: Parameters<ops::follow_ups::CreateFollowUpRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::follow_ups::create_follow_up(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(
        description = "Update fields on a follow-up, including marking it completed (or un-completed, which clears completedAt)."
    )]
    async fn update_follow_up(
        &self,
        params: Parameters<ops::follow_ups::UpdateFollowUpRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::follow_ups::update_follow_up(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(description = "Delete a follow-up permanently.")]
    async fn delete_follow_up(
        &self,
        params: Parameters<ops::follow_ups::DeleteFollowUpRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::follow_ups::delete_follow_up(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(
        description = "Mark a follow-up as completed. Shorthand for update_follow_up with completed=true; records completedAt."
    )]
    async fn complete_follow_up(
        &self,
        params: Parameters<ops::follow_ups::CompleteFollowUpRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::follow_ups::complete_follow_up(
            self.store.as_ref(),
            params.0,
        ))
    }

    #[tool(
        description = "List follow-ups in scheduled order. Filter by leadId, completed and/or fromDate; paginate with limit and page."
    )]
    async fn get_follow_ups(
        &self,
        params: Parameters<ops::follow_ups::GetFollowUpsRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::follow_ups::get_follow_ups(self.store.as_ref(), params.0))
    }

    // ============================================================
    // Reports
    // ============================================================

    #[tool(
        description = "Pipeline report: leads grouped by stage with per-stage counts and value, plus totals and win rate."
    )]
    async fn get_pipeline(&self) -> Result<CallToolResult, McpError> {
        reply(ops::reports::get_pipeline(self.store.as_ref()))
    }

    #[tool(
        description = "Sales activity report over a date window (defaults to the last 30 days): leads and emails per day, counts by status, and revenue from closed-won leads."
    )]
    async fn get_sales_report(
        &self,
        params: Parameters<ops::reports::SalesReportRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::reports::get_sales_report(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Activity summary for one lead: email, meeting, follow-up and note counts, recent emails and upcoming meetings. Fails if the lead does not exist."
    )]
    async fn get_lead_activity(
        &self,
        params: Parameters<ops::reports::LeadActivityRequest>,
    ) -> Result<CallToolResult, McpError> {
        reply(ops::reports::get_lead_activity(self.store.as_ref(), params.0))
    }

    #[tool(
        description = "Dashboard snapshot: pipeline summary, leads by status, next meetings, pending follow-ups and the most recent leads."
    )]
    async fn get_dashboard(&self) -> Result<CallToolResult, McpError> {
        reply(ops::reports::get_dashboard(self.store.as_ref()))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "leadtrack".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"LeadTrack tracks sales leads and the activity around them: emails,
meetings and follow-up reminders.

RESULT FORMAT:
Every tool returns a JSON envelope. Check the `success` flag first:
- {"success": true, ...payload} on success
- {"success": false, "error": "..."} when the request cannot be honored
Unknown ids and invalid arguments come back as envelopes, not protocol
errors, so read the message and correct the call.

IDS AND DATES:
- All ids are UUIDs issued by the server. Never invent one.
- Dates are RFC 3339 timestamps, e.g. 2026-03-01T09:00:00Z.

LEAD LIFECYCLE:
new → contacted → qualified → proposal → negotiation → closed_won / closed_lost
- status moves through the pipeline stages above
- priority is low, medium or high (defaults to medium)
- update_lead changes any field; add_lead_note appends a timestamped note

TYPICAL WORKFLOW:
1. create_lead with name, email, company and source
2. compose_email with a templateId (list_email_templates shows what
   exists) and variables like {"name": "...", "company": "..."}
3. log_email after sending so history and lastContactedAt stay accurate
4. schedule_meeting when the lead bites; pass createFollowUp=true to get
   a preparation reminder alongside the meeting
5. complete_follow_up as reminders are handled
6. update_lead with status closed_won, setting estimatedValue first so
   revenue reports mean something

TEMPLATES:
- Template bodies may contain {{placeholders}}; compose_email fills them
  from the variables you pass and leaves unknown placeholders untouched.
- Seeded defaults cover introduction, follow-up and proposal emails.

REPORTING:
- get_pipeline: leads grouped by stage with totals and win rate
- get_sales_report: activity and revenue over a date window
- get_lead_activity: everything recorded against one lead
- get_dashboard: stats plus upcoming meetings and pending follow-ups

IMPORTANT:
- List tools are paginated: pass limit and page when the defaults
  (50 per page, page 1) are not enough.
- Deletion is permanent and does not cascade; logged activity survives
  its lead."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(store: Arc<dyn Store>) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(store);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
