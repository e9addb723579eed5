use std::collections::HashMap;

use leadtrack::ops::{emails, follow_ups, leads, meetings, reports, templates};
use leadtrack::store::{MemoryStore, Store};
use serde_json::{json, Value};
use speculate2::speculate;
use uuid::Uuid;

fn create_request() -> leads::CreateLeadRequest {
    leads::CreateLeadRequest {
        name: Some("Ada Lovelace".to_string()),
        email: Some("ada@example.com".to_string()),
        company: Some("Analytical Engines".to_string()),
        source: Some("website".to_string()),
        ..Default::default()
    }
}

fn create_lead(store: &dyn Store) -> String {
    let payload = leads::create_lead(store, create_request()).expect("Failed to create lead");
    id_of(&payload["lead"])
}

fn id_of(entity: &Value) -> String {
    entity["id"].as_str().expect("entity id").to_string()
}

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn outreach_template(store: &dyn Store) -> String {
    let payload = templates::create_email_template(
        store,
        templates::CreateTemplateRequest {
            name: Some("Outreach".to_string()),
            subject: Some("Hello {{name}}".to_string()),
            body: Some("Greetings {{name}} of {{company}}. Your goal: {{goal}}".to_string()),
            category: Some("introduction".to_string()),
            variables: Some(vec!["name".to_string(), "company".to_string()]),
        },
    )
    .expect("Failed to create template");
    id_of(&payload["template"])
}

speculate! {
    describe "lead operations" {
        before {
            let store = MemoryStore::new();
        }

        it "applies status and priority defaults" {
            let payload = leads::create_lead(&store, create_request()).expect("Failed");

            assert_eq!(payload["lead"]["status"], "new");
            assert_eq!(payload["lead"]["priority"], "medium");
            assert_eq!(payload["lead"]["tags"], json!([]));
            assert!(payload["lead"]["estimatedValue"].is_null());
        }

        it "names each missing required field" {
            for field in ["name", "email", "company", "source"] {
                let mut req = create_request();
                match field {
                    "name" => req.name = None,
                    "email" => req.email = Some("   ".to_string()),
                    "company" => req.company = None,
                    _ => req.source = None,
                }
                let err = leads::create_lead(&store, req).unwrap_err();
                assert_eq!(err.to_string(), format!("Missing required field: {field}"));
            }
        }

        it "rejects bad enums and negative values" {
            let mut req = create_request();
            req.status = Some("stale".to_string());
            let err = leads::create_lead(&store, req).unwrap_err();
            assert_eq!(err.to_string(), "Invalid status: stale");

            let mut req = create_request();
            req.priority = Some("urgent".to_string());
            let err = leads::create_lead(&store, req).unwrap_err();
            assert_eq!(err.to_string(), "Invalid priority: urgent");

            let mut req = create_request();
            req.estimated_value = Some(-5.0);
            let err = leads::create_lead(&store, req).unwrap_err();
            assert_eq!(err.to_string(), "estimatedValue must be non-negative, got -5");
        }

        it "reads malformed and unknown ids as not found" {
            for raw in ["not-a-uuid", &Uuid::new_v4().to_string()] {
                let err = leads::get_lead(&store, leads::GetLeadRequest {
                    lead_id: Some(raw.to_string()),
                }).unwrap_err();
                assert_eq!(err.to_string(), "Lead not found");
            }
        }

        it "paginates list results" {
            for n in 0..3 {
                let mut req = create_request();
                req.email = Some(format!("lead{n}@example.com"));
                leads::create_lead(&store, req).expect("Failed");
            }

            let page = leads::list_leads(&store, leads::ListLeadsRequest {
                limit: Some(2),
                page: Some(1),
                ..Default::default()
            }).expect("Failed");
            assert_eq!(page["count"], 2);
            assert_eq!(page["total"], 3);

            let rest = leads::list_leads(&store, leads::ListLeadsRequest {
                limit: Some(2),
                page: Some(2),
                ..Default::default()
            }).expect("Failed");
            assert_eq!(rest["count"], 1);
        }

        it "patches fields and clears on explicit null" {
            let mut req = create_request();
            req.estimated_value = Some(50000.0);
            let payload = leads::create_lead(&store, req).expect("Failed");
            let id = id_of(&payload["lead"]);

            let updated = leads::update_lead(&store, leads::UpdateLeadRequest {
                lead_id: Some(id),
                status: Some("qualified".to_string()),
                estimated_value: Some(None),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(updated["lead"]["status"], "qualified");
            assert!(updated["lead"]["estimatedValue"].is_null());
            assert_eq!(updated["lead"]["name"], "Ada Lovelace");
        }

        it "stamps notes with the entry time" {
            let id = create_lead(&store);

            let payload = leads::add_lead_note(&store, leads::AddLeadNoteRequest {
                lead_id: Some(id.clone()),
                note: Some("Asked for pricing".to_string()),
            }).expect("Failed");

            let note = payload["lead"]["notes"][0].as_str().expect("note");
            assert!(note.starts_with('['));
            assert!(note.ends_with("Asked for pricing"));

            let err = leads::add_lead_note(&store, leads::AddLeadNoteRequest {
                lead_id: Some(id),
                note: None,
            }).unwrap_err();
            assert_eq!(err.to_string(), "Missing required field: note");
        }

        it "requires a search query" {
            let err = leads::search_leads(&store, leads::SearchLeadsRequest { query: None })
                .unwrap_err();
            assert_eq!(err.to_string(), "Missing required field: query");
        }

        it "deletes exactly once" {
            let id = create_lead(&store);

            let payload = leads::delete_lead(&store, leads::DeleteLeadRequest {
                lead_id: Some(id.clone()),
            }).expect("Failed");
            assert_eq!(payload["message"], "Lead deleted");

            let err = leads::delete_lead(&store, leads::DeleteLeadRequest {
                lead_id: Some(id),
            }).unwrap_err();
            assert_eq!(err.to_string(), "Lead not found");
        }
    }

    describe "template operations" {
        before {
            let store = MemoryStore::new();
        }

        it "defaults the category to custom" {
            let payload = templates::create_email_template(&store, templates::CreateTemplateRequest {
                name: Some("Plain".to_string()),
                subject: Some("s".to_string()),
                body: Some("b".to_string()),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["template"]["category"], "custom");
        }

        it "rejects unknown categories on create and list" {
            let err = templates::create_email_template(&store, templates::CreateTemplateRequest {
                name: Some("Bad".to_string()),
                subject: Some("s".to_string()),
                body: Some("b".to_string()),
                category: Some("spam".to_string()),
                ..Default::default()
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid category: spam");

            let err = templates::list_email_templates(&store, templates::ListTemplatesRequest {
                category: Some("spam".to_string()),
                ..Default::default()
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid category: spam");
        }

        it "updates and deletes through the catalog" {
            let id = outreach_template(&store);

            let updated = templates::update_email_template(&store, templates::UpdateTemplateRequest {
                template_id: Some(id.clone()),
                subject: Some("Revised".to_string()),
                ..Default::default()
            }).expect("Failed");
            assert_eq!(updated["template"]["subject"], "Revised");

            let deleted = templates::delete_email_template(&store, templates::DeleteTemplateRequest {
                template_id: Some(id.clone()),
            }).expect("Failed");
            assert_eq!(deleted["message"], "Template deleted");

            let err = templates::get_email_template(&store, templates::GetTemplateRequest {
                template_id: Some(id),
            }).unwrap_err();
            assert_eq!(err.to_string(), "Template not found");
        }
    }

    describe "compose_email" {
        before {
            let store = MemoryStore::new();
        }

        it "renders a template and leaves unknown placeholders literal" {
            let template_id = outreach_template(&store);

            let payload = emails::compose_email(&store, emails::ComposeEmailRequest {
                template_id: Some(template_id),
                variables: Some(vars(&[("name", "Ada"), ("company", "Acme")])),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["email"]["subject"], "Hello Ada");
            assert_eq!(
                payload["email"]["body"],
                "Greetings Ada of Acme. Your goal: {{goal}}"
            );
        }

        it "uses direct subject and body without a template" {
            let payload = emails::compose_email(&store, emails::ComposeEmailRequest {
                subject: Some("Quick question".to_string()),
                body: Some("Do you have five minutes?".to_string()),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["email"]["subject"], "Quick question");
            assert!(payload["email"].get("recipient").is_none());
        }

        it "requires either a template or direct content" {
            let err = emails::compose_email(&store, emails::ComposeEmailRequest::default())
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Either templateId or subject/body must be provided"
            );
        }

        it "treats a blank template id as absent" {
            let payload = emails::compose_email(&store, emails::ComposeEmailRequest {
                template_id: Some("   ".to_string()),
                subject: Some("Direct".to_string()),
                body: Some("Body".to_string()),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["email"]["subject"], "Direct");
        }

        it "reads malformed and unknown template ids as not found" {
            for raw in ["garbage", &Uuid::new_v4().to_string()] {
                let err = emails::compose_email(&store, emails::ComposeEmailRequest {
                    template_id: Some(raw.to_string()),
                    ..Default::default()
                }).unwrap_err();
                assert_eq!(err.to_string(), "Template not found");
            }
        }

        it "attaches a recipient snapshot when the lead resolves" {
            let lead_id = create_lead(&store);

            let payload = emails::compose_email(&store, emails::ComposeEmailRequest {
                subject: Some("Hi".to_string()),
                body: Some("Hello".to_string()),
                lead_id: Some(lead_id),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["email"]["recipient"]["name"], "Ada Lovelace");
            assert_eq!(payload["email"]["recipient"]["email"], "ada@example.com");
            assert_eq!(payload["email"]["recipient"]["company"], "Analytical Engines");

            let unresolved = emails::compose_email(&store, emails::ComposeEmailRequest {
                subject: Some("Hi".to_string()),
                body: Some("Hello".to_string()),
                lead_id: Some("garbage".to_string()),
                ..Default::default()
            }).expect("Failed");
            assert!(unresolved["email"].get("recipient").is_none());
        }
    }

    describe "log_email" {
        before {
            let store = MemoryStore::new();
        }

        it "defaults status to sent and stamps a send time" {
            let lead_id = create_lead(&store);

            let payload = emails::log_email(&store, emails::LogEmailRequest {
                lead_id: Some(lead_id),
                subject: Some("Intro".to_string()),
                body: Some("Hello".to_string()),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["emailLog"]["status"], "sent");
            assert!(!payload["emailLog"]["sentAt"].is_null());
        }

        it "bumps the lead's last contact to the send time" {
            let lead_id = create_lead(&store);

            emails::log_email(&store, emails::LogEmailRequest {
                lead_id: Some(lead_id.clone()),
                subject: Some("Intro".to_string()),
                body: Some("Hello".to_string()),
                sent_at: Some("2026-03-01T09:00:00Z".to_string()),
                ..Default::default()
            }).expect("Failed");

            let payload = leads::get_lead(&store, leads::GetLeadRequest {
                lead_id: Some(lead_id),
            }).expect("Failed");
            assert_eq!(payload["lead"]["lastContactedAt"], "2026-03-01T09:00:00Z");
        }

        it "rejects a malformed send time" {
            let lead_id = create_lead(&store);

            let err = emails::log_email(&store, emails::LogEmailRequest {
                lead_id: Some(lead_id),
                subject: Some("Intro".to_string()),
                body: Some("Hello".to_string()),
                sent_at: Some("yesterday".to_string()),
                ..Default::default()
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid date for sentAt: yesterday");
        }

        it "records the log even when the lead is gone" {
            let payload = emails::log_email(&store, emails::LogEmailRequest {
                lead_id: Some(Uuid::new_v4().to_string()),
                subject: Some("Orphan".to_string()),
                body: Some("Hello".to_string()),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["emailLog"]["subject"], "Orphan");
        }
    }

    describe "schedule_meeting" {
        before {
            let store = MemoryStore::new();
        }

        it "defaults the duration and touches the lead" {
            let lead_id = create_lead(&store);

            let payload = meetings::schedule_meeting(&store, meetings::ScheduleMeetingRequest {
                lead_id: Some(lead_id.clone()),
                title: Some("Demo".to_string()),
                scheduled_at: Some("2026-03-01T10:00:00Z".to_string()),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["meeting"]["duration"], 30);
            assert_eq!(payload["meeting"]["status"], "scheduled");
            assert!(payload.get("followUp").is_none());

            let lead = leads::get_lead(&store, leads::GetLeadRequest {
                lead_id: Some(lead_id),
            }).expect("Failed");
            assert!(!lead["lead"]["lastContactedAt"].is_null());
        }

        it "optionally spawns a preparation follow-up" {
            let lead_id = create_lead(&store);

            let payload = meetings::schedule_meeting(&store, meetings::ScheduleMeetingRequest {
                lead_id: Some(lead_id),
                title: Some("Demo".to_string()),
                scheduled_at: Some("2026-03-01T10:00:00Z".to_string()),
                create_follow_up: Some(true),
                ..Default::default()
            }).expect("Failed");

            assert_eq!(payload["followUp"]["type"], "task");
            assert_eq!(payload["followUp"]["description"], "Prepare for meeting: Demo");
            assert_eq!(payload["followUp"]["scheduledAt"], payload["meeting"]["scheduledAt"]);
        }

        it "rejects a malformed start time" {
            let lead_id = create_lead(&store);

            let err = meetings::schedule_meeting(&store, meetings::ScheduleMeetingRequest {
                lead_id: Some(lead_id),
                title: Some("Demo".to_string()),
                scheduled_at: Some("tomorrow".to_string()),
                ..Default::default()
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid date for scheduledAt: tomorrow");
        }

        it "updates status and deletes exactly once" {
            let lead_id = create_lead(&store);
            let payload = meetings::schedule_meeting(&store, meetings::ScheduleMeetingRequest {
                lead_id: Some(lead_id),
                title: Some("Demo".to_string()),
                scheduled_at: Some("2026-03-01T10:00:00Z".to_string()),
                ..Default::default()
            }).expect("Failed");
            let meeting_id = id_of(&payload["meeting"]);

            let err = meetings::update_meeting(&store, meetings::UpdateMeetingRequest {
                meeting_id: Some(meeting_id.clone()),
                status: Some("sometime".to_string()),
                ..Default::default()
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid status: sometime");

            let updated = meetings::update_meeting(&store, meetings::UpdateMeetingRequest {
                meeting_id: Some(meeting_id.clone()),
                status: Some("completed".to_string()),
                ..Default::default()
            }).expect("Failed");
            assert_eq!(updated["meeting"]["status"], "completed");

            let deleted = meetings::delete_meeting(&store, meetings::DeleteMeetingRequest {
                meeting_id: Some(meeting_id.clone()),
            }).expect("Failed");
            assert_eq!(deleted["message"], "Meeting deleted");

            let err = meetings::delete_meeting(&store, meetings::DeleteMeetingRequest {
                meeting_id: Some(meeting_id),
            }).unwrap_err();
            assert_eq!(err.to_string(), "Meeting not found");
        }
    }

    describe "follow-up operations" {
        before {
            let store = MemoryStore::new();
            let lead_id = create_lead(&store);
        }

        it "requires a known action type" {
            let err = follow_ups::create_follow_up(&store, follow_ups::CreateFollowUpRequest {
                lead_id: Some(lead_id),
                follow_up_type: Some("fax".to_string()),
                scheduled_at: Some("2026-04-01T09:00:00Z".to_string()),
                description: Some("Check in".to_string()),
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid type: fax");
        }

        it "completes through the shorthand" {
            let payload = follow_ups::create_follow_up(&store, follow_ups::CreateFollowUpRequest {
                lead_id: Some(lead_id),
                follow_up_type: Some("call".to_string()),
                scheduled_at: Some("2026-04-01T09:00:00Z".to_string()),
                description: Some("Check in".to_string()),
            }).expect("Failed");
            let follow_up_id = id_of(&payload["followUp"]);
            assert_eq!(payload["followUp"]["completed"], false);

            let done = follow_ups::complete_follow_up(&store, follow_ups::CompleteFollowUpRequest {
                follow_up_id: Some(follow_up_id),
            }).expect("Failed");
            assert_eq!(done["followUp"]["completed"], true);
            assert!(!done["followUp"]["completedAt"].is_null());
        }

        it "filters by completion" {
            for day in ["2026-04-01T09:00:00Z", "2026-04-03T09:00:00Z"] {
                follow_ups::create_follow_up(&store, follow_ups::CreateFollowUpRequest {
                    lead_id: Some(lead_id.clone()),
                    follow_up_type: Some("email".to_string()),
                    scheduled_at: Some(day.to_string()),
                    description: Some("Check in".to_string()),
                }).expect("Failed");
            }
            let listed = follow_ups::get_follow_ups(&store, follow_ups::GetFollowUpsRequest {
                completed: Some(false),
                ..Default::default()
            }).expect("Failed");
            assert_eq!(listed["count"], 2);

            let first = id_of(&listed["followUps"][0]);
            follow_ups::complete_follow_up(&store, follow_ups::CompleteFollowUpRequest {
                follow_up_id: Some(first),
            }).expect("Failed");

            let pending = follow_ups::get_follow_ups(&store, follow_ups::GetFollowUpsRequest {
                completed: Some(false),
                ..Default::default()
            }).expect("Failed");
            assert_eq!(pending["count"], 1);
        }

        it "deletes exactly once" {
            let payload = follow_ups::create_follow_up(&store, follow_ups::CreateFollowUpRequest {
                lead_id: Some(lead_id),
                follow_up_type: Some("task".to_string()),
                scheduled_at: Some("2026-04-01T09:00:00Z".to_string()),
                description: Some("Send deck".to_string()),
            }).expect("Failed");
            let follow_up_id = id_of(&payload["followUp"]);

            let deleted = follow_ups::delete_follow_up(&store, follow_ups::DeleteFollowUpRequest {
                follow_up_id: Some(follow_up_id.clone()),
            }).expect("Failed");
            assert_eq!(deleted["message"], "Follow-up deleted");

            let err = follow_ups::delete_follow_up(&store, follow_ups::DeleteFollowUpRequest {
                follow_up_id: Some(follow_up_id),
            }).unwrap_err();
            assert_eq!(err.to_string(), "Follow-up not found");
        }
    }

    describe "report operations" {
        before {
            let store = MemoryStore::new();
        }

        it "reports every pipeline stage with summary totals" {
            let mut won = create_request();
            won.status = Some("closed_won".to_string());
            won.estimated_value = Some(10000.0);
            leads::create_lead(&store, won).expect("Failed");

            let mut open = create_request();
            open.email = Some("grace@example.com".to_string());
            open.estimated_value = Some(5000.0);
            leads::create_lead(&store, open).expect("Failed");

            let payload = reports::get_pipeline(&store).expect("Failed");

            let stages = payload["pipeline"].as_object().expect("pipeline object");
            assert_eq!(stages.len(), 7);
            assert_eq!(payload["pipeline"]["new"]["count"], 1);
            assert_eq!(payload["pipeline"]["closed_won"]["value"], 10000.0);
            assert_eq!(payload["pipeline"]["contacted"]["count"], 0);

            assert_eq!(payload["summary"]["totalLeads"], 2);
            assert_eq!(payload["summary"]["activeLeads"], 1);
            assert_eq!(payload["summary"]["totalPipelineValue"], 15000.0);
            assert_eq!(payload["summary"]["winRate"], "100.0%");
        }

        it "moves pipeline counts when a lead changes stage" {
            let lead_id = create_lead(&store);
            leads::add_lead_note(&store, leads::AddLeadNoteRequest {
                lead_id: Some(lead_id.clone()),
                note: Some("Called, interested".to_string()),
            }).expect("Failed");
            leads::update_lead(&store, leads::UpdateLeadRequest {
                lead_id: Some(lead_id),
                status: Some("qualified".to_string()),
                ..Default::default()
            }).expect("Failed");

            let payload = reports::get_pipeline(&store).expect("Failed");
            assert_eq!(payload["pipeline"]["new"]["count"], 0);
            assert_eq!(payload["pipeline"]["qualified"]["count"], 1);
        }

        it "returns an all-zero sales report for an empty window" {
            let payload = reports::get_sales_report(&store, reports::SalesReportRequest::default())
                .expect("Failed");

            let by_status = payload["report"]["leadsByStatus"].as_object().expect("status map");
            assert_eq!(by_status.len(), 7);
            assert!(by_status.values().all(|count| count.as_u64() == Some(0)));
            assert_eq!(payload["report"]["emailsSent"], 0);
            assert_eq!(payload["report"]["meetingsScheduled"], 0);
            assert!(payload["report"]["leadsByDay"].as_object().expect("days").is_empty());
            assert_eq!(payload["report"]["revenue"]["total"], 0.0);
            assert_eq!(payload["report"]["revenue"]["averageDealSize"], 0.0);
            assert_eq!(payload["report"]["revenue"]["winRate"], "0");
        }

        it "windows the sales report" {
            create_lead(&store);

            let payload = reports::get_sales_report(&store, reports::SalesReportRequest {
                from_date: Some("2020-01-01T00:00:00Z".to_string()),
                to_date: None,
            }).expect("Failed");

            assert_eq!(payload["report"]["period"]["from"], "2020-01-01T00:00:00Z");
            assert_eq!(payload["report"]["leadsByStatus"]["new"], 1);
            assert_eq!(payload["report"]["emailsSent"], 0);
            assert_eq!(payload["report"]["revenue"]["total"], 0.0);
            assert_eq!(payload["report"]["revenue"]["winRate"], "0");

            let err = reports::get_sales_report(&store, reports::SalesReportRequest {
                from_date: Some("last month".to_string()),
                to_date: None,
            }).unwrap_err();
            assert_eq!(err.to_string(), "Invalid date for fromDate: last month");
        }

        it "summarizes activity for one lead" {
            let lead_id = create_lead(&store);

            emails::log_email(&store, emails::LogEmailRequest {
                lead_id: Some(lead_id.clone()),
                subject: Some("Intro".to_string()),
                body: Some("Hello".to_string()),
                ..Default::default()
            }).expect("Failed");
            leads::add_lead_note(&store, leads::AddLeadNoteRequest {
                lead_id: Some(lead_id.clone()),
                note: Some("Asked for pricing".to_string()),
            }).expect("Failed");
            meetings::schedule_meeting(&store, meetings::ScheduleMeetingRequest {
                lead_id: Some(lead_id.clone()),
                title: Some("Demo".to_string()),
                scheduled_at: Some("2030-01-01T10:00:00Z".to_string()),
                ..Default::default()
            }).expect("Failed");

            let payload = reports::get_lead_activity(&store, reports::LeadActivityRequest {
                lead_id: Some(lead_id),
            }).expect("Failed");

            assert_eq!(payload["activity"]["summary"]["emails"], 1);
            assert_eq!(payload["activity"]["summary"]["meetings"], 1);
            assert_eq!(payload["activity"]["summary"]["notes"], 1);
            assert_eq!(payload["activity"]["summary"]["pendingFollowUps"], 0);
            assert!(!payload["activity"]["summary"]["lastContactedAt"].is_null());
            assert_eq!(payload["activity"]["recentEmails"].as_array().expect("emails").len(), 1);
            assert_eq!(payload["activity"]["upcomingMeetings"].as_array().expect("meetings").len(), 1);

            let err = reports::get_lead_activity(&store, reports::LeadActivityRequest {
                lead_id: Some(Uuid::new_v4().to_string()),
            }).unwrap_err();
            assert_eq!(err.to_string(), "Lead not found");
        }

        it "snapshots the dashboard" {
            create_lead(&store);

            let payload = reports::get_dashboard(&store).expect("Failed");

            assert_eq!(payload["dashboard"]["summary"]["totalLeads"], 1);
            assert_eq!(payload["dashboard"]["leadsByStatus"]["new"], 1);
            assert_eq!(payload["dashboard"]["recentLeads"].as_array().expect("leads").len(), 1);
            assert!(payload["dashboard"]["upcomingMeetings"].as_array().expect("meetings").is_empty());
            assert!(payload["dashboard"]["pendingFollowUps"].as_array().expect("follow-ups").is_empty());
        }
    }

    describe "patch deserialization" {
        it "distinguishes absent fields from explicit nulls" {
            let cleared: leads::UpdateLeadRequest =
                serde_json::from_value(json!({"phone": null})).expect("Failed to parse");
            assert_eq!(cleared.phone, Some(None));

            let untouched: leads::UpdateLeadRequest =
                serde_json::from_value(json!({})).expect("Failed to parse");
            assert_eq!(untouched.phone, None);
        }
    }
}
