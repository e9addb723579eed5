use chrono::{TimeZone, Utc};
use leadtrack::models::*;
use leadtrack::store::{self, JsonStore, MemoryStore, SqliteStore, Store};
use speculate2::speculate;
use uuid::Uuid;

fn lead_input(name: &str, company: &str, email: &str) -> CreateLeadInput {
    CreateLeadInput {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        company: company.to_string(),
        title: None,
        status: LeadStatus::New,
        source: "website".to_string(),
        estimated_value: None,
        priority: Priority::Medium,
        tags: Vec::new(),
    }
}

fn create_test_lead(store: &dyn Store) -> Lead {
    store
        .create_lead(lead_input(
            "Ada Lovelace",
            "Analytical Engines",
            "ada@example.com",
        ))
        .expect("Failed to create lead")
}

fn meeting_input(lead_id: Uuid, title: &str, scheduled_at: chrono::DateTime<Utc>) -> CreateMeetingInput {
    CreateMeetingInput {
        lead_id,
        title: title.to_string(),
        description: None,
        scheduled_at,
        duration: 30,
        location: None,
        meeting_link: None,
    }
}

fn follow_up_input(lead_id: Uuid, scheduled_at: chrono::DateTime<Utc>) -> CreateFollowUpInput {
    CreateFollowUpInput {
        lead_id,
        follow_up_type: FollowUpType::Call,
        scheduled_at,
        description: "Check in".to_string(),
    }
}

fn at(y: i32, mo: u32, d: u32, h: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
}

// Ordering assertions need distinct creation timestamps.
fn tick() {
    std::thread::sleep(std::time::Duration::from_millis(5));
}

speculate! {
    describe "sqlite" {
        before {
            let store = SqliteStore::open_memory().expect("Failed to create in-memory database");
            store.migrate().expect("Failed to run migrations");
        }

        describe "leads" {
            describe "create_lead" {
                it "stores the lead and stamps server fields" {
                    let mut input = lead_input("Ada Lovelace", "Analytical Engines", "ada@example.com");
                    input.estimated_value = Some(50000.0);
                    input.tags = vec!["enterprise".to_string()];

                    let lead = store.create_lead(input).expect("Failed to create lead");

                    assert_eq!(lead.name, "Ada Lovelace");
                    assert_eq!(lead.status, LeadStatus::New);
                    assert_eq!(lead.priority, Priority::Medium);
                    assert_eq!(lead.estimated_value, Some(50000.0));
                    assert_eq!(lead.tags, vec!["enterprise".to_string()]);
                    assert!(lead.notes.is_empty());
                    assert!(lead.last_contacted_at.is_none());
                    assert_eq!(lead.created_at, lead.updated_at);
                }
            }

            describe "get_lead" {
                it "returns None for an unknown id" {
                    let found = store.get_lead(Uuid::new_v4()).expect("Query failed");
                    assert!(found.is_none());
                }

                it "round-trips a stored lead" {
                    let created = create_test_lead(&store);
                    let found = store.get_lead(created.id).expect("Query failed").expect("Missing lead");

                    assert_eq!(found.id, created.id);
                    assert_eq!(found.name, "Ada Lovelace");
                    assert_eq!(found.company, "Analytical Engines");
                    assert_eq!(found.status, LeadStatus::New);
                }
            }

            describe "list_leads" {
                it "sorts by priority then newest first" {
                    let mut low = lead_input("Low", "A", "low@example.com");
                    low.priority = Priority::Low;
                    store.create_lead(low).expect("Failed");
                    tick();

                    let mut high_old = lead_input("High Old", "B", "ho@example.com");
                    high_old.priority = Priority::High;
                    store.create_lead(high_old).expect("Failed");
                    tick();

                    let mut high_new = lead_input("High New", "C", "hn@example.com");
                    high_new.priority = Priority::High;
                    store.create_lead(high_new).expect("Failed");

                    let leads = store.list_leads(&LeadFilter::default()).expect("Query failed");
                    let names: Vec<&str> = leads.iter().map(|l| l.name.as_str()).collect();
                    assert_eq!(names, vec!["High New", "High Old", "Low"]);
                }

                it "applies status, priority and source filters conjunctively" {
                    let mut a = lead_input("Match", "A", "a@example.com");
                    a.status = LeadStatus::Qualified;
                    a.priority = Priority::High;
                    a.source = "referral".to_string();
                    store.create_lead(a).expect("Failed");

                    let mut b = lead_input("Wrong Priority", "B", "b@example.com");
                    b.status = LeadStatus::Qualified;
                    b.source = "referral".to_string();
                    store.create_lead(b).expect("Failed");

                    let mut c = lead_input("Wrong Source", "C", "c@example.com");
                    c.status = LeadStatus::Qualified;
                    c.priority = Priority::High;
                    store.create_lead(c).expect("Failed");

                    let leads = store.list_leads(&LeadFilter {
                        status: Some(LeadStatus::Qualified),
                        priority: Some(Priority::High),
                        source: Some("referral".to_string()),
                    }).expect("Query failed");

                    assert_eq!(leads.len(), 1);
                    assert_eq!(leads[0].name, "Match");
                }
            }

            describe "search_leads" {
                it "matches name, company and email substrings case-insensitively" {
                    create_test_lead(&store);

                    for query in ["lovelace", "ANALYTICAL", "ada@"] {
                        let hits = store.search_leads(query).expect("Query failed");
                        assert_eq!(hits.len(), 1, "query {:?} should match", query);
                    }
                    assert!(store.search_leads("babbage").expect("Query failed").is_empty());
                }

                it "matches tags whole, not by substring" {
                    let mut input = lead_input("Ada Lovelace", "Analytical Engines", "ada@example.com");
                    input.tags = vec!["vip".to_string()];
                    store.create_lead(input).expect("Failed");

                    assert_eq!(store.search_leads("vip").expect("Query failed").len(), 1);
                    assert!(store.search_leads("vi").expect("Query failed").is_empty());
                }

                it "returns matches newest first" {
                    store.create_lead(lead_input("Acme One", "Acme", "one@acme.test")).expect("Failed");
                    tick();
                    store.create_lead(lead_input("Acme Two", "Acme", "two@acme.test")).expect("Failed");

                    let hits = store.search_leads("acme").expect("Query failed");
                    assert_eq!(hits[0].name, "Acme Two");
                    assert_eq!(hits[1].name, "Acme One");
                }
            }

            describe "update_lead" {
                it "patches only the provided fields" {
                    let lead = create_test_lead(&store);

                    let updated = store.update_lead(lead.id, UpdateLeadInput {
                        status: Some(LeadStatus::Qualified),
                        estimated_value: Some(Some(75000.0)),
                        ..Default::default()
                    }).expect("Update failed").expect("Missing lead");

                    assert_eq!(updated.status, LeadStatus::Qualified);
                    assert_eq!(updated.estimated_value, Some(75000.0));
                    assert_eq!(updated.name, "Ada Lovelace");
                    assert_eq!(updated.source, "website");
                }

                it "clears double-option fields on explicit null" {
                    let mut input = lead_input("Ada Lovelace", "Analytical Engines", "ada@example.com");
                    input.phone = Some("555-0100".to_string());
                    input.title = Some("Countess".to_string());
                    let lead = store.create_lead(input).expect("Failed");

                    let updated = store.update_lead(lead.id, UpdateLeadInput {
                        phone: Some(None),
                        ..Default::default()
                    }).expect("Update failed").expect("Missing lead");

                    assert!(updated.phone.is_none());
                    assert_eq!(updated.title.as_deref(), Some("Countess"));
                }

                it "bumps updated_at and keeps created_at" {
                    let lead = create_test_lead(&store);
                    let before = store.get_lead(lead.id).expect("Query failed").expect("Missing lead");
                    tick();

                    let updated = store.update_lead(lead.id, UpdateLeadInput {
                        company: Some("Engines Ltd".to_string()),
                        ..Default::default()
                    }).expect("Update failed").expect("Missing lead");

                    assert!(updated.updated_at > before.updated_at);
                    assert_eq!(updated.created_at, before.created_at);
                }

                it "returns None for an unknown lead" {
                    let result = store.update_lead(Uuid::new_v4(), UpdateLeadInput::default())
                        .expect("Update failed");
                    assert!(result.is_none());
                }
            }

            describe "add_lead_note" {
                it "appends entries in order" {
                    let lead = create_test_lead(&store);

                    store.add_lead_note(lead.id, "[2026-01-01T00:00:00Z] first".to_string())
                        .expect("Failed");
                    let updated = store.add_lead_note(lead.id, "[2026-01-02T00:00:00Z] second".to_string())
                        .expect("Failed").expect("Missing lead");

                    assert_eq!(updated.notes.len(), 2);
                    assert!(updated.notes[0].ends_with("first"));
                    assert!(updated.notes[1].ends_with("second"));
                }
            }

            describe "touch_lead" {
                it "sets last_contacted_at and updated_at" {
                    let lead = create_test_lead(&store);
                    let contacted = at(2026, 2, 1, 12);

                    store.touch_lead(lead.id, contacted).expect("Touch failed");

                    let found = store.get_lead(lead.id).expect("Query failed").expect("Missing lead");
                    assert_eq!(found.last_contacted_at, Some(contacted));
                    assert_eq!(found.updated_at, contacted);
                }

                it "is a no-op for an unknown lead" {
                    store.touch_lead(Uuid::new_v4(), Utc::now()).expect("Touch failed");
                }
            }

            describe "delete_lead" {
                it "removes the lead and reports whether it existed" {
                    let lead = create_test_lead(&store);

                    assert!(store.delete_lead(lead.id).expect("Delete failed"));
                    assert!(store.get_lead(lead.id).expect("Query failed").is_none());
                    assert!(!store.delete_lead(lead.id).expect("Delete failed"));
                }

                it "leaves dependent records orphaned" {
                    let lead = create_test_lead(&store);
                    store.create_email_log(CreateEmailLogInput {
                        lead_id: lead.id,
                        template_id: None,
                        subject: "Hello".to_string(),
                        body: "Hi".to_string(),
                        sent_at: Utc::now(),
                        status: EmailStatus::Sent,
                    }).expect("Failed to log email");

                    store.delete_lead(lead.id).expect("Delete failed");

                    let logs = store.list_email_logs(&EmailLogFilter { lead_id: Some(lead.id) })
                        .expect("Query failed");
                    assert_eq!(logs.len(), 1);
                }
            }
        }

        describe "templates" {
            it "creates and fetches a template with variables" {
                let template = store.create_template(CreateTemplateInput {
                    name: "Welcome".to_string(),
                    subject: "Hi {{name}}".to_string(),
                    body: "Welcome aboard, {{name}}!".to_string(),
                    category: TemplateCategory::Introduction,
                    variables: vec!["name".to_string()],
                }).expect("Failed to create template");

                let found = store.get_template(template.id).expect("Query failed").expect("Missing");
                assert_eq!(found.name, "Welcome");
                assert_eq!(found.category, TemplateCategory::Introduction);
                assert_eq!(found.variables, vec!["name".to_string()]);
            }

            it "lists templates sorted by name and filters by category" {
                for (name, category) in [
                    ("Zulu", TemplateCategory::Custom),
                    ("Alpha", TemplateCategory::Introduction),
                    ("Mike", TemplateCategory::Introduction),
                ] {
                    store.create_template(CreateTemplateInput {
                        name: name.to_string(),
                        subject: "s".to_string(),
                        body: "b".to_string(),
                        category,
                        variables: Vec::new(),
                    }).expect("Failed");
                }

                let all = store.list_templates(None).expect("Query failed");
                let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
                assert_eq!(names, vec!["Alpha", "Mike", "Zulu"]);

                let intros = store.list_templates(Some(TemplateCategory::Introduction))
                    .expect("Query failed");
                assert_eq!(intros.len(), 2);
            }

            it "patches and deletes templates" {
                let template = store.create_template(CreateTemplateInput {
                    name: "Draft".to_string(),
                    subject: "old".to_string(),
                    body: "old".to_string(),
                    category: TemplateCategory::Custom,
                    variables: Vec::new(),
                }).expect("Failed");

                let updated = store.update_template(template.id, UpdateTemplateInput {
                    subject: Some("new".to_string()),
                    ..Default::default()
                }).expect("Update failed").expect("Missing");
                assert_eq!(updated.subject, "new");
                assert_eq!(updated.body, "old");

                assert!(store.delete_template(template.id).expect("Delete failed"));
                assert!(store.get_template(template.id).expect("Query failed").is_none());
            }
        }

        describe "email_logs" {
            it "lists logs newest first, filtered by lead" {
                let lead = create_test_lead(&store);
                let other = store.create_lead(lead_input("Other", "Elsewhere", "o@example.com"))
                    .expect("Failed");

                for (lead_id, subject, sent_at) in [
                    (lead.id, "first", at(2026, 1, 1, 9)),
                    (lead.id, "second", at(2026, 1, 2, 9)),
                    (other.id, "unrelated", at(2026, 1, 3, 9)),
                ] {
                    store.create_email_log(CreateEmailLogInput {
                        lead_id,
                        template_id: None,
                        subject: subject.to_string(),
                        body: "b".to_string(),
                        sent_at,
                        status: EmailStatus::Sent,
                    }).expect("Failed");
                }

                let logs = store.list_email_logs(&EmailLogFilter { lead_id: Some(lead.id) })
                    .expect("Query failed");
                let subjects: Vec<&str> = logs.iter().map(|l| l.subject.as_str()).collect();
                assert_eq!(subjects, vec!["second", "first"]);
            }
        }

        describe "meetings" {
            it "new meetings start scheduled and list in time order" {
                let lead = create_test_lead(&store);
                store.create_meeting(meeting_input(lead.id, "Later", at(2026, 3, 2, 10)))
                    .expect("Failed");
                let first = store.create_meeting(meeting_input(lead.id, "Sooner", at(2026, 3, 1, 10)))
                    .expect("Failed");

                assert_eq!(first.status, MeetingStatus::Scheduled);

                let meetings = store.list_meetings(&MeetingFilter::default()).expect("Query failed");
                let titles: Vec<&str> = meetings.iter().map(|m| m.title.as_str()).collect();
                assert_eq!(titles, vec!["Sooner", "Later"]);
            }

            it "window bounds are inclusive" {
                let lead = create_test_lead(&store);
                store.create_meeting(meeting_input(lead.id, "Edge", at(2026, 3, 1, 9))).expect("Failed");

                let hit = store.list_meetings(&MeetingFilter {
                    from_date: Some(at(2026, 3, 1, 9)),
                    to_date: Some(at(2026, 3, 1, 9)),
                    ..Default::default()
                }).expect("Query failed");
                assert_eq!(hit.len(), 1);

                let miss = store.list_meetings(&MeetingFilter {
                    from_date: Some(at(2026, 3, 1, 10)),
                    ..Default::default()
                }).expect("Query failed");
                assert!(miss.is_empty());
            }

            it "updates status and clears optional fields" {
                let lead = create_test_lead(&store);
                let mut input = meeting_input(lead.id, "Demo", at(2026, 3, 1, 9));
                input.location = Some("HQ".to_string());
                let meeting = store.create_meeting(input).expect("Failed");

                let updated = store.update_meeting(meeting.id, UpdateMeetingInput {
                    status: Some(MeetingStatus::Completed),
                    outcome: Some(Some("Went well".to_string())),
                    location: Some(None),
                    ..Default::default()
                }).expect("Update failed").expect("Missing");

                assert_eq!(updated.status, MeetingStatus::Completed);
                assert_eq!(updated.outcome.as_deref(), Some("Went well"));
                assert!(updated.location.is_none());
            }
        }

        describe "follow_ups" {
            it "new follow-ups start incomplete" {
                let lead = create_test_lead(&store);
                let follow_up = store.create_follow_up(follow_up_input(lead.id, at(2026, 4, 1, 9)))
                    .expect("Failed");

                assert!(!follow_up.completed);
                assert!(follow_up.completed_at.is_none());
            }

            it "completion stamps completed_at and reopening clears it" {
                let lead = create_test_lead(&store);
                let follow_up = store.create_follow_up(follow_up_input(lead.id, at(2026, 4, 1, 9)))
                    .expect("Failed");

                let done = store.update_follow_up(follow_up.id, UpdateFollowUpInput {
                    completed: Some(true),
                    ..Default::default()
                }).expect("Update failed").expect("Missing");
                assert!(done.completed);
                assert!(done.completed_at.is_some());

                let reopened = store.update_follow_up(follow_up.id, UpdateFollowUpInput {
                    completed: Some(false),
                    ..Default::default()
                }).expect("Update failed").expect("Missing");
                assert!(!reopened.completed);
                assert!(reopened.completed_at.is_none());
            }

            it "filters by completion and due date" {
                let lead = create_test_lead(&store);
                let early = store.create_follow_up(follow_up_input(lead.id, at(2026, 4, 1, 9)))
                    .expect("Failed");
                store.create_follow_up(follow_up_input(lead.id, at(2026, 4, 3, 9))).expect("Failed");

                store.update_follow_up(early.id, UpdateFollowUpInput {
                    completed: Some(true),
                    ..Default::default()
                }).expect("Update failed");

                let pending = store.list_follow_ups(&FollowUpFilter {
                    completed: Some(false),
                    ..Default::default()
                }).expect("Query failed");
                assert_eq!(pending.len(), 1);

                let later = store.list_follow_ups(&FollowUpFilter {
                    from_date: Some(at(2026, 4, 2, 0)),
                    ..Default::default()
                }).expect("Query failed");
                assert_eq!(later.len(), 1);
                assert_eq!(later[0].scheduled_at, at(2026, 4, 3, 9));
            }
        }
    }

    describe "template seeding" {
        it "seeds the three starter templates exactly once" {
            let store = MemoryStore::new();

            store::seed_default_templates(&store).expect("Seed failed");
            assert_eq!(store.list_templates(None).expect("Query failed").len(), 3);

            store::seed_default_templates(&store).expect("Seed failed");
            assert_eq!(store.list_templates(None).expect("Query failed").len(), 3);
        }

        it "does not resurrect deleted templates" {
            let store = MemoryStore::new();
            store::seed_default_templates(&store).expect("Seed failed");

            let first = store.list_templates(None).expect("Query failed")
                .into_iter().next().expect("Missing template");
            store.delete_template(first.id).expect("Delete failed");

            store::seed_default_templates(&store).expect("Seed failed");
            assert_eq!(store.list_templates(None).expect("Query failed").len(), 2);
        }
    }

    describe "memory backend" {
        it "behaves like sqlite for the lead lifecycle" {
            let store = MemoryStore::new();
            let lead = create_test_lead(&store);

            let updated = store.update_lead(lead.id, UpdateLeadInput {
                status: Some(LeadStatus::ClosedWon),
                estimated_value: Some(Some(10000.0)),
                ..Default::default()
            }).expect("Update failed").expect("Missing");
            assert_eq!(updated.status, LeadStatus::ClosedWon);

            assert_eq!(store.search_leads("analytical").expect("Query failed").len(), 1);
            assert!(store.delete_lead(lead.id).expect("Delete failed"));
            assert!(store.list_leads(&LeadFilter::default()).expect("Query failed").is_empty());
        }
    }

    describe "json backend" {
        it "persists across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("leadtrack.json");

            let store = JsonStore::open(path.clone()).expect("Failed to open store");
            let lead = create_test_lead(&store);
            store.create_follow_up(follow_up_input(lead.id, at(2026, 4, 1, 9))).expect("Failed");

            let reopened = JsonStore::open(path).expect("Failed to reopen store");
            let found = reopened.get_lead(lead.id).expect("Query failed").expect("Missing lead");
            assert_eq!(found.name, "Ada Lovelace");
            assert_eq!(reopened.list_follow_ups(&FollowUpFilter::default())
                .expect("Query failed").len(), 1);
        }

        it "persists deletions" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("leadtrack.json");

            let store = JsonStore::open(path.clone()).expect("Failed to open store");
            let lead = create_test_lead(&store);
            store.delete_lead(lead.id).expect("Delete failed");

            let reopened = JsonStore::open(path).expect("Failed to reopen store");
            assert!(reopened.get_lead(lead.id).expect("Query failed").is_none());
        }

        it "starts fresh from an unreadable file" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("leadtrack.json");
            std::fs::write(&path, "not json {").expect("Failed to write file");

            let store = JsonStore::open(path).expect("Failed to open store");
            assert!(store.list_leads(&LeadFilter::default()).expect("Query failed").is_empty());
        }
    }
}
