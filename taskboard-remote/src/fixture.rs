//! Seed data for the simulated backend.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use taskboard_core::{Priority, Project, Severity, Task, TaskDetails, TaskStatus, User};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "p1".to_string(),
            name: "Website Redesign".to_string(),
            description: "Refresh the marketing site".to_string(),
        },
        Project {
            id: "p2".to_string(),
            name: "Mobile App".to_string(),
            description: "iOS and Android clients".to_string(),
        },
        Project {
            id: "p3".to_string(),
            name: "API Platform".to_string(),
            description: "Public REST API".to_string(),
        },
    ]
}

pub fn users() -> Vec<User> {
    let user = |id: &str, name: &str, projects: &[&str]| User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        project_ids: projects.iter().map(|p| p.to_string()).collect(),
    };
    vec![
        user("u1", "Ana Silva", &["p1", "p2"]),
        user("u2", "Ben Okafor", &["p2"]),
        user("u3", "Chen Wei", &["p1", "p3"]),
        user("u4", "Dana Levi", &["p3"]),
    ]
}

pub fn tasks() -> Vec<Task> {
    let mut out = vec![
        Task::new("1", "Fix login redirect loop")
            .with_description("Users bounce between /login and /home after SSO")
            .with_priority(Priority::High)
            .with_project("p1")
            .with_assignee("u1")
            .with_created_at(at(2026, 9, 1))
            .with_details(TaskDetails::Bug {
                severity: Severity::High,
                steps_to_reproduce: "Sign in with SSO, then refresh".to_string(),
            }),
        Task::new("2", "Add dark mode")
            .with_description("Theme toggle persisted per user")
            .with_priority(Priority::Medium)
            .with_status(TaskStatus::InProgress)
            .with_project("p2")
            .with_assignee("u2")
            .with_created_at(at(2026, 9, 3))
            .with_details(TaskDetails::Feature {
                business_value: "Most requested feature in surveys".to_string(),
                acceptance_criteria: vec![
                    "Toggle in settings".to_string(),
                    "Respects OS preference by default".to_string(),
                ],
            }),
        Task::new("3", "Speed up search endpoint")
            .with_description("p95 latency is above 800ms")
            .with_priority(Priority::Critical)
            .with_status(TaskStatus::Review)
            .with_project("p3")
            .with_assignee("u4")
            .with_created_at(at(2026, 9, 5))
            .with_details(TaskDetails::Enhancement {
                current_behavior: "Full table scan per query".to_string(),
                proposed_behavior: "Trigram index on title".to_string(),
            }),
        Task::new("4", "Evaluate push notification vendors")
            .with_priority(Priority::Low)
            .with_project("p2")
            .with_created_at(at(2026, 9, 8))
            .with_details(TaskDetails::Research {
                research_questions: vec![
                    "Which vendors support both platforms?".to_string(),
                    "What does delivery reporting cost?".to_string(),
                ],
                expected_outcomes: "Shortlist of two vendors".to_string(),
            }),
        Task::new("5", "Broken footer links")
            .with_description("Privacy and terms links 404")
            .with_priority(Priority::Medium)
            .with_status(TaskStatus::Done)
            .with_project("p1")
            .with_assignee("u3")
            .with_created_at(at(2026, 8, 28))
            .with_details(TaskDetails::Bug {
                severity: Severity::Low,
                steps_to_reproduce: "Scroll to footer, click Privacy".to_string(),
            }),
        Task::new("6", "Rate limit public endpoints")
            .with_priority(Priority::High)
            .with_project("p3")
            .with_assignee("u3")
            .with_created_at(at(2026, 9, 10))
            .with_details(TaskDetails::Feature {
                business_value: "Protects shared infrastructure".to_string(),
                acceptance_criteria: vec!["429 with Retry-After".to_string()],
            }),
    ];

    out[0].due_date = day(2026, 10, 24);
    out[2].due_date = day(2026, 10, 21);
    out[5].due_date = day(2026, 11, 2);
    out
}
