//! Output formats for the task view.

use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::Serialize;
use taskboard_core::TaskRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// One printed line of the task list, with relations resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub task_type: String,
    pub status: String,
    pub priority: String,
    pub project: String,
    pub assignee: String,
    pub due_date: String,
    pub created_at: String,
    pub pending: bool,
}

pub fn records(rows: &[TaskRow<'_>], tz: Tz, is_pending: impl Fn(&str) -> bool) -> Vec<TaskRecord> {
    rows.iter()
        .map(|row| {
            let task = row.task;
            TaskRecord {
                id: task.id.clone(),
                title: task.title.clone(),
                task_type: task.task_type().to_string(),
                status: task.status.to_string(),
                priority: task.priority.to_string(),
                project: row.project.map(|p| p.name.clone()).unwrap_or_default(),
                assignee: row.assignee.map(|u| u.name.clone()).unwrap_or_default(),
                due_date: task.due_date.map(|d| d.to_string()).unwrap_or_default(),
                created_at: task
                    .created_at
                    .with_timezone(&tz)
                    .format("%Y-%m-%d %H:%M %Z")
                    .to_string(),
                pending: is_pending(&task.id) || task.is_saving(),
            }
        })
        .collect()
}

pub fn render(records: &[TaskRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table(records)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            for r in records {
                wtr.serialize(r)?;
            }
            let bytes = wtr
                .into_inner()
                .map_err(|e| anyhow!("finish csv output: {}", e.error()))?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

const HEADERS: [&str; 9] = [
    "ID", "TITLE", "TYPE", "STATUS", "PRIORITY", "PROJECT", "ASSIGNEE", "DUE", "CREATED",
];

fn table(records: &[TaskRecord]) -> String {
    if records.is_empty() {
        return "(no tasks)\n".to_string();
    }

    let cells: Vec<[String; 9]> = records
        .iter()
        .map(|r| {
            let id = if r.pending {
                format!("{}*", r.id)
            } else {
                r.id.clone()
            };
            [
                id,
                r.title.clone(),
                r.task_type.clone(),
                r.status.clone(),
                r.priority.clone(),
                r.project.clone(),
                r.assignee.clone(),
                r.due_date.clone(),
                r.created_at.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().copied(), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    if records.iter().any(|r| r.pending) {
        out.push_str("* awaiting server confirmation\n");
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use taskboard_core::{EntityStore, Project, Task, User, with_relations};

    fn sample() -> Vec<TaskRecord> {
        let created = Utc.with_ymd_and_hms(2026, 2, 21, 5, 59, 0).single().unwrap();
        let tasks = vec![
            Task::new("1", "Fix bug")
                .with_project("p1")
                .with_assignee("u1")
                .with_created_at(created),
            Task::new("2", "Add, login").with_created_at(created),
        ];
        let users = EntityStore::replace_all([User {
            id: "u1".into(),
            name: "Ana".into(),
            email: String::new(),
            project_ids: vec!["p1".into()],
        }]);
        let projects = EntityStore::replace_all([Project {
            id: "p1".into(),
            name: "Web".into(),
            description: String::new(),
        }]);
        let rows = with_relations(&tasks, &users, &projects);
        records(&rows, chrono_tz::America::Chicago, |id| id == "2")
    }

    #[test]
    fn records_resolve_names_and_local_time() {
        let recs = sample();
        assert_eq!(recs[0].project, "Web");
        assert_eq!(recs[0].assignee, "Ana");
        assert_eq!(recs[0].created_at, "2026-02-20 23:59 CST");
        assert!(!recs[0].pending);
        assert_eq!(recs[1].project, "");
        assert!(recs[1].pending);
    }

    #[test]
    fn table_marks_pending_rows() {
        let out = render(&sample(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].starts_with("2*"));
        assert_eq!(lines.last().copied(), Some("* awaiting server confirmation"));
    }

    #[test]
    fn csv_quotes_embedded_commas() {
        let out = render(&sample(), OutputFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("id,title,taskType,status,priority,project,assignee,dueDate,createdAt,pending")
        );
        assert!(out.contains("\"Add, login\""));
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["taskType"], "Bug");
        assert_eq!(v[1]["pending"], true);
    }
}
