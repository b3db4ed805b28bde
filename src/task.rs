use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Column a task lives in. Serialized names match the `taskboard:v1`
/// slot schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn title(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

/// Status predicate for the board's filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    /// Anything not yet done.
    Open,
    Done,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Open => "Open",
            StatusFilter::Done => "Done",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Open,
            StatusFilter::Open => StatusFilter::Done,
            StatusFilter::Done => StatusFilter::All,
        }
    }

    pub fn accepts(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Open => !task.done,
            StatusFilter::Done => task.done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    pub done: bool,
    /// Column held before the task was completed; restored when the done
    /// checkbox is cleared. Absent in payloads written before the field
    /// existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<Status>,
    /// Milliseconds since the epoch in the slot, like the original schema.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, status: Status) -> Self {
        // Truncated to millisecond precision so a record compares equal to
        // itself after a slot round trip.
        let now = Utc::now();
        let created_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            status,
            done: status == Status::Done,
            last_status: None,
            created_at,
        }
    }

    /// Pure filter predicate: case-insensitive substring match on title or
    /// description, AND the status filter. An empty query matches everything.
    pub fn matches(&self, query: &str, filter: StatusFilter) -> bool {
        let q = query.trim().to_lowercase();
        let text_hit = q.is_empty()
            || self.title.to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q);
        text_hit && filter.accepts(self)
    }
}

/// Field-merge applied by `Board::patch`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub done: Option<bool>,
    pub last_status: Option<Option<Status>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, description: &str, status: Status) -> Task {
        let mut t = Task::new(title, status);
        t.description = description.to_string();
        t
    }

    #[test]
    fn status_serializes_to_slot_names() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"inprogress\""
        );
        assert_eq!(serde_json::to_string(&Status::Todo).unwrap(), "\"todo\"");
    }

    #[test]
    fn task_serializes_with_camel_case_and_millis() {
        let t = task("Write report", "", Status::Todo);
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("createdAt").unwrap().is_number());
        assert!(json.get("lastStatus").is_none());
        assert_eq!(json.get("status").unwrap(), "todo");
    }

    #[test]
    fn parses_payload_without_last_status_or_description() {
        let raw = r#"{
            "id": "7b33a9ae-2f0f-4ad0-9c40-2f1a7b9f7a11",
            "title": "Old record",
            "status": "done",
            "done": true,
            "createdAt": 1700000000000
        }"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(t.description, "");
        assert_eq!(t.last_status, None);
        assert_eq!(t.status, Status::Done);
    }

    #[test]
    fn matches_is_case_insensitive_over_title_and_description() {
        let t = task("Deploy Service", "ship the API", Status::Todo);
        assert!(t.matches("deploy", StatusFilter::All));
        assert!(t.matches("API", StatusFilter::All));
        assert!(t.matches("", StatusFilter::All));
        assert!(!t.matches("database", StatusFilter::All));
    }

    #[test]
    fn matches_applies_the_status_predicate() {
        let open = task("a", "", Status::InProgress);
        let done = task("a", "", Status::Done);
        assert!(open.matches("", StatusFilter::Open));
        assert!(!open.matches("", StatusFilter::Done));
        assert!(done.matches("", StatusFilter::Done));
        assert!(!done.matches("", StatusFilter::Open));
    }

    #[test]
    fn filter_cycles_all_open_done() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::Open);
        assert_eq!(StatusFilter::Open.next(), StatusFilter::Done);
        assert_eq!(StatusFilter::Done.next(), StatusFilter::All);
    }
}
