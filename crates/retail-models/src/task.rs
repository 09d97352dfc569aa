//! Store tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use retail_notion::{DatabaseKind, Page, Properties};

use crate::record::NotionRecord;

/// Task progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn parse(value: &str) -> Option<TaskStatus> {
        match value.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "todo" | "to_do" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn parse(value: &str) -> Option<TaskPriority> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// A unit of work assigned to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub store_id: Option<String>,
    pub assignee_id: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, store_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            store_id: Some(store_id.into()),
            assignee_id: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    /// A task is overdue when it has a due date in the past and is not done.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|due| due < today)
    }
}

impl NotionRecord for Task {
    const DATABASE: DatabaseKind = DatabaseKind::Tasks;

    fn from_page(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title("Title"),
            description: page.text("Description"),
            store_id: page.relation("Store"),
            assignee_id: page.relation("Assignee"),
            status: page
                .select("Status")
                .and_then(|s| TaskStatus::parse(&s))
                .unwrap_or_default(),
            priority: page
                .select("Priority")
                .and_then(|p| TaskPriority::parse(&p))
                .unwrap_or_default(),
            due_date: page.date("Due"),
            created_by: page.relation("Created By"),
            created_at: page.created_time,
        }
    }

    fn to_properties(&self) -> Properties {
        Properties::new()
            .title("Title", &self.title)
            .text("Description", &self.description)
            .relation("Store", self.store_id.as_deref())
            .relation("Assignee", self.assignee_id.as_deref())
            .select("Status", self.status.as_str())
            .select("Priority", self.priority.as_str())
            .date("Due", self.due_date)
            .relation("Created By", self.created_by.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_notion_labels() {
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("To Do"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::parse("blocked"), None);
    }

    #[test]
    fn test_is_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut task = Task::new("Restock", "s-1");
        assert!(!task.is_overdue(today));

        task.due_date = NaiveDate::from_ymd_opt(2024, 5, 9);
        assert!(task.is_overdue(today));

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn test_properties_map_back() {
        let mut task = Task::new("Restock", "s-1");
        task.priority = TaskPriority::High;
        task.due_date = NaiveDate::from_ymd_opt(2024, 6, 1);

        let page = Page {
            id: "t1".into(),
            created_time: Utc::now(),
            last_edited_time: Utc::now(),
            archived: false,
            parent: Default::default(),
            properties: task.to_properties().into_map(),
        };
        let back = Task::from_page(&page);
        assert_eq!(back.title, "Restock");
        assert_eq!(back.store_id.as_deref(), Some("s-1"));
        assert_eq!(back.priority, TaskPriority::High);
        assert_eq!(back.status, TaskStatus::Todo);
        assert_eq!(back.due_date, task.due_date);
        assert!(back.assignee_id.is_none());
    }
}
