//! Domain types and their database row counterparts.
//!
//! Rows come out of Diesel with enum-ish columns stored as VARCHAR; the
//! row-to-domain mapping is the single place those strings are parsed and
//! the joined category is normalized onto the task.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a task came from. Only `Manual` is produced by this app; the other
/// variants exist for rows ingested by future integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskSource {
    Manual,
    Slack,
    Granola,
}

impl TaskSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSource::Manual => "Manual",
            TaskSource::Slack => "Slack",
            TaskSource::Granola => "Granola",
        }
    }

    /// Parse the stored string, falling back to `Manual` for anything
    /// unrecognized.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "Slack" => TaskSource::Slack,
            "Granola" => TaskSource::Granola,
            _ => TaskSource::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TaskStatus::Open),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Named date-range filter applied to a task's effective planned date.
/// "All" is represented by the absence of a window (`Option<ViewWindow>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewWindow {
    Today,
    Tomorrow,
    Week,
    Someday,
}

impl ViewWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewWindow::Today => "today",
            ViewWindow::Tomorrow => "tomorrow",
            ViewWindow::Week => "week",
            ViewWindow::Someday => "someday",
        }
    }

    /// Parse a `view` query value; `all` and anything unrecognized mean
    /// "no window".
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "today" => Some(ViewWindow::Today),
            "tomorrow" => Some(ViewWindow::Tomorrow),
            "week" => Some(ViewWindow::Week),
            "someday" => Some(ViewWindow::Someday),
            _ => None,
        }
    }
}

/// Category filter resolved from the `category` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No category filter.
    #[default]
    Any,
    /// Only tasks with a null category.
    None,
    /// Only tasks in this category.
    Id(Uuid),
}

/// Filter configuration for listing tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub view: Option<ViewWindow>,
    pub category: CategoryFilter,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// The denormalized category reference carried on a fetched task.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

/// Database representation of a task row, column order matching the table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub source_ref: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: String,
    pub sort_order: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    pub planned_date: Option<NaiveDate>,
    pub raw_snippet: Option<String>,
}

/// A task as the rest of the app sees it: typed enums and the joined
/// category normalized into one field.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub source: TaskSource,
    pub source_ref: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Priority,
    pub sort_order: i32,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
    pub planned_date: Option<NaiveDate>,
    pub raw_snippet: Option<String>,
    pub category: Option<CategoryRef>,
}

impl Task {
    /// The one mapping step from a raw row plus its joined category.
    /// Unrecognized stored strings fall back to their defaults
    /// (Manual / medium / open).
    pub fn from_row(row: TaskRow, category: Option<CategoryRef>) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            source: TaskSource::parse_or_default(&row.source),
            source_ref: row.source_ref,
            category_id: row.category_id,
            priority: Priority::parse(&row.priority).unwrap_or(Priority::Medium),
            sort_order: row.sort_order,
            status: TaskStatus::parse(&row.status).unwrap_or(TaskStatus::Open),
            created_at: row.created_at,
            completed_at: row.completed_at,
            due_date: row.due_date,
            planned_date: row.planned_date,
            raw_snippet: row.raw_snippet,
            category,
        }
    }
}

/// Caller-supplied fields for a new task. Source, status, and sort order
/// are fixed by the insert path and cannot be set here.
#[derive(Debug, Clone, Default)]
pub struct NewTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub planned_date: Option<NaiveDate>,
}

/// Partial update for a task. `None` skips a column; `Some(None)` sets a
/// nullable column to NULL. At least one field must be set.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::tasks)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<Uuid>>,
    pub priority: Option<String>,
    pub sort_order: Option<i32>,
    pub status: Option<String>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub planned_date: Option<Option<NaiveDate>>,
}

impl TaskChanges {
    pub fn status(status: TaskStatus) -> Self {
        TaskChanges {
            status: Some(status.as_str().to_string()),
            ..TaskChanges::default()
        }
    }

    pub fn category_priority(category_id: Option<Uuid>, priority: Priority) -> Self {
        TaskChanges {
            category_id: Some(category_id),
            priority: Some(priority.as_str().to_string()),
            ..TaskChanges::default()
        }
    }

    pub fn planned_date(date: Option<NaiveDate>) -> Self {
        TaskChanges {
            planned_date: Some(date),
            ..TaskChanges::default()
        }
    }

    /// Stamp `completed_at` when this change moves the task to done.
    /// Moving back to open leaves any previous stamp in place; clearing it
    /// is an unresolved product question (see DESIGN.md).
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        if self.status.as_deref() == Some(TaskStatus::Done.as_str()) {
            self.completed_at = Some(Some(now));
        }
        self
    }
}
