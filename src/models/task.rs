use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::validation::{
    parse_field, parse_iso_field, required_field, validate_iso_date, validate_limit,
    validate_offset, validate_order, validate_priority, validate_sort_by, validate_status,
    validate_uuid, BodySchema, JsonKind,
};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum; variants are declared in ascending order.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Represents the workflow stage of a task.
/// Corresponds to the `task_status` SQL enum. Transitions are not enforced.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Submitted,
    InReview,
    Completed,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Submitted,
        TaskStatus::InReview,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "TO_DO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Submitted => "SUBMITTED",
            TaskStatus::InReview => "IN_REVIEW",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

/// Column a task listing can be ordered by.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    DueDate,
    Priority,
    Status,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Title,
        SortField::DueDate,
        SortField::Priority,
        SortField::Status,
        SortField::CreatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::DueDate => "dueDate",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::CreatedAt => "createdAt",
        }
    }

    /// SQL column backing this sort key.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::DueDate => "due_date",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl Default for SortField {
    fn default() -> Self {
        SortField::CreatedAt
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::Asc, SortOrder::Desc];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

macro_rules! impl_str_enum {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    $ty::ALL
                        .into_iter()
                        .find(|variant| variant.as_str() == value)
                        .ok_or_else(|| format!("unknown {}: {}", stringify!($ty), value))
                }
            }
        )*
    };
}

impl_str_enum!(TaskPriority, TaskStatus, SortField, SortOrder);

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assign_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub complete_date: Option<DateTime<Utc>>,
    pub client: String,
    pub is_approved: bool,
    /// The employee (or manager) doing the work.
    pub assigned_to_id: Uuid,
    /// The manager who created the task.
    pub assigned_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated task fields as supplied by the creator; unset fields take defaults in the service.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub assign_date: Option<DateTime<Utc>>,
    pub due_date: DateTime<Utc>,
    pub status: Option<TaskStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub complete_date: Option<DateTime<Utc>>,
    pub client: String,
    pub assigned_to_id: Uuid,
}

/// A fully defaulted task ready for insertion.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assign_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub complete_date: Option<DateTime<Utc>>,
    pub client: String,
    pub is_approved: bool,
    pub assigned_to_id: Uuid,
    pub assigned_by_id: Uuid,
}

/// A partial update. `None` leaves a field untouched; for the nullable dates
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assign_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub complete_date: Option<Option<DateTime<Utc>>>,
    pub client: Option<String>,
    pub is_approved: Option<bool>,
    pub assigned_to_id: Option<Uuid>,
}

/// Equality filters applied to a task listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assigned_to_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSort {
    pub sort_by: SortField,
    pub order: SortOrder,
}

/// Parsed `GET /tasks` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListParams {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub sort: TaskSort,
}

impl Default for TaskListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            status: None,
            priority: None,
            sort: TaskSort::default(),
        }
    }
}

/// One window of a filtered listing plus the size of the whole filtered set.
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total_count: i64,
}

/// Body of `POST /tasks`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[validate(required, length(min = 1))]
    pub description: Option<String>,
    #[validate(custom = "validate_priority")]
    pub priority: Option<String>,
    #[validate(custom = "validate_iso_date")]
    pub assign_date: Option<String>,
    #[validate(required, custom = "validate_iso_date")]
    pub due_date: Option<String>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    #[validate(custom = "validate_iso_date")]
    pub start_date: Option<String>,
    #[validate(custom = "validate_iso_date")]
    pub complete_date: Option<String>,
    #[validate(required, length(min = 1))]
    pub client: Option<String>,
    #[validate(required, custom = "validate_uuid")]
    pub assigned_to_id: Option<String>,
}

impl BodySchema for CreateTaskRequest {
    const FIELDS: &'static [(&'static str, JsonKind)] = &[
        ("title", JsonKind::String),
        ("description", JsonKind::String),
        ("priority", JsonKind::String),
        ("assignDate", JsonKind::String),
        ("dueDate", JsonKind::String),
        ("status", JsonKind::String),
        ("startDate", JsonKind::String),
        ("completeDate", JsonKind::String),
        ("client", JsonKind::String),
        ("assignedToId", JsonKind::String),
    ];
}

impl CreateTaskRequest {
    /// Validates the body and converts it into a `TaskDraft`.
    pub fn into_draft(self) -> Result<TaskDraft, AppError> {
        self.validate()?;

        Ok(TaskDraft {
            title: required_field("title", self.title)?,
            description: required_field("description", self.description)?,
            priority: self
                .priority
                .map(|p| parse_field("priority", &p))
                .transpose()?,
            assign_date: self
                .assign_date
                .map(|d| parse_iso_field("assignDate", &d))
                .transpose()?,
            due_date: parse_iso_field("dueDate", &required_field("dueDate", self.due_date)?)?,
            status: self.status.map(|s| parse_field("status", &s)).transpose()?,
            start_date: self
                .start_date
                .map(|d| parse_iso_field("startDate", &d))
                .transpose()?,
            complete_date: self
                .complete_date
                .map(|d| parse_iso_field("completeDate", &d))
                .transpose()?,
            client: required_field("client", self.client)?,
            assigned_to_id: parse_field(
                "assignedToId",
                &required_field("assignedToId", self.assigned_to_id)?,
            )?,
        })
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `PUT /tasks/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(custom = "validate_priority")]
    pub priority: Option<String>,
    #[validate(custom = "validate_iso_date")]
    pub assign_date: Option<String>,
    #[validate(custom = "validate_iso_date")]
    pub due_date: Option<String>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom = "validate_iso_date")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom = "validate_iso_date")]
    pub complete_date: Option<Option<String>>,
    #[validate(length(min = 1))]
    pub client: Option<String>,
    pub is_approved: Option<bool>,
    #[validate(custom = "validate_uuid")]
    pub assigned_to_id: Option<String>,
}

impl BodySchema for UpdateTaskRequest {
    const FIELDS: &'static [(&'static str, JsonKind)] = &[
        ("title", JsonKind::String),
        ("description", JsonKind::String),
        ("priority", JsonKind::String),
        ("assignDate", JsonKind::String),
        ("dueDate", JsonKind::String),
        ("status", JsonKind::String),
        ("startDate", JsonKind::String),
        ("completeDate", JsonKind::String),
        ("client", JsonKind::String),
        ("isApproved", JsonKind::Boolean),
        ("assignedToId", JsonKind::String),
    ];
}

impl UpdateTaskRequest {
    /// Validates the body and converts it into `TaskChanges`.
    pub fn into_changes(self) -> Result<TaskChanges, AppError> {
        self.validate()?;

        let nullable_date = |field: &str, value: Option<Option<String>>| {
            value
                .map(|inner| inner.map(|d| parse_iso_field(field, &d)).transpose())
                .transpose()
        };

        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            priority: self
                .priority
                .map(|p| parse_field("priority", &p))
                .transpose()?,
            assign_date: self
                .assign_date
                .map(|d| parse_iso_field("assignDate", &d))
                .transpose()?,
            due_date: self
                .due_date
                .map(|d| parse_iso_field("dueDate", &d))
                .transpose()?,
            status: self.status.map(|s| parse_field("status", &s)).transpose()?,
            start_date: nullable_date("startDate", self.start_date)?,
            complete_date: nullable_date("completeDate", self.complete_date)?,
            client: self.client,
            is_approved: self.is_approved,
            assigned_to_id: self
                .assigned_to_id
                .map(|id| parse_field("assignedToId", &id))
                .transpose()?,
        })
    }
}

/// Query string of `GET /tasks`. Values arrive as strings so every bad
/// parameter is reported, not just the first one serde trips over.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[validate(custom = "validate_limit")]
    pub limit: Option<String>,
    #[validate(custom = "validate_offset")]
    pub offset: Option<String>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    #[validate(custom = "validate_priority")]
    pub priority: Option<String>,
    #[validate(custom = "validate_sort_by")]
    pub sort_by: Option<String>,
    #[validate(custom = "validate_order")]
    pub order: Option<String>,
}

impl ListTasksQuery {
    pub fn into_params(self) -> Result<TaskListParams, AppError> {
        self.validate()?;

        Ok(TaskListParams {
            limit: self
                .limit
                .map(|l| parse_field("limit", &l))
                .transpose()?
                .unwrap_or(DEFAULT_PAGE_SIZE),
            offset: self
                .offset
                .map(|o| parse_field("offset", &o))
                .transpose()?
                .unwrap_or(0),
            status: self.status.map(|s| parse_field("status", &s)).transpose()?,
            priority: self
                .priority
                .map(|p| parse_field("priority", &p))
                .transpose()?,
            sort: TaskSort {
                sort_by: self
                    .sort_by
                    .map(|s| parse_field("sortBy", &s))
                    .transpose()?
                    .unwrap_or_default(),
                order: self
                    .order
                    .map(|o| parse_field("order", &o))
                    .transpose()?
                    .unwrap_or_default(),
            },
        })
    }
}

/// `{id}` path segment of the task routes.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskPath {
    #[validate(custom = "validate_uuid")]
    pub id: String,
}

impl TaskPath {
    pub fn into_id(self) -> Result<Uuid, AppError> {
        self.validate()?;
        parse_field("id", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "title": "Quarterly report",
            "description": "Compile Q3 numbers",
            "dueDate": "2030-01-15T00:00:00.000Z",
            "client": "Acme",
            "assignedToId": Uuid::new_v4().to_string()
        })
    }

    fn field_names(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_request_leaves_defaults_unset() {
        let request: CreateTaskRequest = serde_json::from_value(create_body()).unwrap();
        let draft = request.into_draft().unwrap();

        assert_eq!(draft.title, "Quarterly report");
        assert!(draft.priority.is_none());
        assert!(draft.status.is_none());
        assert!(draft.assign_date.is_none());
        assert!(draft.start_date.is_none());
    }

    #[test]
    fn test_create_request_reports_every_invalid_field() {
        let request: CreateTaskRequest = serde_json::from_value(json!({
            "title": "",
            "priority": "URGENT",
            "dueDate": "tomorrow",
            "status": "DONE",
            "assignedToId": "not-a-uuid"
        }))
        .unwrap();

        let fields = field_names(request.into_draft().unwrap_err());
        assert_eq!(
            fields,
            vec![
                "assignedToId",
                "client",
                "description",
                "dueDate",
                "priority",
                "status",
                "title"
            ]
        );
    }

    #[test]
    fn test_create_request_accepts_null_optional_dates() {
        let mut body = create_body();
        body["completeDate"] = serde_json::Value::Null;
        body["startDate"] = json!("2030-01-01T09:00:00Z");
        body["priority"] = json!("HIGH");

        let draft: TaskDraft = serde_json::from_value::<CreateTaskRequest>(body)
            .unwrap()
            .into_draft()
            .unwrap();
        assert_eq!(draft.priority, Some(TaskPriority::High));
        assert!(draft.start_date.is_some());
        assert!(draft.complete_date.is_none());
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let request: UpdateTaskRequest = serde_json::from_value(json!({
            "startDate": null,
            "status": "IN_REVIEW"
        }))
        .unwrap();
        let changes = request.into_changes().unwrap();

        assert_eq!(changes.start_date, Some(None));
        assert_eq!(changes.complete_date, None);
        assert_eq!(changes.status, Some(TaskStatus::InReview));
        assert!(changes.title.is_none());
    }

    #[test]
    fn test_update_request_rejects_bad_dates() {
        let request: UpdateTaskRequest = serde_json::from_value(json!({
            "completeDate": "31/12/2030",
            "title": ""
        }))
        .unwrap();

        let fields = field_names(request.into_changes().unwrap_err());
        assert_eq!(fields, vec!["completeDate", "title"]);
    }

    #[test]
    fn test_list_query_defaults() {
        let params = ListTasksQuery::default().into_params().unwrap();
        assert_eq!(params, TaskListParams::default());
        assert_eq!(params.sort.sort_by, SortField::CreatedAt);
        assert_eq!(params.sort.order, SortOrder::Asc);
    }

    #[test]
    fn test_list_query_parses_and_rejects() {
        let query = ListTasksQuery {
            limit: Some("25".into()),
            offset: Some("50".into()),
            status: Some("COMPLETED".into()),
            sort_by: Some("dueDate".into()),
            order: Some("desc".into()),
            ..Default::default()
        };
        let params = query.into_params().unwrap();
        assert_eq!(params.limit, 25);
        assert_eq!(params.offset, 50);
        assert_eq!(params.status, Some(TaskStatus::Completed));
        assert_eq!(params.sort.sort_by, SortField::DueDate);
        assert_eq!(params.sort.order, SortOrder::Desc);

        let bad = ListTasksQuery {
            limit: Some("0".into()),
            sort_by: Some("assignee".into()),
            order: Some("sideways".into()),
            ..Default::default()
        };
        assert_eq!(
            field_names(bad.into_params().unwrap_err()),
            vec!["limit", "order", "sortBy"]
        );
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: "d".into(),
            priority: TaskPriority::default(),
            assign_date: now,
            due_date: now,
            status: TaskStatus::default(),
            start_date: None,
            complete_date: None,
            client: "c".into(),
            is_approved: false,
            assigned_to_id: Uuid::new_v4(),
            assigned_by_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "MEDIUM");
        assert_eq!(json["status"], "TO_DO");
        assert_eq!(json["isApproved"], false);
        assert!(json["startDate"].is_null());
        assert!(json.get("assignedById").is_some());
    }
}
