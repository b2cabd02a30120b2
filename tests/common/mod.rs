#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::test;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use taskboard::auth::TokenService;
use taskboard::models::{
    NewTask, NewUser, SortField, SortOrder, Task, TaskChanges, TaskFilter, TaskSort, User,
};
use taskboard::repository::{TaskRepository, UserRepository};
use taskboard::{AppError, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password123";

/// Lowest bcrypt cost, to keep registration fast.
pub const TEST_HASH_COST: u32 = 4;

/// `UserRepository` backed by a vector, with the same unique-email rule as the database.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "A resource with this email already exists".into(),
            ));
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

/// `TaskRepository` backed by a vector, mirroring the SQL filter/sort/window semantics.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
}

fn matches(task: &Task, filter: &TaskFilter) -> bool {
    filter.assigned_to_id.map_or(true, |id| task.assigned_to_id == id)
        && filter.status.map_or(true, |status| task.status == status)
        && filter.priority.map_or(true, |priority| task.priority == priority)
}

fn compare(a: &Task, b: &Task, sort: TaskSort) -> Ordering {
    let ordering = match sort.sort_by {
        SortField::Title => a.title.cmp(&b.title),
        SortField::DueDate => a.due_date.cmp(&b.due_date),
        SortField::Priority => a.priority.cmp(&b.priority),
        SortField::Status => a.status.cmp(&b.status),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let ordering = match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        // Creation times strictly increase so creation order is observable.
        let now = match tasks.iter().map(|t| t.created_at).max() {
            Some(latest) if latest >= Utc::now() => latest + Duration::microseconds(1),
            _ => Utc::now(),
        };
        let created = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            priority: task.priority,
            assign_date: task.assign_date,
            due_date: task.due_date,
            status: task.status,
            start_date: task.start_date,
            complete_date: task.complete_date,
            client: task.client,
            is_approved: task.is_approved,
            assigned_to_id: task.assigned_to_id,
            assigned_by_id: task.assigned_by_id,
            created_at: now,
            updated_at: now,
        };
        tasks.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.lock().unwrap();
        let mut matching: Vec<Task> = tasks.iter().filter(|t| matches(t, filter)).cloned().collect();
        matching.sort_by(|a, b| compare(a, b, sort));
        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: &TaskFilter) -> Result<i64, AppError> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().filter(|t| matches(t, filter)).count() as i64)
    }

    async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(assign_date) = changes.assign_date {
            task.assign_date = assign_date;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(start_date) = changes.start_date {
            task.start_date = start_date;
        }
        if let Some(complete_date) = changes.complete_date {
            task.complete_date = complete_date;
        }
        if let Some(client) = changes.client {
            task.client = client;
        }
        if let Some(is_approved) = changes.is_approved {
            task.is_approved = is_approved;
        }
        if let Some(assigned_to_id) = changes.assigned_to_id {
            task.assigned_to_id = assigned_to_id;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() != before)
    }
}

pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 3600)
}

/// Application state over fresh in-memory stores.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryTaskRepository::default()),
        test_tokens(),
        TEST_HASH_COST,
    )
}

/// Registers a user and returns the `data` of the response (the public user).
pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    role: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": PASSWORD,
            "role": role
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);

    let body: Value = test::read_body_json(resp).await;
    body["data"].clone()
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", email);

    let body: Value = test::read_body_json(resp).await;
    body["data"]["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

/// A registered, logged-in user.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    role: &str,
) -> TestUser {
    let user = register_user(app, name, email, role).await;
    let token = login(app, email).await;
    TestUser {
        id: user["id"].as_str().expect("user id").to_string(),
        token,
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// A valid create-task body assigned to `assignee`.
pub fn task_payload(title: &str, assignee: &str) -> Value {
    json!({
        "title": title,
        "description": "Prepare the figures",
        "dueDate": "2030-06-30T17:00:00.000Z",
        "client": "Acme Corp",
        "assignedToId": assignee
    })
}

/// Creates a task as `token` and returns the created task JSON.
pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/tasks")
        .append_header(bearer(token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(status, 201, "task creation failed: {}", body);
    body["data"].clone()
}

/// The `field` names of a validation failure body, in response order.
pub fn error_fields(body: &Value) -> Vec<String> {
    body["data"]["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
