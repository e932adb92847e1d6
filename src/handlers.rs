//! Request handlers: the single page GET plus the form-post actions.
//!
//! Every write redirects back to the `return_to` path the form carried, so
//! the browser lands on the same filtered view with fresh data. Data-access
//! failures during the page load render a remediation notice; failures
//! during a write propagate as error responses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    Category, CategoryFilter, NewTaskInput, Priority, Task, TaskFilters, TaskStatus, ViewWindow,
};
use crate::render::{self, PageContext};

#[derive(Clone)]
pub struct AppState {
    /// `None` when `DATABASE_URL` was absent at startup; the page then
    /// renders the configuration notice instead of crashing.
    pub pool: Option<DbPool>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/tasks", post(create_task))
        .route("/tasks/:id/complete", post(complete_task))
        .route("/tasks/:id/edit", post(edit_task))
        .route("/tasks/:id/planned-date", post(set_planned_date))
        .route("/tasks/:id/delete", post(delete_task))
        .route("/categories", post(create_category))
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct PageParams {
    view: Option<String>,
    status: Option<String>,
    category: Option<String>,
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Html<String>> {
    let view = params.view.as_deref().and_then(ViewWindow::parse);
    let status = resolve_status(params.status.as_deref());
    let category = resolve_category(params.category.as_deref());
    let filters = TaskFilters {
        status: Some(status),
        view,
        category,
    };

    let (categories, tasks, error) = match load_page(&state, &filters).await {
        Ok((categories, tasks)) => (categories, tasks, None),
        Err(e) => {
            tracing::error!("Failed to load page data: {:?}", e);
            (
                Vec::new(),
                Vec::new(),
                Some("Failed to load. Is the database configured?".to_string()),
            )
        }
    };

    let ctx = PageContext::new(
        view,
        status,
        &category_token(category),
        categories,
        tasks,
        error,
    );
    Ok(Html(render::render_index(&ctx)?))
}

/// The read path behind the page: best-effort default-category seed, then
/// categories and the filtered task list. Any failure here becomes the
/// notice, not a 500.
async fn load_page(
    state: &AppState,
    filters: &TaskFilters,
) -> anyhow::Result<(Vec<Category>, Vec<Task>)> {
    let pool = state
        .pool
        .as_ref()
        .context("DATABASE_URL is not configured")?;
    let mut conn = pool.get().await?;

    db::categories::ensure_default(&mut conn).await?;
    let categories = db::categories::list_all(&mut conn).await?;
    let tasks = db::tasks::list(&mut conn, filters).await?;

    Ok((categories, tasks))
}

#[derive(Debug, Deserialize)]
struct CreateTaskForm {
    title: String,
    description: Option<String>,
    category_id: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
    planned_date: Option<String>,
    return_to: Option<String>,
}

async fn create_task(
    State(state): State<AppState>,
    Form(form): Form<CreateTaskForm>,
) -> AppResult<Redirect> {
    let target = sanitize_return_to(form.return_to.as_deref());
    let title = form.title.trim();
    if title.is_empty() {
        return Ok(Redirect::to(&target));
    }

    let pool = require_pool(&state)?;
    let mut conn = pool.get().await?;

    let input = NewTaskInput {
        title: title.to_string(),
        description: blank_to_none(form.description),
        category_id: parse_uuid(form.category_id),
        priority: form
            .priority
            .as_deref()
            .and_then(Priority::parse)
            .unwrap_or_default(),
        due_date: parse_date(form.due_date),
        planned_date: parse_date(form.planned_date),
    };
    db::tasks::create(&mut conn, &input).await?;

    Ok(Redirect::to(&target))
}

#[derive(Debug, Deserialize)]
struct ReturnForm {
    return_to: Option<String>,
}

async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ReturnForm>,
) -> AppResult<Redirect> {
    let pool = require_pool(&state)?;
    let mut conn = pool.get().await?;
    db::tasks::complete(&mut conn, id).await?;

    Ok(Redirect::to(&sanitize_return_to(form.return_to.as_deref())))
}

#[derive(Debug, Deserialize)]
struct EditTaskForm {
    category_id: Option<String>,
    priority: Option<String>,
    return_to: Option<String>,
}

async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<EditTaskForm>,
) -> AppResult<Redirect> {
    let pool = require_pool(&state)?;
    let mut conn = pool.get().await?;

    let priority = form
        .priority
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or_default();
    db::tasks::set_category_priority(&mut conn, id, parse_uuid(form.category_id), priority)
        .await?;

    Ok(Redirect::to(&sanitize_return_to(form.return_to.as_deref())))
}

#[derive(Debug, Deserialize)]
struct PlannedDateForm {
    planned_date: Option<String>,
    return_to: Option<String>,
}

async fn set_planned_date(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<PlannedDateForm>,
) -> AppResult<Redirect> {
    let pool = require_pool(&state)?;
    let mut conn = pool.get().await?;
    db::tasks::set_planned_date(&mut conn, id, parse_date(form.planned_date)).await?;

    Ok(Redirect::to(&sanitize_return_to(form.return_to.as_deref())))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ReturnForm>,
) -> AppResult<Redirect> {
    let pool = require_pool(&state)?;
    let mut conn = pool.get().await?;
    db::tasks::delete(&mut conn, id).await?;

    Ok(Redirect::to(&sanitize_return_to(form.return_to.as_deref())))
}

#[derive(Debug, Deserialize)]
struct NewCategoryForm {
    name: Option<String>,
    return_to: Option<String>,
}

async fn create_category(
    State(state): State<AppState>,
    Form(form): Form<NewCategoryForm>,
) -> AppResult<Redirect> {
    let target = sanitize_return_to(form.return_to.as_deref());
    let Some(name) = blank_to_none(form.name) else {
        return Ok(Redirect::to(&target));
    };

    let pool = require_pool(&state)?;
    let mut conn = pool.get().await?;
    db::categories::create(&mut conn, &name).await?;

    Ok(Redirect::to(&target))
}

fn require_pool(state: &AppState) -> Result<&DbPool, AppError> {
    state
        .pool
        .as_ref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not configured".to_string()))
}

fn resolve_status(raw: Option<&str>) -> TaskStatus {
    raw.and_then(TaskStatus::parse).unwrap_or(TaskStatus::Open)
}

/// `none` selects uncategorized tasks, `all` (or nothing, or junk that is
/// not a UUID) selects everything, anything else is an exact category id.
fn resolve_category(raw: Option<&str>) -> CategoryFilter {
    match raw {
        None | Some("") | Some("all") => CategoryFilter::Any,
        Some("none") => CategoryFilter::None,
        Some(other) => Uuid::parse_str(other)
            .map(CategoryFilter::Id)
            .unwrap_or(CategoryFilter::Any),
    }
}

fn category_token(filter: CategoryFilter) -> String {
    match filter {
        CategoryFilter::Any => "all".to_string(),
        CategoryFilter::None => "none".to_string(),
        CategoryFilter::Id(id) => id.to_string(),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_uuid(value: Option<String>) -> Option<Uuid> {
    blank_to_none(value).and_then(|s| Uuid::parse_str(&s).ok())
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    blank_to_none(value).and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

/// Redirect targets come from the page's own hidden fields but are still
/// user-supplied; only local paths are followed.
fn sanitize_return_to(raw: Option<&str>) -> String {
    match raw {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}
