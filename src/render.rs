//! Server-side rendering of the single page.
//!
//! One minijinja environment with one embedded template; everything the
//! template needs (links with prebuilt query strings, the filter state,
//! the task list) is assembled here into a serializable context.

use std::sync::OnceLock;

use minijinja::Environment;
use serde::Serialize;

use crate::models::{Category, Task, TaskStatus, ViewWindow};

const VIEW_CHOICES: &[(&str, &str)] = &[
    ("all", "All"),
    ("today", "Today"),
    ("tomorrow", "Tomorrow"),
    ("week", "This week"),
    ("someday", "Some day"),
];

const STATUS_CHOICES: &[(&str, &str)] = &[("open", "Open"), ("done", "Done")];

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Everything the index template renders from.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub error: Option<String>,
    pub view: String,
    pub status: String,
    pub category_param: String,
    pub view_links: Vec<NavLink>,
    pub status_links: Vec<NavLink>,
    pub categories: Vec<Category>,
    pub tasks: Vec<Task>,
    /// The current path with query string; form posts carry it back so the
    /// redirect lands on the same filtered view.
    pub current_path: String,
}

impl PageContext {
    pub fn new(
        view: Option<ViewWindow>,
        status: TaskStatus,
        category_param: &str,
        categories: Vec<Category>,
        tasks: Vec<Task>,
        error: Option<String>,
    ) -> Self {
        let view_token = view.map_or("all", |v| v.as_str());
        let status_token = status.as_str();

        let view_links = VIEW_CHOICES
            .iter()
            .copied()
            .map(|(token, label)| NavLink {
                label,
                href: build_query_string(token, status_token, category_param),
                active: token == view_token,
            })
            .collect();

        let status_links = STATUS_CHOICES
            .iter()
            .copied()
            .map(|(token, label)| NavLink {
                label,
                href: build_query_string(view_token, token, category_param),
                active: token == status_token,
            })
            .collect();

        PageContext {
            error,
            view: view_token.to_string(),
            status: status_token.to_string(),
            category_param: category_param.to_string(),
            view_links,
            status_links,
            categories,
            tasks,
            current_path: build_query_string(view_token, status_token, category_param),
        }
    }
}

/// Build a root-relative path, omitting parameters at their defaults so the
/// unfiltered page stays at plain `/`.
pub fn build_query_string(view: &str, status: &str, category: &str) -> String {
    let mut params: Vec<String> = Vec::new();
    if view != "all" {
        params.push(format!("view={view}"));
    }
    if status != "open" {
        params.push(format!("status={status}"));
    }
    if !category.is_empty() && category != "all" {
        params.push(format!("category={category}"));
    }

    if params.is_empty() {
        "/".to_string()
    } else {
        format!("/?{}", params.join("&"))
    }
}

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../templates/index.html"))
            .expect("embedded index template must parse");
        env
    })
}

pub fn render_index(ctx: &PageContext) -> Result<String, minijinja::Error> {
    let template = environment().get_template("index.html")?;
    template.render(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryRef, Priority, TaskSource};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn sample_category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn sample_task(title: &str, status: TaskStatus, category: Option<CategoryRef>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            source: TaskSource::Manual,
            source_ref: None,
            category_id: category.as_ref().map(|c| c.id),
            priority: Priority::Medium,
            sort_order: 0,
            status,
            created_at: Utc::now(),
            completed_at: None,
            due_date: None,
            planned_date: NaiveDate::from_ymd_opt(2026, 3, 10),
            raw_snippet: None,
            category,
        }
    }

    #[test]
    fn test_build_query_string_omits_defaults() {
        assert_eq!(build_query_string("all", "open", "all"), "/");
        assert_eq!(build_query_string("all", "open", ""), "/");
        assert_eq!(build_query_string("today", "open", "all"), "/?view=today");
        assert_eq!(build_query_string("all", "done", ""), "/?status=done");
        assert_eq!(
            build_query_string("week", "done", "none"),
            "/?view=week&status=done&category=none"
        );
    }

    #[test]
    fn test_context_marks_active_links() {
        let ctx = PageContext::new(
            Some(ViewWindow::Today),
            TaskStatus::Done,
            "all",
            vec![],
            vec![],
            None,
        );
        let active_views: Vec<_> = ctx
            .view_links
            .iter()
            .filter(|l| l.active)
            .map(|l| l.label)
            .collect();
        assert_eq!(active_views, vec!["Today"]);
        assert_eq!(ctx.current_path, "/?view=today&status=done");
    }

    #[test]
    fn test_render_lists_tasks_and_categories() {
        let category = sample_category("Meetings");
        let cat_ref = CategoryRef {
            id: category.id,
            name: category.name.clone(),
        };
        let ctx = PageContext::new(
            None,
            TaskStatus::Open,
            "all",
            vec![category],
            vec![
                sample_task("Ping Alice", TaskStatus::Open, Some(cat_ref)),
                sample_task("Write minutes", TaskStatus::Open, None),
            ],
            None,
        );

        let html = render_index(&ctx).expect("should render");
        assert!(html.contains("Ping Alice"));
        assert!(html.contains("Write minutes"));
        assert!(html.contains("Meetings"));
        assert!(html.contains("Open tasks"));
        assert!(!html.contains("class=\"notice\""));
    }

    #[test]
    fn test_render_escapes_task_titles() {
        let ctx = PageContext::new(
            None,
            TaskStatus::Open,
            "all",
            vec![],
            vec![sample_task(
                "<script>alert(1)</script>",
                TaskStatus::Open,
                None,
            )],
            None,
        );

        let html = render_index(&ctx).expect("should render");
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_shows_notice_and_hides_forms_on_error() {
        let ctx = PageContext::new(
            None,
            TaskStatus::Open,
            "all",
            vec![],
            vec![],
            Some("Failed to load. Is the database configured?".to_string()),
        );

        let html = render_index(&ctx).expect("should render");
        assert!(html.contains("Failed to load"));
        assert!(html.contains("sql/schema.sql"));
        assert!(!html.contains("Add task"));
    }

    #[test]
    fn test_render_marks_done_tasks() {
        let ctx = PageContext::new(
            None,
            TaskStatus::Done,
            "all",
            vec![],
            vec![sample_task("Shipped", TaskStatus::Done, None)],
            None,
        );

        let html = render_index(&ctx).expect("should render");
        assert!(html.contains("Done tasks"));
        assert!(html.contains("task done"));
        // Done rows lose their Done button.
        assert!(!html.contains("/complete"));
    }
}
