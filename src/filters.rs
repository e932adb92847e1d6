//! View-window filtering over fetched tasks.
//!
//! The window is applied in process after the database query, against each
//! task's effective planned date: `planned_date` if set, else `due_date`.

use chrono::{Days, NaiveDate};

use crate::models::{Task, ViewWindow};

/// The date a task is judged by: `planned_date` wins over `due_date`.
pub fn effective_planned_date(task: &Task) -> Option<NaiveDate> {
    task.planned_date.or(task.due_date)
}

/// Whether an effective date falls inside the given window, relative to
/// `today` (UTC). `someday` is the complement of the dated windows: no
/// effective date at all, or strictly beyond `today + 7`.
pub fn matches_view(effective: Option<NaiveDate>, view: ViewWindow, today: NaiveDate) -> bool {
    let tomorrow = today + Days::new(1);
    let week_end = today + Days::new(7);

    match view {
        ViewWindow::Someday => match effective {
            None => true,
            Some(date) => date > week_end,
        },
        ViewWindow::Today => effective == Some(today),
        ViewWindow::Tomorrow => effective == Some(tomorrow),
        ViewWindow::Week => effective.is_some_and(|date| date >= today && date <= week_end),
    }
}

/// Narrow a task list to one view window.
pub fn apply_view(tasks: Vec<Task>, view: ViewWindow, today: NaiveDate) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| matches_view(effective_planned_date(task), view, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskSource, TaskStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn task_with_dates(planned: Option<NaiveDate>, due: Option<NaiveDate>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            source: TaskSource::Manual,
            source_ref: None,
            category_id: None,
            priority: Priority::Medium,
            sort_order: 0,
            status: TaskStatus::Open,
            created_at: Utc::now(),
            completed_at: None,
            due_date: due,
            planned_date: planned,
            raw_snippet: None,
            category: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn test_planned_date_wins_over_due_date() {
        let task = task_with_dates(Some(date("2026-03-01")), Some(date("2026-04-01")));
        assert_eq!(effective_planned_date(&task), Some(date("2026-03-01")));

        let task = task_with_dates(None, Some(date("2026-04-01")));
        assert_eq!(effective_planned_date(&task), Some(date("2026-04-01")));

        let task = task_with_dates(None, None);
        assert_eq!(effective_planned_date(&task), None);
    }

    #[test]
    fn test_today_and_tomorrow_are_exact_matches() {
        let today = date("2026-03-10");
        assert!(matches_view(Some(today), ViewWindow::Today, today));
        assert!(!matches_view(Some(date("2026-03-11")), ViewWindow::Today, today));
        assert!(matches_view(
            Some(date("2026-03-11")),
            ViewWindow::Tomorrow,
            today
        ));
        assert!(!matches_view(None, ViewWindow::Today, today));
        assert!(!matches_view(None, ViewWindow::Tomorrow, today));
    }

    #[test]
    fn test_week_window_is_inclusive_of_both_ends() {
        let today = date("2026-03-10");
        assert!(matches_view(Some(today), ViewWindow::Week, today));
        assert!(matches_view(Some(date("2026-03-17")), ViewWindow::Week, today));
        assert!(!matches_view(Some(date("2026-03-18")), ViewWindow::Week, today));
        assert!(!matches_view(Some(date("2026-03-09")), ViewWindow::Week, today));
    }

    #[test]
    fn test_someday_takes_undated_and_far_future() {
        let today = date("2026-03-10");
        assert!(matches_view(None, ViewWindow::Someday, today));
        assert!(matches_view(Some(date("2026-03-18")), ViewWindow::Someday, today));
        assert!(!matches_view(Some(date("2026-03-17")), ViewWindow::Someday, today));
        assert!(!matches_view(Some(today), ViewWindow::Someday, today));
    }

    // Past dates land in no dated window; they only ever show under "all".
    #[test]
    fn test_past_dates_fall_outside_every_window() {
        let today = date("2026-03-10");
        let yesterday = Some(date("2026-03-09"));
        for view in [
            ViewWindow::Today,
            ViewWindow::Tomorrow,
            ViewWindow::Week,
            ViewWindow::Someday,
        ] {
            assert!(!matches_view(yesterday, view, today), "{view:?}");
        }
    }

    #[test]
    fn test_week_and_someday_partition_future_dates() {
        let today = date("2026-03-10");
        // week and someday are complementary over dates >= today.
        for offset in 0..20u64 {
            let effective = Some(today + Days::new(offset));
            let in_week = matches_view(effective, ViewWindow::Week, today);
            let in_someday = matches_view(effective, ViewWindow::Someday, today);
            assert!(in_week != in_someday, "offset {offset}");
        }
        assert!(matches_view(None, ViewWindow::Someday, today));
    }

    #[test]
    fn test_apply_view_filters_list() {
        let today = date("2026-03-10");
        let tasks = vec![
            task_with_dates(Some(today), None),
            task_with_dates(None, Some(today)),
            task_with_dates(Some(date("2026-03-11")), None),
            task_with_dates(None, None),
        ];
        let filtered = apply_view(tasks, ViewWindow::Today, today);
        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .iter()
            .all(|t| effective_planned_date(t) == Some(today)));
    }
}
