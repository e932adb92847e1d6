//! Connection pool and the two table access modules.
//!
//! Managed Postgres providers require TLS, so the pool is built with a
//! rustls custom setup rather than the default connector.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    // The connection task drives the socket until the client is dropped.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

pub fn build_connection_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup =
        Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
        database_url,
        manager_config,
    );
    let pool = Pool::builder(config).build()?;

    Ok(pool)
}

/// Name given to the category seeded into an empty store.
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorised";

// Category database operations
pub mod categories {
    use super::*;
    use crate::models::Category;

    /// All categories, ordered for display.
    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Category>> {
        use crate::schema::categories::dsl::*;

        let rows = categories
            .select(Category::as_select())
            .order_by(sort_order.asc())
            .load::<Category>(conn)
            .await?;

        Ok(rows)
    }

    pub async fn create(conn: &mut AsyncPgConnection, category_name: &str) -> anyhow::Result<Category> {
        use crate::schema::categories::dsl::*;

        let created = diesel::insert_into(categories)
            .values((name.eq(category_name), sort_order.eq(0)))
            .returning(Category::as_returning())
            .get_result::<Category>(conn)
            .await?;

        Ok(created)
    }

    /// Seed an "Uncategorised" category into an empty store. Listing errors
    /// propagate; the insert itself is best-effort and failure degrades to
    /// an unseeded store rather than blocking the page.
    pub async fn ensure_default(conn: &mut AsyncPgConnection) -> anyhow::Result<Option<Category>> {
        let existing = list_all(conn).await?;
        if !existing.is_empty() {
            return Ok(None);
        }

        match create(conn, DEFAULT_CATEGORY_NAME).await {
            Ok(category) => Ok(Some(category)),
            Err(e) => {
                tracing::warn!("Failed to seed default category: {:?}", e);
                Ok(None)
            }
        }
    }
}

// Task database operations
pub mod tasks {
    use super::*;
    use crate::filters::apply_view;
    use chrono::NaiveDate;
    use crate::models::{
        CategoryFilter, CategoryRef, NewTaskInput, Priority, Task, TaskChanges, TaskFilters,
        TaskRow, TaskSource, TaskStatus,
    };
    use uuid::Uuid;

    /// Fetch tasks matching the filter configuration. Status and category
    /// narrow the query; the view window is applied in process afterwards.
    /// Each task carries its joined category, normalized in one place.
    pub async fn list(
        conn: &mut AsyncPgConnection,
        filters: &TaskFilters,
    ) -> anyhow::Result<Vec<Task>> {
        use crate::schema::{categories, tasks};

        let mut query = tasks::table
            .left_join(categories::table)
            .select((TaskRow::as_select(), Option::<CategoryRef>::as_select()))
            .order((tasks::sort_order.asc(), tasks::created_at.desc()))
            .into_boxed();

        if let Some(status) = filters.status {
            query = query.filter(tasks::status.eq(status.as_str()));
        }

        match filters.category {
            CategoryFilter::Any => {}
            CategoryFilter::None => query = query.filter(tasks::category_id.is_null()),
            CategoryFilter::Id(cid) => query = query.filter(tasks::category_id.eq(cid)),
        }

        let rows: Vec<(TaskRow, Option<CategoryRef>)> = query.load(conn).await?;
        let loaded = rows
            .into_iter()
            .map(|(row, category)| Task::from_row(row, category))
            .collect();

        match filters.view {
            Some(view) => Ok(apply_view(loaded, view, Utc::now().date_naive())),
            None => Ok(loaded),
        }
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        input: &NewTaskInput,
    ) -> anyhow::Result<Task> {
        use crate::schema::tasks::dsl::*;

        let row = diesel::insert_into(tasks)
            .values((
                title.eq(input.title.as_str()),
                description.eq(input.description.as_deref()),
                source.eq(TaskSource::Manual.as_str()),
                category_id.eq(input.category_id),
                priority.eq(input.priority.as_str()),
                sort_order.eq(0),
                status.eq(TaskStatus::Open.as_str()),
                due_date.eq(input.due_date),
                planned_date.eq(input.planned_date),
            ))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(conn)
            .await?;

        with_category(conn, row).await
    }

    /// Apply a partial update. A change that sets status to done stamps
    /// `completed_at` with the current time before the update is sent.
    pub async fn update(
        conn: &mut AsyncPgConnection,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> anyhow::Result<Task> {
        use crate::schema::tasks::dsl::*;

        let changes = changes.stamped(Utc::now());
        let row = diesel::update(tasks.filter(id.eq(task_id)))
            .set(&changes)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(conn)
            .await?;

        with_category(conn, row).await
    }

    pub async fn delete(conn: &mut AsyncPgConnection, task_id: Uuid) -> anyhow::Result<()> {
        use crate::schema::tasks::dsl::*;

        diesel::delete(tasks.filter(id.eq(task_id)))
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn complete(conn: &mut AsyncPgConnection, task_id: Uuid) -> anyhow::Result<Task> {
        update(conn, task_id, TaskChanges::status(TaskStatus::Done)).await
    }

    pub async fn set_category_priority(
        conn: &mut AsyncPgConnection,
        task_id: Uuid,
        category: Option<Uuid>,
        priority: Priority,
    ) -> anyhow::Result<Task> {
        update(conn, task_id, TaskChanges::category_priority(category, priority)).await
    }

    pub async fn set_planned_date(
        conn: &mut AsyncPgConnection,
        task_id: Uuid,
        date: Option<NaiveDate>,
    ) -> anyhow::Result<Task> {
        update(conn, task_id, TaskChanges::planned_date(date)).await
    }

    /// Join the category reference onto a freshly written row.
    async fn with_category(conn: &mut AsyncPgConnection, row: TaskRow) -> anyhow::Result<Task> {
        let category = match row.category_id {
            Some(cid) => {
                use crate::schema::categories::dsl::*;
                categories
                    .filter(id.eq(cid))
                    .select(CategoryRef::as_select())
                    .first::<CategoryRef>(conn)
                    .await
                    .optional()?
            }
            None => None,
        };

        Ok(Task::from_row(row, category))
    }
}
