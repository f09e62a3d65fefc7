use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub posted_by: Uuid,
    pub is_paid: bool,
    pub date_posted: OffsetDateTime,
}

impl Job {
    /// Insert a listing owned by `posted_by`, stamped with the server time.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        title: &str,
        company: &str,
        location: &str,
        description: &str,
        category: &str,
        posted_by: Uuid,
        is_paid: bool,
    ) -> anyhow::Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (title, company, location, description, category, posted_by, is_paid)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, company, location, description, category, posted_by, is_paid, date_posted
            "#,
        )
        .bind(title)
        .bind(company)
        .bind(location)
        .bind(description)
        .bind(category)
        .bind(posted_by)
        .bind(is_paid)
        .fetch_one(db)
        .await?;
        Ok(job)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, description, category, posted_by, is_paid, date_posted
            FROM jobs
            ORDER BY date_posted DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_owner(db: &PgPool, owner: Uuid) -> anyhow::Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, description, category, posted_by, is_paid, date_posted
            FROM jobs
            WHERE posted_by = $1
            ORDER BY date_posted DESC
            "#,
        )
        .bind(owner)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Case-insensitive substring match across title, company, category and
    /// location, newest first.
    pub async fn search(db: &PgPool, term: &str) -> anyhow::Result<Vec<Job>> {
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, description, category, posted_by, is_paid, date_posted
            FROM jobs
            WHERE title ILIKE $1 OR company ILIKE $1 OR category ILIKE $1 OR location ILIKE $1
            ORDER BY date_posted DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, title, company, location, description, category, posted_by, is_paid, date_posted
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(job)
    }
}
