use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::ServiceError;
use crate::models::{Entry, EntryInput, Tag};
use crate::slug::slugify;

/// Journal entries and the tags attached to them. Every mutation runs in its
/// own transaction so entry rows and tag rows change together.
#[derive(Clone)]
pub struct EntryService {
    db: SqlitePool,
}

impl EntryService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: &str, input: &EntryInput) -> Result<Entry, ServiceError> {
        let slug = slug_for(&input.title)?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.db.begin().await?;

        let entry: Entry = sqlx::query_as(
            r#"
            INSERT INTO entries (user_id, title, date, time_spent, what_i_learned, resources_to_remember, slug, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.title)
        .bind(input.date)
        .bind(input.time_spent)
        .bind(input.what_i_learned.trim())
        .bind(input.resources_to_remember.trim())
        .bind(&slug)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::unique_or(e, || ServiceError::DuplicateSlug(slug.clone())))?;

        for tag in &input.tags {
            ensure_tag(&mut tx, user_id, tag, &slug).await?;
        }

        tx.commit().await?;

        tracing::info!(entry_id = entry.id, slug = %entry.slug, "created entry");
        Ok(entry)
    }

    /// Overwrite every field of an owned entry and replace its tags with
    /// `input.tags` under the recomputed slug.
    pub async fn edit(&self, user_id: &str, id: i64, input: &EntryInput) -> Result<Entry, ServiceError> {
        let slug = slug_for(&input.title)?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.db.begin().await?;

        let existing = owned_entry(&mut tx, user_id, id).await?;

        sqlx::query("DELETE FROM tags WHERE user_id = ? AND post_url = ?")
            .bind(user_id)
            .bind(&existing.slug)
            .execute(&mut *tx)
            .await?;

        for tag in &input.tags {
            ensure_tag(&mut tx, user_id, tag, &slug).await?;
        }

        let entry: Entry = sqlx::query_as(
            r#"
            UPDATE entries
            SET title = ?, date = ?, time_spent = ?, what_i_learned = ?, resources_to_remember = ?, slug = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(input.date)
        .bind(input.time_spent)
        .bind(input.what_i_learned.trim())
        .bind(input.resources_to_remember.trim())
        .bind(&slug)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::unique_or(e, || ServiceError::DuplicateSlug(slug.clone())))?;

        tx.commit().await?;

        tracing::info!(entry_id = entry.id, slug = %entry.slug, "edited entry");
        Ok(entry)
    }

    /// Delete an owned entry together with its tag rows.
    pub async fn delete(&self, user_id: &str, id: i64) -> Result<Entry, ServiceError> {
        let mut tx = self.db.begin().await?;

        let entry = owned_entry(&mut tx, user_id, id).await?;

        sqlx::query("DELETE FROM tags WHERE user_id = ? AND post_url = ?")
            .bind(user_id)
            .bind(&entry.slug)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_foreign_key_violation() => ServiceError::Conflict,
                _ => ServiceError::Database(e),
            })?;

        tx.commit().await?;

        tracing::info!(entry_id = entry.id, slug = %entry.slug, "deleted entry");
        Ok(entry)
    }

    /// The user's entries, newest date first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Entry>, ServiceError> {
        let entries = sqlx::query_as("SELECT * FROM entries WHERE user_id = ? ORDER BY date DESC, id DESC")
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(entries)
    }

    pub async fn detail(&self, user_id: &str, slug: &str) -> Result<(Entry, Vec<Tag>), ServiceError> {
        let entry: Option<Entry> = sqlx::query_as("SELECT * FROM entries WHERE slug = ? AND user_id = ?")
            .bind(slug)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        let entry = entry.ok_or(ServiceError::NotFound)?;

        let tags = self.tags_for(user_id, &entry.slug).await?;
        Ok((entry, tags))
    }

    pub async fn get(&self, user_id: &str, id: i64) -> Result<Entry, ServiceError> {
        let mut conn = self.db.acquire().await?;
        owned_entry(&mut conn, user_id, id).await
    }

    pub async fn tags_for(&self, user_id: &str, slug: &str) -> Result<Vec<Tag>, ServiceError> {
        let tags = sqlx::query_as("SELECT * FROM tags WHERE user_id = ? AND post_url = ? ORDER BY id")
            .bind(user_id)
            .bind(slug)
            .fetch_all(&self.db)
            .await?;
        Ok(tags)
    }
}

fn slug_for(title: &str) -> Result<String, ServiceError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(ServiceError::Validation {
            field: "title",
            message: "Title must contain at least one letter or number".to_string(),
        });
    }
    Ok(slug)
}

async fn owned_entry(conn: &mut SqliteConnection, user_id: &str, id: i64) -> Result<Entry, ServiceError> {
    let entry: Option<Entry> = sqlx::query_as("SELECT * FROM entries WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    entry.ok_or(ServiceError::NotFound)
}

/// Insert a (user, tag, slug) row unless it already exists.
async fn ensure_tag(conn: &mut SqliteConnection, user_id: &str, tag: &str, slug: &str) -> Result<(), ServiceError> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM tags WHERE user_id = ? AND tag = ? AND post_url = ?")
            .bind(user_id)
            .bind(tag)
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

    if existing.is_none() {
        sqlx::query("INSERT INTO tags (user_id, tag, post_url) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(tag)
            .bind(slug)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
