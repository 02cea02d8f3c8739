//! Authors repository for database operations
//!
//! Author name uniqueness is case-insensitive, backed by a unique index on
//! LOWER(name). Checks run in the same transaction as the write.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorDto, AuthorOption},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all authors ordered by name, with their current book count
    pub async fn list(&self) -> AppResult<Vec<AuthorDto>> {
        let authors = sqlx::query_as::<_, AuthorDto>(
            r#"
            SELECT a.id, a.name, a.biography, a.created_at, a.updated_at,
                   (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) AS book_count
            FROM authors a
            ORDER BY a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// List id/name pairs for selection lists, ordered by name
    pub async fn list_options(&self) -> AppResult<Vec<AuthorOption>> {
        let options =
            sqlx::query_as::<_, AuthorOption>("SELECT id, name FROM authors ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(options)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "SELECT id, name, biography, created_at, updated_at FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    /// Number of books currently associated with an author
    pub async fn book_count(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Create a new author
    pub async fn create(&self, name: &str, biography: Option<&str>) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE LOWER(name) = LOWER($1))")
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            return Err(AppError::Duplicate(
                "Author with this name already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let author = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, biography, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, name, biography, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(biography)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(author)
    }

    /// Update an existing author
    pub async fn update(&self, id: i32, name: &str, biography: Option<&str>) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;

        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !found {
            return Err(AppError::NotFound("Author not found".to_string()));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM authors WHERE LOWER(name) = LOWER($1) AND id != $2)",
        )
        .bind(name)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if exists {
            return Err(AppError::Duplicate(
                "Author with this name already exists".to_string(),
            ));
        }

        let author = sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = $1, biography = $2, updated_at = $3
            WHERE id = $4
            RETURNING id, name, biography, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(biography)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(author)
    }

    /// Delete an author, refusing while it still owns books
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !found {
            return Err(AppError::NotFound("Author not found".to_string()));
        }

        let book_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if book_count > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete author. Author has {} book(s) associated. \
                 Please reassign or delete the books first.",
                book_count
            )));
        }

        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
