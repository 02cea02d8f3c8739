//! Books repository for database operations
//!
//! Every read joins the linked author so the resolved display name comes back
//! in one query. ISBN uniqueness applies to non-empty values only and is
//! checked in the same transaction as the write; a partial unique index backs
//! it against concurrent writers.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDto, BookQuery, CreateBook, UpdateBook},
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.isbn, b.published_date, b.quantity,
           b.description, b.category, b.created_at, b.updated_at, b.author_id,
           COALESCE(a.name, b.author) AS author_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books ordered by title
    pub async fn list(&self) -> AppResult<Vec<BookDto>> {
        let books = sqlx::query_as::<_, BookDto>(&format!("{} ORDER BY b.title", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookDto> {
        sqlx::query_as::<_, BookDto>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// List books associated with an author, ordered by title
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookDto>> {
        let books = sqlx::query_as::<_, BookDto>(&format!(
            "{} WHERE b.author_id = $1 ORDER BY b.title",
            BOOK_SELECT
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Search books; each supplied filter is a case-insensitive substring
    /// match, combined with AND
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<BookDto>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            if !title.is_empty() {
                params.push(format!("%{}%", title.to_lowercase()));
                conditions.push(format!("LOWER(b.title) LIKE ${}", params.len()));
            }
        }

        if let Some(ref author) = query.author {
            if !author.is_empty() {
                params.push(format!("%{}%", author.to_lowercase()));
                conditions.push(format!(
                    "(LOWER(b.author) LIKE ${} OR LOWER(a.name) LIKE ${})",
                    params.len(),
                    params.len()
                ));
            }
        }

        if let Some(ref category) = query.category {
            if !category.is_empty() {
                params.push(format!("%{}%", category.to_lowercase()));
                conditions.push(format!("LOWER(b.category) LIKE ${}", params.len()));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_query = format!("{} {} ORDER BY b.title", BOOK_SELECT, where_clause);

        let mut builder = sqlx::query_as::<_, BookDto>(&select_query);
        for param in &params {
            builder = builder.bind(param);
        }
        let books = builder.fetch_all(&self.pool).await?;

        Ok(books)
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<BookDto> {
        let mut tx = self.pool.begin().await?;

        let isbn = book.isbn.as_deref().filter(|s| !s.is_empty());
        if let Some(isbn) = isbn {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                    .bind(isbn)
                    .fetch_one(&mut *tx)
                    .await?;
            if exists {
                return Err(AppError::Duplicate(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        // A supplied author link must resolve, and the denormalized display
        // name follows the linked author's current name
        let mut author_name = book.author.clone();
        if let Some(author_id) = book.author_id {
            let name: Option<String> = sqlx::query_scalar("SELECT name FROM authors WHERE id = $1")
                .bind(author_id)
                .fetch_optional(&mut *tx)
                .await?;
            author_name = name.ok_or_else(|| {
                AppError::Validation("Selected author does not exist".to_string())
            })?;
        }

        let now = Utc::now();
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, isbn, published_date, quantity,
                               description, category, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&author_name)
        .bind(isbn)
        .bind(book.published_date)
        .bind(book.quantity)
        .bind(&book.description)
        .bind(&book.category)
        .bind(book.author_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Update an existing book; `created_at` is preserved
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<BookDto> {
        let mut tx = self.pool.begin().await?;

        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !found {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let isbn = book.isbn.as_deref().filter(|s| !s.is_empty());
        if let Some(isbn) = isbn {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)",
            )
            .bind(isbn)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if exists {
                return Err(AppError::Duplicate(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        let mut author_name = book.author.clone();
        if let Some(author_id) = book.author_id {
            let name: Option<String> = sqlx::query_scalar("SELECT name FROM authors WHERE id = $1")
                .bind(author_id)
                .fetch_optional(&mut *tx)
                .await?;
            author_name = name.ok_or_else(|| {
                AppError::Validation("Selected author does not exist".to_string())
            })?;
        }

        sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author = $2, isbn = $3, published_date = $4,
                quantity = $5, description = $6, category = $7, author_id = $8,
                updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&book.title)
        .bind(&author_name)
        .bind(isbn)
        .bind(book.published_date)
        .bind(book.quantity)
        .bind(&book.description)
        .bind(&book.category)
        .bind(book.author_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Delete a book; unconditional, books have no dependents
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        Ok(())
    }
}
