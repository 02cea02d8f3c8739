//! Catalog management service for authors and books

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDto, AuthorOption, AuthorWithBooks, CreateAuthor, UpdateAuthor},
        book::{BookDto, BookQuery, CreateBook, UpdateBook},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // Authors
    // =========================================================================

    /// List all authors with their book counts
    pub async fn list_authors(&self) -> AppResult<Vec<AuthorDto>> {
        self.repository.authors.list().await
    }

    /// List authors as id/name pairs for selection lists
    pub async fn list_author_options(&self) -> AppResult<Vec<AuthorOption>> {
        self.repository.authors.list_options().await
    }

    /// Get an author with its full book list
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorWithBooks> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;

        Ok(AuthorWithBooks {
            id: author.id,
            name: author.name,
            biography: author.biography,
            created_at: author.created_at,
            updated_at: author.updated_at,
            books,
        })
    }

    /// Create a new author; a fresh author owns no books
    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<AuthorDto> {
        author.validate()?;

        let created = self
            .repository
            .authors
            .create(&author.name, author.biography.as_deref())
            .await?;

        Ok(with_book_count(created, 0))
    }

    /// Update an author, recomputing the book count for the response
    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<AuthorDto> {
        author.validate()?;

        let updated = self
            .repository
            .authors
            .update(id, &author.name, author.biography.as_deref())
            .await?;
        let book_count = self.repository.authors.book_count(id).await?;

        Ok(with_book_count(updated, book_count))
    }

    /// Delete an author; fails while the author still owns books
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// List all books ordered by title
    pub async fn list_books(&self) -> AppResult<Vec<BookDto>> {
        self.repository.books.list().await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<BookDto> {
        self.repository.books.get_by_id(id).await
    }

    /// Search books with optional title/author/category filters
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<Vec<BookDto>> {
        self.repository.books.search(query).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookDto> {
        book.validate()?;
        self.repository.books.create(&book).await
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<BookDto> {
        book.validate()?;
        self.repository.books.update(id, &book).await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}

fn with_book_count(author: Author, book_count: i64) -> AuthorDto {
    AuthorDto {
        id: author.id,
        name: author.name,
        biography: author.biography,
        created_at: author.created_at,
        updated_at: author.updated_at,
        book_count,
    }
}
