//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book with resolved author name, as returned by the API.
///
/// `author` is the denormalized display name stored on the row; `author_name`
/// is the linked author's current name when a link exists, falling back to
/// the denormalized field otherwise.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub quantity: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
}

/// Book search filters; all optional, combined with AND
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive substring match on title
    pub title: Option<String>,
    /// Case-insensitive substring match on the denormalized author field
    /// or the linked author's name
    pub author: Option<String>,
    /// Case-insensitive substring match on category
    pub category: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author must be 1-100 characters"))]
    pub author: String,
    #[validate(length(max = 20, message = "ISBN cannot exceed 20 characters"))]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Quantity must be 0 or greater"))]
    pub quantity: i32,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Category cannot exceed 50 characters"))]
    pub category: Option<String>,
    pub author_id: Option<i32>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author must be 1-100 characters"))]
    pub author: String,
    #[validate(length(max = 20, message = "ISBN cannot exceed 20 characters"))]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Quantity must be 0 or greater"))]
    pub quantity: i32,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Category cannot exceed 50 characters"))]
    pub category: Option<String>,
    pub author_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_book() -> CreateBook {
        CreateBook {
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            isbn: Some("9780451524935".to_string()),
            published_date: None,
            quantity: 4,
            description: None,
            category: Some("Science Fiction".to_string()),
            author_id: None,
        }
    }

    #[test]
    fn valid_book_passes() {
        assert!(valid_book().validate().is_ok());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut book = valid_book();
        book.quantity = -1;
        assert!(book.validate().is_err());
    }

    #[test]
    fn title_bounds() {
        let mut book = valid_book();
        book.title = String::new();
        assert!(book.validate().is_err());

        book.title = "x".repeat(201);
        assert!(book.validate().is_err());
    }

    #[test]
    fn isbn_bound() {
        let mut book = valid_book();
        book.isbn = Some("x".repeat(21));
        assert!(book.validate().is_err());

        book.isbn = None;
        assert!(book.validate().is_ok());
    }
}
