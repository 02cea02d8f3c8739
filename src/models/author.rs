//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::book::BookDto;

/// Full author model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author with the number of associated books, for listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of books associated at read time
    pub book_count: i64,
}

/// Author with its full book list
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorWithBooks {
    pub id: i32,
    pub name: String,
    pub biography: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub books: Vec<BookDto>,
}

/// Minimal author representation for selection lists
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AuthorOption {
    pub id: i32,
    pub name: String,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Biography cannot exceed 1000 characters"))]
    pub biography: Option<String>,
}

/// Update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Biography cannot exceed 1000 characters"))]
    pub biography: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn author_name_bounds() {
        let ok = CreateAuthor {
            name: "Jane Doe".to_string(),
            biography: None,
        };
        assert!(ok.validate().is_ok());

        let empty = CreateAuthor {
            name: String::new(),
            biography: None,
        };
        assert!(empty.validate().is_err());

        let too_long = CreateAuthor {
            name: "x".repeat(101),
            biography: None,
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn biography_bound() {
        let too_long = CreateAuthor {
            name: "Jane Doe".to_string(),
            biography: Some("x".repeat(1001)),
        };
        assert!(too_long.validate().is_err());

        let at_limit = CreateAuthor {
            name: "Jane Doe".to_string(),
            biography: Some("x".repeat(1000)),
        };
        assert!(at_limit.validate().is_ok());
    }
}
