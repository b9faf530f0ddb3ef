//! Book (title/edition) model and related types

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::category::Category;

/// Number of category names shown by [`Book::display_category`]
pub const DISPLAYED_CATEGORIES: usize = 3;

/// Internal row structure for book queries (categories are loaded separately)
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub year: i32,
    pub content: String,
    pub isbn: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author_id: row.author_id,
            year: row.year,
            content: row.content,
            isbn: row.isbn,
            categories: Vec::new(),
        }
    }
}

/// A catalog title. Physical copies are [`super::copy::BookCopy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub year: i32,
    pub content: String,
    pub isbn: String,
    /// Categories in the order they were assigned
    pub categories: Vec<Category>,
}

impl Book {
    /// Names of the first three categories, comma separated
    pub fn display_category(&self) -> String {
        self.categories
            .iter()
            .take(DISPLAYED_CATEGORIES)
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Publication year used when none is supplied
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    /// Defaults to the current year
    pub year: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Content is limited to 1000 characters"))]
    pub content: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

/// Update book request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: Option<String>,
    /// `Some(None)` clears the author
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub author_id: Option<Option<i32>>,
    pub year: Option<i32>,
    #[validate(length(max = 1000, message = "Content is limited to 1000 characters"))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1 to 13 characters"))]
    pub isbn: Option<String>,
    /// Replaces the whole category set when present
    pub category_ids: Option<Vec<i32>>,
}

impl UpdateBook {
    /// Apply scalar fields; categories are resolved by the store
    pub fn apply(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(author_id) = self.author_id {
            book.author_id = author_id;
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(ref content) = self.content {
            book.content = content.clone();
        }
        if let Some(ref isbn) = self.isbn {
            book.isbn = isbn.clone();
        }
    }
}
