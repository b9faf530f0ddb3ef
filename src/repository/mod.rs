//! Repository layer: the persistence port and its implementations

pub mod authors;
pub mod books;
pub mod categories;
pub mod copies;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, Book, BookCopy, Category, CopyFilter, NewAuthor, NewBook, NewCategory,
        UpdateBook, UserId,
    },
};

pub use memory::MemoryStore;

/// Persistence operations the catalog services rely on.
///
/// Implementations enforce the referential rules: deleting an author clears
/// `author_id` on its books, deleting a book is refused while copies
/// reference it, and forgetting a user clears `borrower` on their copies.
/// Copy listings use the default copy order (due date ascending, undated
/// first, then id).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_category(&self, category: &NewCategory) -> AppResult<Category>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn delete_category(&self, id: i32) -> AppResult<()>;

    async fn create_author(&self, author: &NewAuthor) -> AppResult<Author>;
    async fn get_author(&self, id: i32) -> AppResult<Option<Author>>;
    /// Authors ordered by last name, first name
    async fn list_authors(&self) -> AppResult<Vec<Author>>;
    async fn save_author(&self, author: &Author) -> AppResult<()>;
    async fn delete_author(&self, id: i32) -> AppResult<()>;
    async fn count_authors(&self) -> AppResult<i64>;

    /// `book.year` must already be resolved
    async fn create_book(&self, book: &NewBook) -> AppResult<Book>;
    async fn get_book(&self, id: i32) -> AppResult<Option<Book>>;
    /// Books ordered by id
    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn update_book(&self, id: i32, update: &UpdateBook) -> AppResult<Book>;
    async fn delete_book(&self, id: i32) -> AppResult<()>;
    async fn count_books(&self) -> AppResult<i64>;

    async fn create_copy(&self, copy: &BookCopy) -> AppResult<()>;
    async fn get_copy(&self, id: Uuid) -> AppResult<Option<BookCopy>>;
    async fn find_copies(&self, filter: &CopyFilter) -> AppResult<Vec<BookCopy>>;
    async fn count_copies(&self, filter: &CopyFilter) -> AppResult<i64>;
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;
    async fn delete_copy(&self, id: Uuid) -> AppResult<()>;
    /// Clear `borrower` wherever it points at a deleted user; returns the number of copies touched
    async fn detach_borrower(&self, user: UserId) -> AppResult<u64>;
}

/// Postgres-backed repository holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub categories: categories::CategoriesRepository,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub copies: copies::CopiesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            categories: categories::CategoriesRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            pool,
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Integrity constraint a database error tripped over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

impl Violation {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            UNIQUE_VIOLATION => Some(Violation::Unique),
            FOREIGN_KEY_VIOLATION => Some(Violation::ForeignKey),
            _ => None,
        }
    }

    pub(crate) fn of(error: &sqlx::Error) -> Option<Self> {
        match error {
            sqlx::Error::Database(db_error) => db_error.code().as_deref().and_then(Self::from_code),
            _ => None,
        }
    }
}

/// Duplicates become conflicts, dangling references become not-found;
/// everything else stays a database error
pub(crate) fn map_constraint_error(error: sqlx::Error, duplicate: &str, missing: &str) -> AppError {
    match Violation::of(&error) {
        Some(Violation::Unique) => AppError::Conflict(duplicate.to_string()),
        Some(Violation::ForeignKey) => AppError::NotFound(missing.to_string()),
        None => AppError::Database(error),
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn create_category(&self, category: &NewCategory) -> AppResult<Category> {
        self.categories.create(category).await
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.categories.list().await
    }

    async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.categories.delete(id).await
    }

    async fn create_author(&self, author: &NewAuthor) -> AppResult<Author> {
        self.authors.create(author).await
    }

    async fn get_author(&self, id: i32) -> AppResult<Option<Author>> {
        self.authors.get_by_id(id).await
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.authors.list().await
    }

    async fn save_author(&self, author: &Author) -> AppResult<()> {
        self.authors.update(author).await
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.authors.delete(id).await
    }

    async fn count_authors(&self) -> AppResult<i64> {
        self.authors.count().await
    }

    async fn create_book(&self, book: &NewBook) -> AppResult<Book> {
        self.books.create(book).await
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list(None).await
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        self.books.list(Some(author_id)).await
    }

    async fn update_book(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        self.books.update(id, update).await
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await
    }

    async fn count_books(&self) -> AppResult<i64> {
        self.books.count().await
    }

    async fn create_copy(&self, copy: &BookCopy) -> AppResult<()> {
        self.copies.create(copy).await
    }

    async fn get_copy(&self, id: Uuid) -> AppResult<Option<BookCopy>> {
        self.copies.get_by_id(id).await
    }

    async fn find_copies(&self, filter: &CopyFilter) -> AppResult<Vec<BookCopy>> {
        self.copies.find(filter).await
    }

    async fn count_copies(&self, filter: &CopyFilter) -> AppResult<i64> {
        self.copies.count(filter).await
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        self.copies.set_due_back(id, due_back).await
    }

    async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        self.copies.delete(id).await
    }

    async fn detach_borrower(&self, user: UserId) -> AppResult<u64> {
        self.copies.detach_borrower(user).await
    }
}
