//! Catalog management service: categories, authors, books and copies

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::current_year, Author, Book, BookCopy, Category, CopyFilter, CopyStatus, NewAuthor,
        NewBook, NewCategory, NewCopy, UpdateAuthor, UpdateBook, UserId,
    },
};

use super::Store;

/// Headline counts for the catalog home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_copies: i64,
    pub num_copies_available: i64,
    pub num_authors: i64,
}

/// An author with the books attributed to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorDetails {
    pub author: Author,
    pub books: Vec<Book>,
}

/// A book with its author and physical copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetails {
    pub book: Book,
    pub author: Option<Author>,
    pub copies: Vec<BookCopy>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Store,
}

impl CatalogService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        Ok(CatalogSummary {
            num_books: self.store.count_books().await?,
            num_copies: self.store.count_copies(&CopyFilter::default()).await?,
            num_copies_available: self
                .store
                .count_copies(&CopyFilter {
                    status: Some(CopyStatus::Available),
                    ..Default::default()
                })
                .await?,
            num_authors: self.store.count_authors().await?,
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn create_category(&self, category: NewCategory) -> AppResult<Category> {
        category.validate()?;
        let created = self.store.create_category(&category).await?;
        tracing::info!(category_id = created.id, "category created");
        Ok(created)
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.store.delete_category(id).await?;
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }

    // =========================================================================
    // Authors
    // =========================================================================

    pub async fn create_author(&self, author: NewAuthor) -> AppResult<Author> {
        author.validate()?;
        let created = self.store.create_author(&author).await?;
        tracing::info!(author_id = created.id, "author created");
        Ok(created)
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.store
            .get_author(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    pub async fn author_details(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.get_author(id).await?;
        let books = self.store.books_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    /// Authors by last name, first name
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.store.list_authors().await
    }

    pub async fn update_author(&self, id: i32, update: UpdateAuthor) -> AppResult<Author> {
        update.validate()?;
        let mut author = self.get_author(id).await?;
        update.apply(&mut author);
        self.store.save_author(&author).await?;
        tracing::info!(author_id = id, "author updated");
        Ok(author)
    }

    /// Delete an author; their books remain without an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.store.delete_author(id).await?;
        tracing::info!(author_id = id, "author deleted");
        Ok(())
    }

    // =========================================================================
    // Books
    // =========================================================================

    pub async fn create_book(&self, mut book: NewBook) -> AppResult<Book> {
        book.validate()?;
        self.check_author(book.author_id).await?;
        book.year = Some(book.year.unwrap_or_else(current_year));

        let created = self.store.create_book(&book).await?;
        tracing::info!(book_id = created.id, isbn = %created.isbn, "book created");
        Ok(created)
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.store
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn book_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.get_book(id).await?;
        let author = match book.author_id {
            Some(author_id) => self.store.get_author(author_id).await?,
            None => None,
        };
        let copies = self.store.find_copies(&CopyFilter::of_book(id)).await?;
        Ok(BookDetails { book, author, copies })
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.list_books().await
    }

    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        if let Some(author_id) = update.author_id {
            self.check_author(author_id).await?;
        }
        let updated = self.store.update_book(id, &update).await?;
        tracing::info!(book_id = id, "book updated");
        Ok(updated)
    }

    /// Delete a book. Refused with `Conflict` while copies of it exist.
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.store.delete_book(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    async fn check_author(&self, author_id: Option<i32>) -> AppResult<()> {
        if let Some(id) = author_id {
            self.get_author(id).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Copies
    // =========================================================================

    pub async fn create_copy(&self, copy: NewCopy) -> AppResult<BookCopy> {
        copy.validate()?;
        self.get_book(copy.book_id).await?;

        let copy = copy.into_copy();
        self.store.create_copy(&copy).await?;
        tracing::info!(copy_id = %copy.id, book_id = copy.book_id, "copy created");
        Ok(copy)
    }

    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_copy(id).await?;
        tracing::info!(copy_id = %id, "copy deleted");
        Ok(())
    }

    /// Forget a deleted user account: their copies lose the borrower
    pub async fn forget_borrower(&self, user: UserId) -> AppResult<u64> {
        let touched = self.store.detach_borrower(user).await?;
        tracing::info!(user_id = %user, copies = touched, "borrower detached");
        Ok(touched)
    }
}
