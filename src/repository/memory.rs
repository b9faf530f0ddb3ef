//! In-process catalog store
//!
//! Keeps every entity in memory behind a single lock and applies the same
//! referential rules as the Postgres schema. Used by tests and by embedders
//! that do not need durable storage.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{current_year, BookRow},
        Author, Book, BookCopy, Category, CopyFilter, NewAuthor, NewBook, NewCategory,
        UpdateBook, UserId,
    },
};

use super::CatalogStore;

#[derive(Debug, Clone)]
struct StoredBook {
    row: BookRow,
    category_ids: Vec<i32>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    categories: BTreeMap<i32, Category>,
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, StoredBook>,
    copies: HashMap<Uuid, BookCopy>,
}

impl Tables {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn book(&self, stored: &StoredBook) -> Book {
        let mut book = Book::from(stored.row.clone());
        book.categories = stored
            .category_ids
            .iter()
            .filter_map(|id| self.categories.get(id).cloned())
            .collect();
        book
    }

    fn check_categories(&self, category_ids: &[i32]) -> AppResult<Vec<i32>> {
        let mut ordered = Vec::with_capacity(category_ids.len());
        for id in category_ids {
            if !self.categories.contains_key(id) {
                return Err(AppError::NotFound(format!("Category with id {} not found", id)));
            }
            if !ordered.contains(id) {
                ordered.push(*id);
            }
        }
        Ok(ordered)
    }

    fn check_isbn(&self, isbn: &str, except: Option<i32>) -> AppResult<()> {
        let taken = self
            .books
            .values()
            .any(|b| b.row.isbn == isbn && Some(b.row.id) != except);
        if taken {
            return Err(AppError::Conflict(format!(
                "A book with ISBN {} already exists",
                isbn
            )));
        }
        Ok(())
    }

    fn check_author(&self, author_id: Option<i32>) -> AppResult<()> {
        match author_id {
            Some(id) if !self.authors.contains_key(&id) => {
                Err(AppError::NotFound(format!("Author with id {} not found", id)))
            }
            _ => Ok(()),
        }
    }

    fn sorted_copies(&self, filter: &CopyFilter) -> Vec<BookCopy> {
        let mut copies: Vec<BookCopy> = self
            .copies
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        copies.sort_by_key(|c| c.sort_key());
        copies
    }
}

/// Catalog store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_category(&self, category: &NewCategory) -> AppResult<Category> {
        let mut tables = self.tables.write().await;
        let created = Category {
            id: tables.allocate_id(),
            name: category.name.clone(),
        };
        tables.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn delete_category(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Category with id {} not found", id)));
        }
        for book in tables.books.values_mut() {
            book.category_ids.retain(|c| *c != id);
        }
        Ok(())
    }

    async fn create_author(&self, author: &NewAuthor) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let created = Author {
            id: tables.allocate_id(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            biography: author.biography.clone(),
        };
        tables.authors.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_author(&self, id: i32) -> AppResult<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(authors)
    }

    async fn save_author(&self, author: &Author) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        match tables.authors.get_mut(&author.id) {
            Some(existing) => {
                *existing = author.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Author with id {} not found", author.id))),
        }
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.authors.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        for book in tables.books.values_mut() {
            if book.row.author_id == Some(id) {
                book.row.author_id = None;
            }
        }
        Ok(())
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.authors.len() as i64)
    }

    async fn create_book(&self, book: &NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        tables.check_author(book.author_id)?;
        tables.check_isbn(&book.isbn, None)?;
        let category_ids = tables.check_categories(&book.category_ids)?;

        let stored = StoredBook {
            row: BookRow {
                id: tables.allocate_id(),
                title: book.title.clone(),
                author_id: book.author_id,
                year: book.year.unwrap_or_else(current_year),
                content: book.content.clone(),
                isbn: book.isbn.clone(),
            },
            category_ids,
        };
        let created = tables.book(&stored);
        tables.books.insert(stored.row.id, stored);
        Ok(created)
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).map(|b| tables.book(b)))
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.values().map(|b| tables.book(b)).collect())
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|b| b.row.author_id == Some(author_id))
            .map(|b| tables.book(b))
            .collect())
    }

    async fn update_book(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        let mut book = match tables.books.get(&id) {
            Some(stored) => tables.book(stored),
            None => return Err(AppError::NotFound(format!("Book with id {} not found", id))),
        };
        update.apply(&mut book);
        tables.check_author(book.author_id)?;
        tables.check_isbn(&book.isbn, Some(id))?;
        let category_ids = match update.category_ids {
            Some(ref ids) => Some(tables.check_categories(ids)?),
            None => None,
        };

        if let Some(stored) = tables.books.get_mut(&id) {
            stored.row.title = book.title;
            stored.row.author_id = book.author_id;
            stored.row.year = book.year;
            stored.row.content = book.content;
            stored.row.isbn = book.isbn;
            if let Some(ids) = category_ids {
                stored.category_ids = ids;
            }
        }

        let stored = tables
            .books
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        Ok(tables.book(stored))
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        let copies = tables.copies.values().filter(|c| c.book_id == id).count();
        if copies > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} still has {} copies",
                id, copies
            )));
        }
        tables.books.remove(&id);
        Ok(())
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.books.len() as i64)
    }

    async fn create_copy(&self, copy: &BookCopy) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&copy.book_id) {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                copy.book_id
            )));
        }
        if tables.copies.contains_key(&copy.id) {
            return Err(AppError::Conflict(format!("Copy {} already exists", copy.id)));
        }
        tables.copies.insert(copy.id, copy.clone());
        Ok(())
    }

    async fn get_copy(&self, id: Uuid) -> AppResult<Option<BookCopy>> {
        Ok(self.tables.read().await.copies.get(&id).cloned())
    }

    async fn find_copies(&self, filter: &CopyFilter) -> AppResult<Vec<BookCopy>> {
        Ok(self.tables.read().await.sorted_copies(filter))
    }

    async fn count_copies(&self, filter: &CopyFilter) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.copies.values().filter(|c| filter.matches(c)).count() as i64)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        match tables.copies.get_mut(&id) {
            Some(copy) => {
                copy.due_back = Some(due_back);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Copy {} not found", id))),
        }
    }

    async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        match tables.copies.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Copy {} not found", id))),
        }
    }

    async fn detach_borrower(&self, user: UserId) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut touched = 0;
        for copy in tables.copies.values_mut() {
            if copy.borrower == Some(user) {
                copy.borrower = None;
                touched += 1;
            }
        }
        Ok(touched)
    }
}
