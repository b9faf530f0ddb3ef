//! Books repository for database operations

use std::collections::HashMap;

use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{current_year, Book, BookRow, NewBook, UpdateBook},
        category::Category,
    },
};

use super::{map_constraint_error, Violation};

const BOOK_COLUMNS: &str = "id, title, author_id, year, content, isbn";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_categories(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// All books by id, optionally restricted to one author
    pub async fn list(&self, author_id: Option<i32>) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE ($1::int IS NULL OR author_id = $1) ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_categories(rows).await
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Attach categories (in assignment order) to each row
    async fn with_categories(&self, rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let links = sqlx::query(
            r#"
            SELECT bc.book_id, c.id, c.name
            FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = ANY($1)
            ORDER BY bc.book_id, bc.position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_book: HashMap<i32, Vec<Category>> = HashMap::new();
        for link in links {
            by_book
                .entry(link.get("book_id"))
                .or_default()
                .push(Category {
                    id: link.get("id"),
                    name: link.get("name"),
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categories = by_book.remove(&row.id).unwrap_or_default();
                let mut book = Book::from(row);
                book.categories = categories;
                book
            })
            .collect())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, year, content, isbn)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.year.unwrap_or_else(current_year))
        .bind(&book.content)
        .bind(&book.isbn)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| book_write_error(e, &book.isbn, book.author_id))?;

        set_categories(&mut tx, id, &book.category_ids).await?;
        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Book {} vanished after insert", id)))
    }

    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut book = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        update.apply(&mut book);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, year = $3, content = $4, isbn = $5
            WHERE id = $6
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(book.year)
        .bind(&book.content)
        .bind(&book.isbn)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| book_write_error(e, &book.isbn, book.author_id))?;

        if let Some(ref category_ids) = update.category_ids {
            sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            set_categories(&mut tx, id, category_ids).await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book. Refused while any copy references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let copies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies WHERE book_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if copies > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} still has {} copies",
                id, copies
            )));
        }

        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match Violation::of(&e) {
                Some(_) => AppError::Conflict(format!("Book {} still has copies", id)),
                None => AppError::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

/// The only unique column on books is the ISBN and the only reference is the author
fn book_write_error(error: sqlx::Error, isbn: &str, author_id: Option<i32>) -> AppError {
    let author = author_id.map_or_else(|| "none".to_string(), |id| id.to_string());
    map_constraint_error(
        error,
        &format!("A book with ISBN {} already exists", isbn),
        &format!("Author with id {} not found", author),
    )
}

/// Pair each category with its display position
fn category_positions(category_ids: &[i32]) -> AppResult<Vec<(i32, i32)>> {
    category_ids
        .iter()
        .enumerate()
        .map(|(position, category_id)| {
            i32::try_from(position)
                .map(|position| (*category_id, position))
                .map_err(|_| AppError::Validation("Too many categories".to_string()))
        })
        .collect()
}

/// Link categories to a book, keeping the given order
async fn set_categories(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i32,
    category_ids: &[i32],
) -> AppResult<()> {
    if category_ids.is_empty() {
        return Ok(());
    }

    let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ANY($1)")
        .bind(category_ids)
        .fetch_one(&mut **tx)
        .await?;

    let mut distinct = category_ids.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if known != distinct.len() as i64 {
        return Err(AppError::NotFound("Unknown category".to_string()));
    }

    for (category_id, position) in category_positions(category_ids)? {
        sqlx::query(
            r#"
            INSERT INTO book_categories (book_id, category_id, position)
            VALUES ($1, $2, $3)
            ON CONFLICT (book_id, category_id) DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(category_id)
        .bind(position)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
