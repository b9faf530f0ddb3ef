//! Book copies repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::{BookCopy, CopyFilter},
        user::UserId,
    },
};

use super::map_constraint_error;

const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR status = $1)
    AND ($2::int IS NULL OR borrower_id = $2)
    AND ($3::int IS NULL OR book_id = $3)
"#;

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookCopy>> {
        let copy = sqlx::query_as::<_, BookCopy>(
            r#"
            SELECT id, book_id, imprint, due_back, borrower_id, status
            FROM book_copies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(copy)
    }

    /// Copies matching `filter`, due date ascending (undated first), ties by id
    pub async fn find(&self, filter: &CopyFilter) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(&format!(
            r#"
            SELECT id, book_id, imprint, due_back, borrower_id, status
            FROM book_copies
            WHERE {}
            ORDER BY due_back ASC NULLS FIRST, id ASC
            "#,
            FILTER_CLAUSE
        ))
        .bind(filter.status)
        .bind(filter.borrower)
        .bind(filter.book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    pub async fn count(&self, filter: &CopyFilter) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM book_copies WHERE {}",
            FILTER_CLAUSE
        ))
        .bind(filter.status)
        .bind(filter.borrower)
        .bind(filter.book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn create(&self, copy: &BookCopy) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_copies (id, book_id, imprint, due_back, borrower_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(copy.id)
        .bind(copy.book_id)
        .bind(&copy.imprint)
        .bind(copy.due_back)
        .bind(copy.borrower)
        .bind(copy.status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_constraint_error(
                e,
                &format!("Copy {} already exists", copy.id),
                "Copy references a missing book or user",
            )
        })?;

        Ok(())
    }

    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_copies SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy {} not found", id)));
        }
        Ok(())
    }

    pub async fn detach_borrower(&self, user: UserId) -> AppResult<u64> {
        let result = sqlx::query("UPDATE book_copies SET borrower_id = NULL WHERE borrower_id = $1")
            .bind(user)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
