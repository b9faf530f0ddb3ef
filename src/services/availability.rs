//! Read-only queries over book copies

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BookCopy, CopyFilter, UserId},
};

use super::Store;

#[derive(Clone)]
pub struct AvailabilityService {
    store: Store,
}

impl AvailabilityService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Copies on loan to `user`, soonest due first
    pub async fn copies_borrowed_by(&self, user: UserId) -> AppResult<Vec<BookCopy>> {
        self.store.find_copies(&CopyFilter::on_loan(Some(user))).await
    }

    /// Every copy on loan, soonest due first
    pub async fn all_borrowed_copies(&self) -> AppResult<Vec<BookCopy>> {
        self.store.find_copies(&CopyFilter::on_loan(None)).await
    }

    pub async fn get_copy(&self, id: Uuid) -> AppResult<BookCopy> {
        self.store
            .get_copy(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }
}
