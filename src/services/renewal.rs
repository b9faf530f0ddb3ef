//! Librarian renewal of a copy's due date

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, DateRejection},
    models::BookCopy,
};

use super::Store;

/// Latest accepted renewal date, in days after today
pub const RENEWAL_WINDOW_DAYS: i64 = 28;

/// Renewal date offered when the caller has not proposed one
pub const DEFAULT_RENEWAL_DAYS: i64 = 21;

/// Accept `proposed` iff `today <= proposed <= today + 28 days`
pub fn validate_renewal_date(today: NaiveDate, proposed: NaiveDate) -> AppResult<NaiveDate> {
    if proposed < today {
        return Err(AppError::InvalidDate(DateRejection::Past));
    }
    if proposed > today + Duration::days(RENEWAL_WINDOW_DAYS) {
        return Err(AppError::InvalidDate(DateRejection::TooFar));
    }
    Ok(proposed)
}

pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_RENEWAL_DAYS)
}

/// A copy awaiting renewal, with the date offered by default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalForm {
    pub copy: BookCopy,
    pub proposed_date: NaiveDate,
}

#[derive(Clone)]
pub struct RenewalService {
    store: Store,
}

impl RenewalService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Look up the copy and offer the default renewal date
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalForm> {
        self.renewal_form_on(id, Local::now().date_naive()).await
    }

    pub async fn renewal_form_on(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalForm> {
        let copy = self.find_copy(id).await?;
        Ok(RenewalForm {
            copy,
            proposed_date: proposed_renewal_date(today),
        })
    }

    /// Renew copy `id` until `proposed`, or until the default date when none is given
    pub async fn renew_copy(&self, id: Uuid, proposed: Option<NaiveDate>) -> AppResult<BookCopy> {
        self.renew_copy_on(id, proposed, Local::now().date_naive()).await
    }

    /// Renewal as of `today`. Only `due_back` changes.
    pub async fn renew_copy_on(
        &self,
        id: Uuid,
        proposed: Option<NaiveDate>,
        today: NaiveDate,
    ) -> AppResult<BookCopy> {
        let mut copy = self.find_copy(id).await?;

        let proposed = proposed.unwrap_or_else(|| proposed_renewal_date(today));
        let due_back = validate_renewal_date(today, proposed).map_err(|e| {
            tracing::debug!(copy_id = %id, %proposed, "renewal date rejected: {}", e);
            e
        })?;

        self.store.set_due_back(id, due_back).await?;
        tracing::info!(copy_id = %id, %due_back, "copy renewed");

        copy.due_back = Some(due_back);
        Ok(copy)
    }

    async fn find_copy(&self, id: Uuid) -> AppResult<BookCopy> {
        self.store
            .get_copy(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }
}
