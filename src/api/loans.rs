//! Loan listings and the librarian renewal workflow

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    access::Capability,
    error::AppResult,
    models::{BookCopy, CurrentUser},
    pagination::Page,
    services::renewal::RenewalForm,
    AppState,
};

use super::{login_required, permission_required};

pub const MY_BORROWED_PATH: &str = "/catalog/mybooks/";
pub const ALL_BORROWED_PATH: &str = "/catalog/borrowed/";

/// Path of the renewal page for one copy
pub fn renew_path(id: Uuid) -> String {
    format!("/catalog/book/{}/renew/", id)
}

/// Submitted renewal form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenewCopyForm {
    /// Defaults to three weeks from today when left empty
    pub renewal_date: Option<NaiveDate>,
}

/// Copies the caller has on loan
pub async fn my_borrowed(
    state: &AppState,
    user: &CurrentUser,
    page: usize,
) -> AppResult<Page<BookCopy>> {
    let claims = login_required(user, MY_BORROWED_PATH)?;

    let copies = state
        .services
        .availability
        .copies_borrowed_by(claims.user_id)
        .await?;
    Page::paginate(copies, page)
}

/// Every copy on loan, for librarians
pub async fn all_borrowed(
    state: &AppState,
    user: &CurrentUser,
    page: usize,
) -> AppResult<Page<BookCopy>> {
    permission_required(user, Capability::ManageLoans, ALL_BORROWED_PATH)?;

    let copies = state.services.availability.all_borrowed_copies().await?;
    Page::paginate(copies, page)
}

/// Show the renewal form for a copy
pub async fn renewal_form(state: &AppState, user: &CurrentUser, id: Uuid) -> AppResult<RenewalForm> {
    permission_required(user, Capability::ManageLoans, &renew_path(id))?;

    state.services.renewal.renewal_form(id).await
}

/// Apply a submitted renewal
pub async fn renew(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
    form: RenewCopyForm,
) -> AppResult<BookCopy> {
    let claims = permission_required(user, Capability::ManageLoans, &renew_path(id))?;
    tracing::debug!(user_id = %claims.user_id, copy_id = %id, "renewal requested");

    state.services.renewal.renew_copy(id, form.renewal_date).await
}
