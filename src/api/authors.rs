//! Author listing and management

use crate::{
    access::Capability,
    error::AppResult,
    models::{Author, CurrentUser, NewAuthor, UpdateAuthor},
    pagination::Page,
    services::catalog::AuthorDetails,
    AppState,
};

use super::permission_required;

fn author_path(id: i32) -> String {
    format!("/catalog/author/{}", id)
}

pub async fn list(state: &AppState, page: usize) -> AppResult<Page<Author>> {
    let authors = state.services.catalog.list_authors().await?;
    Page::paginate(authors, page)
}

pub async fn detail(state: &AppState, id: i32) -> AppResult<AuthorDetails> {
    state.services.catalog.author_details(id).await
}

pub async fn create(state: &AppState, user: &CurrentUser, author: NewAuthor) -> AppResult<Author> {
    permission_required(user, Capability::ManageLoans, "/catalog/author/create/")?;

    state.services.catalog.create_author(author).await
}

pub async fn update(
    state: &AppState,
    user: &CurrentUser,
    id: i32,
    update: UpdateAuthor,
) -> AppResult<Author> {
    permission_required(user, Capability::ManageLoans, &format!("{}/update/", author_path(id)))?;

    state.services.catalog.update_author(id, update).await
}

pub async fn delete(state: &AppState, user: &CurrentUser, id: i32) -> AppResult<()> {
    permission_required(user, Capability::ManageLoans, &format!("{}/delete/", author_path(id)))?;

    state.services.catalog.delete_author(id).await
}
