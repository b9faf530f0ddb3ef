//! Book listing and management

use crate::{
    access::Capability,
    error::AppResult,
    models::{Book, CurrentUser, NewBook, UpdateBook},
    pagination::Page,
    services::catalog::BookDetails,
    AppState,
};

use super::permission_required;

fn book_path(id: i32) -> String {
    format!("/catalog/book/{}", id)
}

pub async fn list(state: &AppState, page: usize) -> AppResult<Page<Book>> {
    let books = state.services.catalog.list_books().await?;
    Page::paginate(books, page)
}

pub async fn detail(state: &AppState, id: i32) -> AppResult<BookDetails> {
    state.services.catalog.book_details(id).await
}

pub async fn create(state: &AppState, user: &CurrentUser, book: NewBook) -> AppResult<Book> {
    permission_required(user, Capability::ManageLoans, "/catalog/book/create/")?;

    state.services.catalog.create_book(book).await
}

pub async fn update(
    state: &AppState,
    user: &CurrentUser,
    id: i32,
    update: UpdateBook,
) -> AppResult<Book> {
    permission_required(user, Capability::ManageLoans, &format!("{}/update/", book_path(id)))?;

    state.services.catalog.update_book(id, update).await
}

/// Refused with `Conflict` while copies of the book exist
pub async fn delete(state: &AppState, user: &CurrentUser, id: i32) -> AppResult<()> {
    permission_required(user, Capability::ManageLoans, &format!("{}/delete/", book_path(id)))?;

    state.services.catalog.delete_book(id).await
}
