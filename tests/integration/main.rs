//! Scenario tests for the guarded catalog operations, run against the in-memory store.
//! The `postgres` module exercises the database store and is ignored by default.

mod catalog;
mod lending;
mod postgres;

use std::sync::Arc;

use catalog_server::{
    access::Capability,
    config::AppConfig,
    models::{CurrentUser, UserClaims, UserId},
    repository::MemoryStore,
    AppState,
};

pub fn state() -> AppState {
    AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()))
}

pub fn reader(id: i32) -> CurrentUser {
    CurrentUser::Authenticated(UserClaims {
        sub: format!("user{}", id),
        user_id: UserId(id),
        is_superuser: false,
        capabilities: vec![],
        exp: 0,
        iat: 0,
    })
}

pub fn librarian(id: i32) -> CurrentUser {
    CurrentUser::Authenticated(UserClaims {
        sub: format!("librarian{}", id),
        user_id: UserId(id),
        is_superuser: false,
        capabilities: vec![Capability::ManageLoans],
        exp: 0,
        iat: 0,
    })
}
