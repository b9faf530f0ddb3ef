//! Data models for the catalog

pub mod author;
pub mod book;
pub mod category;
pub mod copy;
pub mod user;

// Re-export commonly used types
pub use author::{Author, NewAuthor, UpdateAuthor};
pub use book::{Book, NewBook, UpdateBook};
pub use category::{Category, NewCategory};
pub use copy::{BookCopy, CopyFilter, CopyStatus, NewCopy};
pub use user::{CurrentUser, UserClaims, UserId};
