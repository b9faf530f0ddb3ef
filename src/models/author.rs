//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Author model from database
///
/// Authors are listed by last name, then first name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub biography: String,
}

impl Author {
    /// Sort key for the default author ordering
    pub fn sort_key(&self) -> (&str, &str, i32) {
        (&self.last_name, &self.first_name, self.id)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Biography is limited to 1000 characters"))]
    pub biography: String,
}

/// Update author request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 1000, message = "Biography is limited to 1000 characters"))]
    pub biography: Option<String>,
}

impl UpdateAuthor {
    pub fn apply(self, author: &mut Author) {
        if let Some(first_name) = self.first_name {
            author.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            author.last_name = last_name;
        }
        if let Some(biography) = self.biography {
            author.biography = biography;
        }
    }
}
