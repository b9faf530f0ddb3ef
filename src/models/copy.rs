//! Book copy (lendable physical item) model and related types

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use uuid::Uuid;
use validator::Validate;

use super::user::UserId;

/// Loan status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    #[default]
    Requested,
    OnLoan,
    Available,
    Reserved,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Requested => "requested",
            CopyStatus::OnLoan => "on_loan",
            CopyStatus::Available => "available",
            CopyStatus::Reserved => "reserved",
        }
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(CopyStatus::Requested),
            "on_loan" => Ok(CopyStatus::OnLoan),
            "available" => Ok(CopyStatus::Available),
            "reserved" => Ok(CopyStatus::Reserved),
            _ => Err(format!("Invalid copy status: {}", s)),
        }
    }
}

// Stored as TEXT
impl sqlx::Type<Postgres> for CopyStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CopyStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// A lendable copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookCopy {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[sqlx(rename = "borrower_id")]
    pub borrower: Option<UserId>,
    pub status: CopyStatus,
}

impl BookCopy {
    /// True when the due date has passed as of `today`
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| due < today).unwrap_or(false)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Local::now().date_naive())
    }

    /// Default ordering key: due date ascending with undated copies first, then id
    pub fn sort_key(&self) -> (Option<NaiveDate>, Uuid) {
        (self.due_back, self.id)
    }
}

impl std::fmt::Display for BookCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.imprint)
    }
}

/// Equality filters over copies; `None` means "any"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyFilter {
    pub status: Option<CopyStatus>,
    pub borrower: Option<UserId>,
    pub book_id: Option<i32>,
}

impl CopyFilter {
    /// Copies currently on loan, optionally restricted to one borrower
    pub fn on_loan(borrower: Option<UserId>) -> Self {
        Self {
            status: Some(CopyStatus::OnLoan),
            borrower,
            book_id: None,
        }
    }

    pub fn of_book(book_id: i32) -> Self {
        Self {
            book_id: Some(book_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, copy: &BookCopy) -> bool {
        self.status.map_or(true, |s| copy.status == s)
            && self.borrower.map_or(true, |b| copy.borrower == Some(b))
            && self.book_id.map_or(true, |id| copy.book_id == id)
    }
}

/// Create copy request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCopy {
    pub book_id: i32,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower: Option<UserId>,
    #[serde(default)]
    pub status: CopyStatus,
}

impl NewCopy {
    /// Build the copy with a fresh random identifier
    pub fn into_copy(self) -> BookCopy {
        BookCopy {
            id: Uuid::new_v4(),
            book_id: self.book_id,
            imprint: self.imprint,
            due_back: self.due_back,
            borrower: self.borrower,
            status: self.status,
        }
    }
}
