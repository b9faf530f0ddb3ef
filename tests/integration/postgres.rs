//! Postgres store tests against a live database with `sql/schema.sql` applied
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use catalog_server::{
    error::AppError,
    models::{CopyFilter, CopyStatus, NewAuthor, NewBook, NewCategory, NewCopy, UpdateBook},
    repository::{CatalogStore, Repository},
};

async fn repository() -> Repository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    Repository::new(pool)
}

/// ISBNs are unique across runs
fn fresh_isbn() -> String {
    Uuid::new_v4().simple().to_string()[..13].to_string()
}

async fn author(repo: &Repository, last_name: &str) -> i32 {
    repo.create_author(&NewAuthor {
        first_name: "Test".to_string(),
        last_name: last_name.to_string(),
        biography: String::new(),
    })
    .await
    .expect("Failed to create author")
    .id
}

fn new_book(author_id: Option<i32>, category_ids: Vec<i32>) -> NewBook {
    NewBook {
        title: "Postgres fixture".to_string(),
        author_id,
        year: Some(2001),
        content: String::new(),
        isbn: fresh_isbn(),
        category_ids,
    }
}

fn copy_of(book_id: i32, due_back: Option<NaiveDate>) -> NewCopy {
    NewCopy {
        book_id,
        imprint: "First edition".to_string(),
        due_back,
        borrower: None,
        status: CopyStatus::Available,
    }
}

#[tokio::test]
#[ignore]
async fn test_book_round_trip() {
    let repo = repository().await;
    let author_id = author(&repo, "Roundtrip").await;

    let mut category_ids = Vec::new();
    for name in ["Zeta", "Alpha", "Mu"] {
        let category = repo
            .create_category(&NewCategory { name: name.to_string() })
            .await
            .unwrap();
        category_ids.push(category.id);
    }

    let book = repo
        .create_book(&new_book(Some(author_id), category_ids.clone()))
        .await
        .unwrap();
    let names: Vec<&str> = book.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mu"]);
    assert_eq!(book.author_id, Some(author_id));

    let duplicate = NewBook {
        isbn: book.isbn.clone(),
        ..new_book(None, vec![])
    };
    assert!(matches!(
        repo.create_book(&duplicate).await,
        Err(AppError::Conflict(_))
    ));

    let unknown_author = repo.create_book(&new_book(Some(i32::MAX), vec![])).await;
    assert!(matches!(unknown_author, Err(AppError::NotFound(_))));

    let cleared = repo
        .update_book(
            book.id,
            &UpdateBook {
                author_id: Some(None),
                category_ids: Some(vec![category_ids[2]]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.author_id, None);
    assert_eq!(cleared.categories.len(), 1);

    repo.delete_book(book.id).await.unwrap();
    repo.delete_author(author_id).await.unwrap();
    for id in category_ids {
        repo.delete_category(id).await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_copies_order_and_book_delete_restriction() {
    let repo = repository().await;
    let book = repo.create_book(&new_book(None, vec![])).await.unwrap();

    let later = NaiveDate::from_ymd_opt(2030, 5, 2).unwrap();
    let earlier = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();
    let mut ids = Vec::new();
    for due in [Some(later), None, Some(earlier)] {
        let copy = copy_of(book.id, due).into_copy();
        repo.create_copy(&copy).await.unwrap();
        ids.push(copy.id);
    }

    let copies = repo.find_copies(&CopyFilter::of_book(book.id)).await.unwrap();
    let dues: Vec<Option<NaiveDate>> = copies.iter().map(|c| c.due_back).collect();
    assert_eq!(dues, vec![None, Some(earlier), Some(later)]);
    assert_eq!(repo.count_copies(&CopyFilter::of_book(book.id)).await.unwrap(), 3);

    assert!(matches!(
        repo.delete_book(book.id).await,
        Err(AppError::Conflict(_))
    ));

    let dangling = copy_of(i32::MAX, None).into_copy();
    assert!(matches!(
        repo.create_copy(&dangling).await,
        Err(AppError::NotFound(_))
    ));

    for id in ids {
        repo.delete_copy(id).await.unwrap();
    }
    repo.delete_book(book.id).await.unwrap();
    assert!(repo.get_book(book.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_author_delete_keeps_books() {
    let repo = repository().await;
    let author_id = author(&repo, "Departing").await;
    let book = repo.create_book(&new_book(Some(author_id), vec![])).await.unwrap();

    repo.delete_author(author_id).await.unwrap();

    assert!(repo.get_author(author_id).await.unwrap().is_none());
    let kept = repo.get_book(book.id).await.unwrap().unwrap();
    assert_eq!(kept.author_id, None);

    repo.delete_book(book.id).await.unwrap();
}
