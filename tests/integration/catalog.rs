use catalog_server::{
    api::{authors, books, index},
    error::AppError,
    models::{CopyStatus, CurrentUser, NewAuthor, NewBook, NewCategory, NewCopy, UpdateAuthor},
};

use super::{librarian, reader, state};

fn new_author(first_name: &str, last_name: &str) -> NewAuthor {
    NewAuthor {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        biography: String::new(),
    }
}

fn new_book(isbn: &str, author_id: Option<i32>) -> NewBook {
    NewBook {
        title: "The Witcher".to_string(),
        author_id,
        year: Some(1989),
        content: String::new(),
        isbn: isbn.to_string(),
        category_ids: vec![],
    }
}

#[tokio::test]
async fn test_author_list_is_paginated_by_ten() {
    let state = state();
    for i in 0..13 {
        authors::create(
            &state,
            &librarian(1),
            new_author(&format!("Andrzej {}", i), &format!("Sapkowski {:02}", i)),
        )
        .await
        .unwrap();
    }

    let first = authors::list(&state, 1).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert!(first.is_paginated());
    assert_eq!(first.items[0].last_name, "Sapkowski 00");

    let second = authors::list(&state, 2).await.unwrap();
    assert_eq!(second.items.len(), 3);
    assert_eq!(second.items[2].last_name, "Sapkowski 12");

    assert!(matches!(
        authors::list(&state, 3).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_authors_sorted_by_last_then_first_name() {
    let state = state();
    for (first, last) in [("Terry", "Pratchett"), ("Anne", "Brontë"), ("Charlotte", "Brontë")] {
        authors::create(&state, &librarian(1), new_author(first, last))
            .await
            .unwrap();
    }

    let names: Vec<String> = authors::list(&state, 1)
        .await
        .unwrap()
        .items
        .iter()
        .map(|a| a.to_string())
        .collect();
    assert_eq!(names, vec!["Brontë, Anne", "Brontë, Charlotte", "Pratchett, Terry"]);
}

#[tokio::test]
async fn test_management_needs_capability() {
    let state = state();

    assert!(matches!(
        authors::create(&state, &reader(1), new_author("Big", "Bob")).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        books::create(&state, &CurrentUser::Anonymous, new_book("1", None)).await,
        Err(AppError::AuthenticationRequired { .. })
    ));

    let author = authors::create(&state, &librarian(1), new_author("Big", "Bob"))
        .await
        .unwrap();
    assert!(matches!(
        authors::update(&state, &reader(1), author.id, UpdateAuthor::default()).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        authors::delete(&state, &reader(1), author.id).await,
        Err(AppError::Forbidden(_))
    ));

    // Reading stays open to everyone
    assert!(authors::detail(&state, author.id).await.is_ok());
}

#[tokio::test]
async fn test_deleting_author_keeps_their_books() {
    let state = state();
    let author = authors::create(&state, &librarian(1), new_author("Andrzej", "Sapkowski"))
        .await
        .unwrap();
    let book = books::create(&state, &librarian(1), new_book("2134567890", Some(author.id)))
        .await
        .unwrap();

    authors::delete(&state, &librarian(1), author.id).await.unwrap();

    let details = books::detail(&state, book.id).await.unwrap();
    assert_eq!(details.book.author_id, None);
    assert_eq!(details.author, None);
    assert!(matches!(
        authors::detail(&state, author.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_book_with_copies_cannot_be_deleted() {
    let state = state();
    let book = books::create(&state, &librarian(1), new_book("2134567890", None))
        .await
        .unwrap();
    let copy = state
        .services
        .catalog
        .create_copy(NewCopy {
            book_id: book.id,
            imprint: "Plon, 2016".to_string(),
            due_back: None,
            borrower: None,
            status: CopyStatus::Available,
        })
        .await
        .unwrap();

    assert!(matches!(
        books::delete(&state, &librarian(1), book.id).await,
        Err(AppError::Conflict(_))
    ));

    state.services.catalog.delete_copy(copy.id).await.unwrap();
    books::delete(&state, &librarian(1), book.id).await.unwrap();
    assert!(matches!(
        books::detail(&state, book.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_book_shows_first_three_categories() {
    let state = state();
    let mut category_ids = Vec::new();
    for name in ["Fantasy", "Adventure", "Classic", "Horror", "Poetry"] {
        let category = state
            .services
            .catalog
            .create_category(NewCategory {
                name: name.to_string(),
            })
            .await
            .unwrap();
        category_ids.push(category.id);
    }

    let mut book = new_book("2134567890", None);
    book.category_ids = category_ids;
    let book = books::create(&state, &librarian(1), book).await.unwrap();

    assert_eq!(book.categories.len(), 5);
    assert_eq!(book.display_category(), "Fantasy, Adventure, Classic");
}

#[tokio::test]
async fn test_duplicate_isbn_is_refused() {
    let state = state();
    books::create(&state, &librarian(1), new_book("2134567890", None))
        .await
        .unwrap();

    assert!(matches!(
        books::create(&state, &librarian(1), new_book("2134567890", None)).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_summary_counts_available_copies() {
    let state = state();
    let book = books::create(&state, &librarian(1), new_book("2134567890", None))
        .await
        .unwrap();
    for status in [CopyStatus::Available, CopyStatus::Reserved, CopyStatus::OnLoan] {
        state
            .services
            .catalog
            .create_copy(NewCopy {
                book_id: book.id,
                imprint: "Plon, 2016".to_string(),
                due_back: None,
                borrower: None,
                status,
            })
            .await
            .unwrap();
    }

    let summary = index::summary(&state).await.unwrap();
    assert_eq!(summary.num_books, 1);
    assert_eq!(summary.num_copies, 3);
    assert_eq!(summary.num_copies_available, 1);
    assert_eq!(summary.num_authors, 0);
}
