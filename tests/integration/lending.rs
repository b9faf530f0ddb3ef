use std::collections::HashSet;

use catalog_server::{
    api::loans::{self, RenewCopyForm},
    error::{AppError, DateRejection},
    models::{BookCopy, CopyStatus, CurrentUser, NewBook, NewCopy, UserId},
    pagination::PAGE_SIZE,
    AppState,
};
use chrono::{Duration, Local};
use tokio_test::{assert_err, assert_ok};

use super::{librarian, reader, state};

/// One book with 30 copies on loan, alternating between users 1 and 2,
/// due over the next five days
async fn state_with_thirty_loans() -> (AppState, Vec<BookCopy>) {
    let state = state();
    let catalog = &state.services.catalog;
    let book = catalog
        .create_book(NewBook {
            title: "The Witcher".to_string(),
            author_id: None,
            year: Some(1989),
            content: "Follow Geralt of Rivia".to_string(),
            isbn: "2134567890".to_string(),
            category_ids: vec![],
        })
        .await
        .unwrap();

    let today = Local::now().date_naive();
    let mut copies = Vec::new();
    for i in 0..30 {
        let copy = catalog
            .create_copy(NewCopy {
                book_id: book.id,
                imprint: "Plon, 2016".to_string(),
                due_back: Some(today + Duration::days(i % 5)),
                borrower: Some(UserId(if i % 2 == 1 { 1 } else { 2 })),
                status: CopyStatus::OnLoan,
            })
            .await
            .unwrap();
        copies.push(copy);
    }
    (state, copies)
}

#[tokio::test]
async fn test_my_borrowed_redirects_anonymous_to_login() {
    let (state, _) = state_with_thirty_loans().await;

    match loans::my_borrowed(&state, &CurrentUser::Anonymous, 1).await {
        Err(AppError::AuthenticationRequired { next }) => {
            assert_eq!(next.as_deref(), Some("/catalog/mybooks/"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_borrowed_by_user_returns_exactly_their_copies() {
    let (state, _) = state_with_thirty_loans().await;

    let copies = state
        .services
        .availability
        .copies_borrowed_by(UserId(1))
        .await
        .unwrap();

    assert_eq!(copies.len(), 15);
    assert!(copies.iter().all(|c| c.borrower == Some(UserId(1))));
    assert!(copies.windows(2).all(|w| w[0].due_back <= w[1].due_back));
}

#[tokio::test]
async fn test_my_borrowed_pages_are_ten_and_cover_everything_once() {
    let (state, _) = state_with_thirty_loans().await;
    let user = reader(1);

    let first = loans::my_borrowed(&state, &user, 1).await.unwrap();
    assert_eq!(first.items.len(), PAGE_SIZE);
    assert!(first.is_paginated());

    let second = loans::my_borrowed(&state, &user, 2).await.unwrap();
    assert_eq!(second.items.len(), 5);

    assert_err!(loans::my_borrowed(&state, &user, 3).await);

    let paged: Vec<BookCopy> = first.items.into_iter().chain(second.items).collect();
    let unpaged = state
        .services
        .availability
        .copies_borrowed_by(UserId(1))
        .await
        .unwrap();
    assert_eq!(paged, unpaged);

    let distinct: HashSet<_> = paged.iter().map(|c| c.id).collect();
    assert_eq!(distinct.len(), 15);
}

#[tokio::test]
async fn test_all_borrowed_requires_capability() {
    let (state, _) = state_with_thirty_loans().await;

    assert!(matches!(
        loans::all_borrowed(&state, &reader(1), 1).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        loans::all_borrowed(&state, &CurrentUser::Anonymous, 1).await,
        Err(AppError::AuthenticationRequired { .. })
    ));

    let mut seen = Vec::new();
    for page in 1..=3 {
        let page = loans::all_borrowed(&state, &librarian(9), page).await.unwrap();
        seen.extend(page.items);
    }
    assert_eq!(seen.len(), 30);
    assert!(seen.windows(2).all(|w| w[0].sort_key() <= w[1].sort_key()));
}

#[tokio::test]
async fn test_renewal_is_forbidden_without_capability() {
    let (state, copies) = state_with_thirty_loans().await;
    let copy = &copies[0];
    let form = RenewCopyForm {
        renewal_date: Some(Local::now().date_naive() + Duration::days(7)),
    };

    assert!(matches!(
        loans::renew(&state, &reader(1), copy.id, form.clone()).await,
        Err(AppError::Forbidden(_))
    ));

    match loans::renew(&state, &CurrentUser::Anonymous, copy.id, form).await {
        Err(AppError::AuthenticationRequired { next }) => {
            assert_eq!(next, Some(format!("/catalog/book/{}/renew/", copy.id)));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let unchanged = state.services.availability.get_copy(copy.id).await.unwrap();
    assert_eq!(&unchanged, copy);
}

#[tokio::test]
async fn test_librarian_renews_two_weeks_out() {
    let (state, copies) = state_with_thirty_loans().await;
    let copy = &copies[3];
    let new_date = Local::now().date_naive() + Duration::days(14);

    let renewed = assert_ok!(
        loans::renew(
            &state,
            &librarian(9),
            copy.id,
            RenewCopyForm {
                renewal_date: Some(new_date),
            },
        )
        .await
    );

    assert_eq!(renewed.due_back, Some(new_date));
    let stored = state.services.availability.get_copy(copy.id).await.unwrap();
    assert_eq!(
        stored,
        BookCopy {
            due_back: Some(new_date),
            ..copy.clone()
        }
    );
}

#[tokio::test]
async fn test_renewal_date_outside_window_is_rejected() {
    let (state, copies) = state_with_thirty_loans().await;
    let today = Local::now().date_naive();

    let past = loans::renew(
        &state,
        &librarian(9),
        copies[0].id,
        RenewCopyForm {
            renewal_date: Some(today - Duration::days(1)),
        },
    )
    .await;
    assert!(matches!(past, Err(AppError::InvalidDate(DateRejection::Past))));

    let too_far = loans::renew(
        &state,
        &librarian(9),
        copies[0].id,
        RenewCopyForm {
            renewal_date: Some(today + Duration::days(29)),
        },
    )
    .await;
    assert!(matches!(too_far, Err(AppError::InvalidDate(DateRejection::TooFar))));
}

#[tokio::test]
async fn test_renewing_unknown_copy_is_not_found() {
    let state = state();
    let result = loans::renew(
        &state,
        &librarian(9),
        uuid::Uuid::new_v4(),
        RenewCopyForm::default(),
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_renewal_form_proposes_three_weeks() {
    let (state, copies) = state_with_thirty_loans().await;

    let form = loans::renewal_form(&state, &librarian(9), copies[0].id)
        .await
        .unwrap();
    assert_eq!(form.proposed_date, Local::now().date_naive() + Duration::days(21));
}
