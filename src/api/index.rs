//! Catalog home page

use crate::{error::AppResult, services::catalog::CatalogSummary, AppState};

pub async fn summary(state: &AppState) -> AppResult<CatalogSummary> {
    state.services.catalog.summary().await
}
